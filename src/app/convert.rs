//! Conversions from CLI arguments to library types.

use crate::{cli::Format, output::OutputFormat};

/// Convert CLI format to internal [`OutputFormat`].
///
/// # Example
///
/// ```
/// use content_coverage::{app::convert_format, cli::Format, output::OutputFormat};
///
/// assert_eq!(convert_format(Format::Json), OutputFormat::Json);
/// ```
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Markdown => OutputFormat::Markdown,
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}

/// Default log filter for a `-v` count; `RUST_LOG` takes precedence.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug"
    }
}
