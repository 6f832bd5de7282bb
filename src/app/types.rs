//! Application types for CLI commands.
//!
//! This module defines the parameters passed from the CLI to the `report`
//! command and the result it hands back to the entry point.

use std::path::PathBuf;

use crate::{cli::Format, coverage::CoverageReport};

/// Parameters for the report command.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
///
/// use content_coverage::{app::ReportParams, cli::Format};
///
/// let params = ReportParams {
///     paths:         vec![PathBuf::from("seeds")],
///     missing:       false,
///     debug_table:   None,
///     debug_limit:   5,
///     output_format: Format::Markdown,
///     offline:       true,
///     remote_url:    None,
///     remote_key:    None,
///     fail_under:    Some(80),
///     strict:        false,
///     no_color:      true
/// };
/// assert!(params.offline);
/// ```
#[derive(Debug, Clone)]
pub struct ReportParams {
    /// SQL files or directories to scan.
    pub paths:         Vec<PathBuf>,
    /// Collect and render the per-row missing-field detail.
    pub missing:       bool,
    /// Table whose parsed rows are sampled for debugging.
    pub debug_table:   Option<String>,
    /// Maximum sampled statements, and rows per statement.
    pub debug_limit:   usize,
    /// Output format for the report.
    pub output_format: Format,
    /// Skip the remote store even when credentials exist.
    pub offline:       bool,
    /// Remote store URL from the command line or environment.
    pub remote_url:    Option<String>,
    /// Remote store key from the command line or environment.
    pub remote_key:    Option<String>,
    /// Minimum overall percent for a zero exit code.
    pub fail_under:    Option<u32>,
    /// Fail the run on unreadable files.
    pub strict:        bool,
    /// Disable colored terminal output.
    pub no_color:      bool
}

/// Result of a report run.
#[derive(Debug, Clone)]
pub struct ReportResult {
    /// 0 on success, 1 when below `fail_under`.
    pub exit_code:    i32,
    /// Rendered report in the requested format.
    pub rendered:     String,
    /// Sampled rows for `--debug-table`.
    pub debug_output: Option<String>,
    /// Underlying numbers, for callers that need more than the text.
    pub report:       CoverageReport
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_params_clone() {
        let params = ReportParams {
            paths:         vec![PathBuf::from(".")],
            missing:       true,
            debug_table:   Some("items".to_string()),
            debug_limit:   3,
            output_format: Format::Json,
            offline:       false,
            remote_url:    None,
            remote_key:    None,
            fail_under:    None,
            strict:        true,
            no_color:      false
        };
        let cloned = params.clone();
        assert_eq!(cloned.debug_table.as_deref(), Some("items"));
        assert!(cloned.strict);
        assert!(format!("{:?}", cloned).contains("ReportParams"));
    }
}
