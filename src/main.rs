//! # Content Coverage
//!
//! Required-field completeness for SQL seed data.
//!
//! `content-coverage` reads a corpus of `INSERT` statements, matches each
//! target table against a catalog of tracked tables and their required
//! fields, and reports which share of rows carries every required field.
//! Nothing is executed; statements are parsed with a hand-written scanner
//! that understands quoted strings, array literals, casts, multi-row
//! `VALUES` lists and `SELECT ... UNION ALL SELECT ...` bulk inserts.
//!
//! # Quick Start
//!
//! ```bash
//! # Markdown report over a seed directory
//! content-coverage report supabase/seeds
//!
//! # Which rows lack which fields
//! content-coverage report supabase/seeds --missing --format text
//!
//! # CI gate
//! content-coverage report supabase/seeds --fail-under 90 --offline
//!
//! # Live numbers from the data store
//! export CONTENT_DB_URL="https://project.supabase.co"
//! export CONTENT_DB_KEY="..."
//! content-coverage report
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded from (in order of precedence):
//!
//! 1. Command-line arguments
//! 2. Environment variables (`CONTENT_DB_URL`, `CONTENT_DB_KEY`)
//! 3. `.content-coverage.toml` in current directory
//! 4. `~/.config/content-coverage/config.toml`
//!
//! See [`config`] for the file format.
//!
//! # Coverage Rules
//!
//! | Rule | Description |
//! |------|-------------|
//! | Presence | Blank text, `NULL` and blank string literals (`''`, `''::text`) are missing |
//! | Alignment | Required fields match columns ignoring ASCII case |
//! | Bulk inserts | A `SELECT` insert into a child table counts as many rows as its parent has so far |
//! | Artifacts | A lone `name` row captured from `ON CONFLICT (name)` is dropped |
//! | Percent | `round(complete / total * 100)`, 0 for empty tables |
//!
//! # Exit Codes
//!
//! - `0` - Success
//! - `1` - Overall coverage below `--fail-under`
//! - `2` - Fatal error (bad configuration, missing input, unwritable output)
//!
//! # Output Formats
//!
//! - `markdown` - Report table with notes (default)
//! - `text` - Human-readable colored output
//! - `json` - Structured JSON for programmatic processing
//! - `yaml` - YAML format
//!
//! # Logging
//!
//! Diagnostics go to stderr through `tracing`. `-v` enables info, `-vv`
//! debug (one line per skipped statement); `RUST_LOG` overrides both.

use std::{io, process};

use clap::Parser;
use content_coverage::{
    app::{ReportParams, log_filter, run_report, run_tables, write_output},
    cli::{Cli, Commands},
    config::Config,
    error::AppResult
};
use tokio::main;
use tracing_subscriber::EnvFilter;

#[main]
async fn main() {
    match run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e.render_message());
            process::exit(2);
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Report {
            paths,
            missing,
            debug_table,
            debug_limit,
            format,
            output,
            offline,
            remote_url,
            remote_key,
            fail_under,
            strict,
            no_color
        } => {
            let params = ReportParams {
                paths,
                missing,
                debug_table,
                debug_limit,
                output_format: format,
                offline,
                remote_url,
                remote_key,
                fail_under,
                strict,
                // Never write color codes into a file
                no_color: no_color || output.is_some()
            };
            let result = run_report(params, config).await?;

            if let Some(debug) = &result.debug_output {
                eprintln!("{}", debug);
            }
            match &output {
                Some(path) => write_output(path, &result.rendered)?,
                None => println!("{}", result.rendered)
            }
            Ok(result.exit_code)
        }
        Commands::Tables {
            format,
            no_color
        } => {
            println!("{}", run_tables(&config, format, no_color)?);
            Ok(0)
        }
    }
}
