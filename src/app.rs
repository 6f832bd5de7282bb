//! Application logic for the content-coverage CLI.
//!
//! This module contains the command implementations separated from the main
//! entry point to enable testing.
//!
//! # Strategy
//!
//! `report` computes coverage from one of two sources:
//!
//! | Source | Used when |
//! |--------|-----------|
//! | Remote data store | URL and key are configured and `--offline` is not set |
//! | SQL files | Otherwise, or when the remote store fails |
//!
//! A remote failure is never fatal; the run falls back to the SQL files and
//! says so in the report notes.

mod convert;
mod helpers;
mod report;
mod types;

pub use convert::{convert_format, log_filter};
pub use helpers::{
    calculate_exit_code, create_output_options, create_progress_bar, resolve_remote,
    summary_notes, write_output
};
pub use report::{run_report, run_tables};
pub use types::{ReportParams, ReportResult};
