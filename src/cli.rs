use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Content Coverage - Measure required-field completeness of SQL seed data
#[derive(Parser, Debug)]
#[command(name = "content-coverage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (skips discovery of the default locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute per-table coverage from SQL files or the remote store
    Report {
        /// SQL files or directories to scan
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Include the per-row missing-field detail
        #[arg(long)]
        missing: bool,

        /// Print sample parsed rows for one table to stderr
        #[arg(long, value_name = "TABLE")]
        debug_table: Option<String>,

        /// Maximum statements and rows printed by --debug-table
        #[arg(long, default_value_t = 5)]
        debug_limit: usize,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "markdown")]
        format: Format,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Never query the remote store
        #[arg(long)]
        offline: bool,

        /// Remote data store base URL
        #[arg(long, env = "CONTENT_DB_URL")]
        remote_url: Option<String>,

        /// Remote data store API key
        #[arg(long, env = "CONTENT_DB_KEY", hide_env_values = true)]
        remote_key: Option<String>,

        /// Exit with code 1 when overall coverage is below this percent
        #[arg(long, value_name = "PERCENT", value_parser = clap::value_parser!(u32).range(0..=100))]
        fail_under: Option<u32>,

        /// Treat unreadable files as fatal
        #[arg(long)]
        strict: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },

    /// List the tracked tables and their required fields
    Tables {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Markdown,
    Text,
    Json,
    Yaml
}
