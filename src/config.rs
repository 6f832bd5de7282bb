//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.content-coverage.toml` in current directory
//! 4. `~/.config/content-coverage/config.toml`
//! 5. Default values
//!
//! An explicit `--config <file>` replaces steps 3 and 4.
//!
//! # Configuration File Format
//!
//! ```toml
//! [remote]
//! url = "https://project.supabase.co"
//! api_key = "..."              # or use CONTENT_DB_KEY env var
//! page_size = 1000
//!
//! [retry]
//! max_retries = 3
//! initial_delay_ms = 500
//! max_delay_ms = 10000
//! backoff_factor = 2.0
//!
//! [scan]
//! extensions = ["sql"]
//!
//! [[tables]]
//! label = "Items"
//! table = "items"
//! required = ["name", "description"]
//!
//! [[tables]]
//! label = "Item translations"
//! table = "item_translations"
//! required = ["item_id", "locale", "name"]
//! rows_follow = "items"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `CONTENT_DB_URL` | Remote data store base URL |
//! | `CONTENT_DB_KEY` | Remote data store API key |

use std::{
    env, fs,
    path::{Path, PathBuf}
};

use serde::Deserialize;

use crate::{
    catalog::{Catalog, TableSpec, default_tables},
    error::{AppResult, config_error, file_read_error}
};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub retry:  RetryConfig,
    #[serde(default)]
    pub scan:   ScanConfig,
    /// Tracked tables; empty means the built-in catalog
    #[serde(default)]
    pub tables: Vec<TableSpec>
}

/// Remote data store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub url:       Option<String>,
    pub api_key:   Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url:       None,
            api_key:   None,
            page_size: default_page_size()
        }
    }
}

fn default_page_size() -> usize {
    1000
}

/// Retry configuration for remote requests
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub max_retries:      u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms:     u64,
    pub backoff_factor:   f64
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries:      3,
            initial_delay_ms: 500,
            max_delay_ms:     10000,
            backoff_factor:   2.0
        }
    }
}

/// Corpus discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// File extensions (without dot) treated as SQL input
    pub extensions: Vec<String>
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec![String::from("sql")]
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. `explicit` file, if given; otherwise the config file in the current
    ///    directory (.content-coverage.toml), then the one in the home
    ///    directory (~/.config/content-coverage/config.toml)
    /// 3. Default values
    pub fn load(explicit: Option<&Path>) -> AppResult<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => Self::discover()?
        };

        if let Ok(url) = env::var("CONTENT_DB_URL") {
            config.remote.url = Some(url);
        }

        if let Ok(key) = env::var("CONTENT_DB_KEY") {
            config.remote.api_key = Some(key);
        }

        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }

    fn from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| file_read_error(&path.display().to_string(), e))?;
        Self::from_toml(&content)
    }

    fn discover() -> AppResult<Self> {
        let mut config = Self::default();

        // Home directory config
        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("content-coverage")
                .join("config.toml");

            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        // Current directory config overrides home config
        let local_config = PathBuf::from(".content-coverage.toml");
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        Ok(config)
    }

    /// Validated catalog: configured tables, or the built-in default
    pub fn catalog(&self) -> AppResult<Catalog> {
        if self.tables.is_empty() {
            Catalog::new(default_tables())
        } else {
            Catalog::new(self.tables.clone())
        }
    }
}
