//! Remote data store as an alternative coverage source.
//!
//! When credentials are available, coverage can be computed from the live
//! tables instead of the SQL files. The store is expected to expose a
//! PostgREST-compatible endpoint:
//!
//! ```text
//! GET {url}/rest/v1/{table}?select={fields}&offset={n}&limit={page_size}
//! apikey: {key}
//! Authorization: Bearer {key}
//! ```
//!
//! Rows arrive as JSON objects, so no SQL parsing is involved. Each table is
//! fetched page by page in its own task; pages are requested until one comes
//! back empty. A short page is not the end: servers cap each response at
//! their own row limit, which may be below `page_size`.
//!
//! # Retry Behavior
//!
//! The client automatically retries on transient errors:
//! - Connection timeouts
//! - Rate limiting (429)
//! - Server errors (5xx)
//!
//! Retry delays use exponential backoff with configurable parameters.
//!
//! # Example
//!
//! ```
//! use content_coverage::{config::RetryConfig, remote::RemoteClient};
//!
//! let client = RemoteClient::new("https://project.supabase.co", "key", 500)
//!     .with_retry_config(RetryConfig::default());
//! assert_eq!(client.page_size(), 500);
//! ```

use std::time::Duration;

use compact_str::CompactString;
use serde_json::{Map, Value};
use tokio::{task::JoinSet, time::sleep};
use tracing::{debug, info, warn};

use crate::{
    catalog::{Catalog, TableSpec},
    config::{RemoteConfig, RetryConfig},
    coverage::{CoverageReport, CoverageRow, DataSource, MissingFields},
    error::{AppResult, http_error, remote_error}
};

type Record = Map<String, Value>;

/// HTTP client for the remote data store with retry support.
#[derive(Clone)]
pub struct RemoteClient {
    base_url:     String,
    api_key:      String,
    page_size:    usize,
    client:       reqwest::Client,
    retry_config: RetryConfig
}

/// Coverage of one table as fetched from the store.
#[derive(Debug)]
pub struct TableCoverage {
    pub row:     CoverageRow,
    pub missing: Vec<MissingFields>
}

impl RemoteClient {
    /// Create new client with default retry configuration
    pub fn new(base_url: &str, api_key: &str, page_size: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            page_size: page_size.max(1),
            client,
            retry_config: RetryConfig::default()
        }
    }

    /// Client from configuration, if both URL and key are set
    pub fn from_config(remote: &RemoteConfig, retry: &RetryConfig) -> Option<Self> {
        let url = remote.url.as_deref().filter(|u| !u.trim().is_empty())?;
        let key = remote.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        Some(Self::new(url, key, remote.page_size).with_retry_config(retry.clone()))
    }

    /// Replace the retry configuration
    #[must_use]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fetch every catalog table concurrently and compute coverage.
    ///
    /// Fails as a whole if any table fails; the caller decides whether to
    /// fall back to the SQL files.
    pub async fn coverage(
        &self,
        catalog: &Catalog,
        track_missing: bool
    ) -> AppResult<CoverageReport> {
        let mut tasks = JoinSet::new();
        for (id, spec) in catalog.iter() {
            let client = self.clone();
            let spec = spec.clone();
            tasks.spawn(async move { (id, client.fetch_table(&spec, track_missing).await) });
        }

        let mut results: Vec<Option<TableCoverage>> = (0..catalog.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (id, result) =
                joined.map_err(|e| remote_error(format!("Fetch task failed: {}", e)))?;
            results[id.0] = Some(result?);
        }

        let mut rows = Vec::with_capacity(results.len());
        let mut missing = Vec::new();
        for table in results.into_iter().flatten() {
            rows.push(table.row);
            missing.extend(table.missing);
        }
        let mut report = CoverageReport::new(DataSource::Remote, rows);
        report.missing = missing;
        info!(rows = report.total, "remote coverage computed");
        Ok(report)
    }

    /// Page through one table and classify every record.
    pub async fn fetch_table(
        &self,
        spec: &TableSpec,
        track_missing: bool
    ) -> AppResult<TableCoverage> {
        let mut coverage = TableCoverage {
            row:     CoverageRow::empty(spec),
            missing: Vec::new()
        };
        let origin = format!("remote:{}", spec.table);
        let mut offset = 0;
        let mut page_number = 0;
        loop {
            let page = self.fetch_page_with_retry(spec, offset).await?;
            page_number += 1;
            for (i, record) in page.iter().enumerate() {
                let missing = missing_in_record(spec, record);
                coverage.row.add(1, missing.is_empty());
                if track_missing && !missing.is_empty() {
                    coverage.missing.push(MissingFields {
                        table: spec.table.clone(),
                        origin: origin.clone(),
                        statement: page_number,
                        row: i + 1,
                        multiplicity: 1,
                        missing
                    });
                }
            }
            debug!(table = %spec.table, offset, rows = page.len(), "fetched page");
            if page.is_empty() {
                break;
            }
            offset += page.len();
        }
        Ok(coverage)
    }

    async fn fetch_page_with_retry(
        &self,
        spec: &TableSpec,
        offset: usize
    ) -> AppResult<Vec<Record>> {
        let retry = &self.retry_config;
        let mut last_error = None;
        let mut delay = retry.initial_delay_ms;
        for attempt in 0..=retry.max_retries {
            if attempt > 0 {
                warn!(
                    table = %spec.table,
                    attempt = attempt + 1,
                    max = retry.max_retries + 1,
                    delay_ms = delay,
                    "retrying remote request"
                );
                sleep(Duration::from_millis(delay)).await;
                delay = ((delay as f64 * retry.backoff_factor) as u64).min(retry.max_delay_ms);
            }
            match self.fetch_page(spec, offset).await {
                Ok(page) => return Ok(page),
                Err(e) => {
                    if is_retryable_error(&e) {
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| remote_error("All retry attempts failed")))
    }

    async fn fetch_page(&self, spec: &TableSpec, offset: usize) -> AppResult<Vec<Record>> {
        let url = table_url(&self.base_url, &spec.table);
        let response = self
            .client
            .get(&url)
            .query(&page_query(spec, offset, self.page_size))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(remote_error(format!(
                "Remote store error {} for table '{}': {}",
                status, spec.table, text
            )));
        }
        response.json().await.map_err(http_error)
    }
}

fn is_retryable_error(error: &masterror::AppError) -> bool {
    let msg = error.render_message().to_lowercase();
    msg.contains("timeout")
        || msg.contains("connection")
        || msg.contains("429")
        || msg.contains("rate limit")
        || msg.contains("500")
        || msg.contains("502")
        || msg.contains("503")
        || msg.contains("504")
}

/// Endpoint for one table
pub fn table_url(base_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table)
}

/// Query parameters for one page of required fields
pub fn page_query(spec: &TableSpec, offset: usize, limit: usize) -> [(&'static str, String); 3] {
    let select = spec
        .required_fields
        .iter()
        .map(CompactString::as_str)
        .collect::<Vec<_>>()
        .join(",");
    [
        ("select", select),
        ("offset", offset.to_string()),
        ("limit", limit.to_string())
    ]
}

/// Whether a fetched JSON value counts as a present field value.
///
/// `null` and blank strings are absent; everything else is present.
pub fn value_is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true
    }
}

fn missing_in_record(spec: &TableSpec, record: &Record) -> Vec<CompactString> {
    spec.required_fields
        .iter()
        .filter(|field| !record.get(field.as_str()).is_some_and(value_is_present))
        .cloned()
        .collect()
}
