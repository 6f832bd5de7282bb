use std::fmt;

pub use masterror::{AppError, AppResult};

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create output write error
pub fn output_write_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to write report to '{}': {}", path, source))
}

/// Create corpus discovery error
pub fn corpus_error(path: &str, message: impl fmt::Display) -> AppError {
    AppError::bad_request(format!("Cannot scan '{}': {}", path, message))
}

/// Create catalog validation error
pub fn catalog_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(format!("Invalid table catalog: {}", message.into()))
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create remote data source error
pub fn remote_error(message: impl Into<String>) -> AppError {
    AppError::service(message.into())
}

/// Create HTTP error
pub fn http_error(err: reqwest::Error) -> AppError {
    let msg = if err.is_timeout() {
        format!("Request timeout: {}", err)
    } else if err.is_connect() {
        format!("Connection failed: {}", err)
    } else if err.is_status() {
        format!("HTTP error {}: {}", err.status().unwrap_or_default(), err)
    } else if err.is_decode() {
        format!("Malformed response body: {}", err)
    } else {
        err.to_string()
    };
    AppError::service(msg)
}
