//! Error types for the Sheets client.

use thiserror::Error;

/// Result type for Sheets client operations.
pub type Result<T> = std::result::Result<T, SheetsError>;

/// Google Sheets client errors.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Configuration error (missing credentials, unreadable private key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Service-account token exchange failed
    #[error("Auth error: {0}")]
    Auth(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API error (non-2xx response)
    #[error("Sheets API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}
