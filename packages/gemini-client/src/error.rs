//! Error types for Gemini client.

use thiserror::Error;

/// Result type for Gemini client operations.
pub type Result<T> = std::result::Result<T, GeminiError>;

/// Gemini client errors.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, quota exhausted, invalid request)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The prompt or every candidate was blocked by the safety filters
    #[error("Generation blocked: {0}")]
    Blocked(String),

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl GeminiError {
    /// Whether the error came from the transport timing out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, GeminiError::Network(msg) if msg.contains("timed out"))
    }
}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeminiError::Network(format!("request timed out: {}", err))
        } else if err.is_decode() {
            GeminiError::Parse(err.to_string())
        } else {
            GeminiError::Network(err.to_string())
        }
    }
}
