//! Typed failures of the generation-validation-ingestion pipeline.

use thiserror::Error;

/// Coarse classification preserved all the way to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller sent a bad request
    Validation,
    /// The model call failed or its output was unusable
    Upstream,
    /// The persistent store rejected a write
    Storage,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad request shape (query or batch size malformed)
    #[error("{0}")]
    Validation(String),

    /// Model call failed, timed out, or was rejected
    #[error("upstream generation failed: {message}")]
    UpstreamGeneration { message: String, timed_out: bool },

    /// Model text could not be parsed into the expected JSON shape
    #[error("model output could not be parsed: {reason}")]
    MalformedOutput { reason: String, raw: String },

    /// Append to the persistent store failed
    #[error("storage write failed: {0}")]
    StorageWrite(String),
}

impl PipelineError {
    pub fn upstream(err: impl std::fmt::Display) -> Self {
        PipelineError::UpstreamGeneration {
            message: err.to_string(),
            timed_out: false,
        }
    }

    pub fn timeout(after: std::time::Duration) -> Self {
        PipelineError::UpstreamGeneration {
            message: format!("generation timed out after {}s", after.as_secs()),
            timed_out: true,
        }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        PipelineError::StorageWrite(err.to_string())
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            PipelineError::Validation(_) => ErrorClass::Validation,
            PipelineError::UpstreamGeneration { .. } | PipelineError::MalformedOutput { .. } => {
                ErrorClass::Upstream
            }
            PipelineError::StorageWrite(_) => ErrorClass::Storage,
        }
    }
}
