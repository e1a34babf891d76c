// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The contact pipeline depends on these capabilities, never on a provider's
// request/response envelope.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BaseTabularStore)

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

// =============================================================================
// AI Trait (Infrastructure - text generation)
// =============================================================================

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Complete a prompt with an LLM (returns raw text response)
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Complete a prompt whose answer must be one JSON document.
    ///
    /// Providers with a JSON output mode override this; the default is `complete`.
    async fn complete_json(&self, prompt: &str) -> Result<String> {
        self.complete(prompt).await
    }
}

/// Attached to completion errors caused by the provider call timing out.
#[derive(Debug, Error)]
#[error("generation request timed out")]
pub struct GenerationTimedOut;

// =============================================================================
// Tabular Store Trait (Infrastructure - append-only rows)
// =============================================================================

/// One row of scalar cells (string, number, bool or null).
pub type Row = Vec<Value>;

#[async_trait]
pub trait BaseTabularStore: Send + Sync {
    /// Append rows after existing content at `location` (e.g. `"Sheet!A:Z"`).
    ///
    /// Returns the number of rows the backend reports as written.
    async fn append_rows(&self, location: &str, rows: Vec<Row>) -> Result<usize>;

    /// Read every row at `location`, in order.
    async fn read_rows(&self, location: &str) -> Result<Vec<Row>>;
}
