//! Server dependencies (using traits for testability)
//!
//! This module provides the dependency container handed to the pipeline and
//! the HTTP handlers, plus the adapters wrapping the concrete upstream clients.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use gemini_client::{GeminiClient, GeminiError};
use serde_json::Value;
use sheets_client::{SheetsClient, ValueInputOption};

use crate::kernel::{BaseAI, BaseTabularStore, GenerationTimedOut, Row};

// =============================================================================
// GeminiClient Adapter (implements BaseAI trait)
// =============================================================================

/// Wrapper around GeminiClient that implements BaseAI trait
pub struct GeminiAdapter(pub Arc<GeminiClient>);

impl GeminiAdapter {
    pub fn new(client: Arc<GeminiClient>) -> Self {
        Self(client)
    }
}

/// Keep transport timeouts recognizable after type erasure.
fn completion_error(err: GeminiError) -> anyhow::Error {
    if err.is_timeout() {
        anyhow::Error::new(err).context(GenerationTimedOut)
    } else {
        err.into()
    }
}

#[async_trait]
impl BaseAI for GeminiAdapter {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.0.generate_text(prompt).await.map_err(completion_error)
    }

    async fn complete_json(&self, prompt: &str) -> Result<String> {
        self.0.generate_json(prompt).await.map_err(completion_error)
    }
}

// =============================================================================
// SheetsClient Adapter (implements BaseTabularStore trait)
// =============================================================================

/// Wrapper around SheetsClient that implements BaseTabularStore trait
///
/// Appends default to `RAW`: cells hold model text, which must never be
/// parsed as formulas, dates or phone-number arithmetic.
pub struct SheetsAdapter {
    client: Arc<SheetsClient>,
    input_option: ValueInputOption,
}

impl SheetsAdapter {
    pub fn new(client: Arc<SheetsClient>) -> Self {
        Self {
            client,
            input_option: ValueInputOption::Raw,
        }
    }

    pub fn with_input_option(mut self, input_option: ValueInputOption) -> Self {
        self.input_option = input_option;
        self
    }
}

/// Sheets skips `null` cells on write; send empty strings so columns stay aligned.
fn to_sheet_row(row: Row) -> Row {
    row.into_iter()
        .map(|cell| match cell {
            Value::Null => Value::String(String::new()),
            other => other,
        })
        .collect()
}

#[async_trait]
impl BaseTabularStore for SheetsAdapter {
    async fn append_rows(&self, location: &str, rows: Vec<Row>) -> Result<usize> {
        let rows: Vec<Row> = rows.into_iter().map(to_sheet_row).collect();
        let response = self
            .client
            .append_values(location, rows, self.input_option)
            .await?;
        Ok(response.updated_rows())
    }

    async fn read_rows(&self, location: &str) -> Result<Vec<Row>> {
        let range = self.client.get_values(location).await?;
        Ok(range.values)
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies shared by handlers (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    /// Text generation capability
    pub ai: Arc<dyn BaseAI>,
    /// Append-only tabular store; the handle is shared read-only across requests
    pub store: Arc<dyn BaseTabularStore>,
}

impl ServerDeps {
    pub fn new(ai: Arc<dyn BaseAI>, store: Arc<dyn BaseTabularStore>) -> Self {
        Self { ai, store }
    }
}
