//! Pure Gemini REST API client
//!
//! A minimal client for the Gemini `generateContent` endpoint with no
//! domain-specific logic.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::GeminiClient;
//!
//! let client = GeminiClient::from_env()?.with_model("gemini-2.0-flash");
//!
//! let text = client.generate_text("List three SEC schools as JSON").await?;
//! ```

pub mod error;
pub mod types;

pub use error::{GeminiError, Result};
pub use types::*;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Pure Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create from environment variable `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::Config("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies or a local stub).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model used by [`GeminiClient::generate_text`].
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Bound every request by a transport-level timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeminiError::Config(e.to_string()))?;
        Ok(self)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the configured model.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Raw `generateContent` call.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Gemini request failed");
                GeminiError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&error_text)
                .map(|env| match env.error.status {
                    Some(code) => format!("{}: {}", code, env.error.message),
                    None => env.error.message,
                })
                .unwrap_or(error_text);
            warn!(status = %status, error = %message, "Gemini API error");
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;

        debug!(
            model = %model,
            duration_ms = start.elapsed().as_millis(),
            total_tokens = body.usage_metadata.as_ref().map(|u| u.total_token_count),
            "Gemini generateContent"
        );

        Ok(body)
    }

    /// One-shot prompt returning the first candidate's text.
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest::from_prompt(prompt)
            .config(GenerationConfig::default().temperature(0.2));
        let response = self.generate_content(&self.model, &request).await?;
        extract_text(response)
    }

    /// One-shot prompt whose answer must be a JSON document.
    ///
    /// Sets `responseMimeType: application/json`, so the model skips prose and fences.
    pub async fn generate_json(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest::from_prompt(prompt)
            .config(GenerationConfig::json().temperature(0.2));
        let response = self.generate_content(&self.model, &request).await?;
        extract_text(response)
    }
}

/// Pull the text out of a response, classifying safety blocks.
fn extract_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response.block_reason() {
        return Err(GeminiError::Blocked(reason.to_string()));
    }

    match response.text() {
        Some(text) => Ok(text),
        None => match response.finish_reason() {
            Some(reason @ ("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")) => {
                Err(GeminiError::Blocked(reason.to_string()))
            }
            _ => Err(GeminiError::Parse("No text in Gemini response".into())),
        },
    }
}
