//! Pure Google Sheets REST API client.
//!
//! A minimal client for the Sheets v4 `spreadsheets.values` endpoints:
//! append rows after a table and read a range. Authenticates with a
//! service account (JWT bearer grant) or a pre-issued access token.
//!
//! # Example
//!
//! ```rust,ignore
//! use sheets_client::{Credentials, ServiceAccount, SheetsClient, ValueInputOption};
//!
//! let account = ServiceAccount::new(client_email, private_key_pem);
//! let client = SheetsClient::new(spreadsheet_id, Credentials::ServiceAccount(account));
//!
//! client
//!     .append_values("Change_Log!A:D", vec![row], ValueInputOption::Raw)
//!     .await?;
//! let rows = client.get_values("Schools_Main!A2:Z").await?.values;
//! ```

pub mod auth;
pub mod error;
pub mod types;

pub use auth::{decode_private_key_b64, unescape_private_key, Credentials, ServiceAccount};
pub use error::{Result, SheetsError};
pub use types::{AppendValuesResponse, UpdateValuesResponse, ValueInputOption, ValueRange};

use std::time::Duration;

use auth::TokenProvider;
use reqwest::Response;
use serde_json::{json, Value};

const BASE_URL: &str = "https://sheets.googleapis.com/v4";

pub struct SheetsClient {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    tokens: TokenProvider,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            tokens: TokenProvider::new(credentials),
        }
    }

    /// Set a custom base URL (for a local emulator or proxy).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound every request by a transport-level timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SheetsError::Config(e.to_string()))?;
        Ok(self)
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url,
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }

    /// Append rows after the last row of the table found in `range`.
    ///
    /// Rows are inserted (`INSERT_ROWS`), never overwriting existing cells.
    pub async fn append_values(
        &self,
        range: &str,
        values: Vec<Vec<Value>>,
        input_option: ValueInputOption,
    ) -> Result<AppendValuesResponse> {
        let token = self.tokens.access_token(&self.client).await?;
        let url = format!("{}:append", self.values_url(range));

        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", input_option.as_str()),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": values }))
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let body: AppendValuesResponse = resp
            .json()
            .await
            .map_err(|e| SheetsError::Parse(e.to_string()))?;

        tracing::debug!(
            range,
            updated_rows = body.updated_rows(),
            "Appended rows to sheet"
        );

        Ok(body)
    }

    /// Read all values in `range`.
    pub async fn get_values(&self, range: &str) -> Result<ValueRange> {
        let token = self.tokens.access_token(&self.client).await?;

        let resp = self
            .client
            .get(self.values_url(range))
            .bearer_auth(token)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        resp.json()
            .await
            .map_err(|e| SheetsError::Parse(e.to_string()))
    }
}

async fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(status = %status, error = %body, "Sheets API error");
    Err(SheetsError::Api {
        status: status.as_u16(),
        message: body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn client() -> SheetsClient {
        SheetsClient::new(
            "sheet-123",
            Credentials::Token(SecretString::from("t".to_string())),
        )
    }

    #[test]
    fn test_values_url_encodes_range() {
        let url = client().values_url("Contacts_AD_NIL!A:Z");
        assert_eq!(
            url,
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/Contacts_AD_NIL%21A%3AZ"
        );
    }

    #[test]
    fn test_values_url_with_custom_base() {
        let url = client()
            .with_base_url("http://localhost:8090/v4/")
            .values_url("Change_Log!A:D");
        assert!(url.starts_with("http://localhost:8090/v4/spreadsheets/sheet-123/values/"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = client()
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_millis(500))
            .unwrap();

        let err = client.get_values("Schools_Main!A2:Z").await.unwrap_err();
        assert!(matches!(err, SheetsError::Network(_)));
    }
}
