use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::SecretString;

use crate::domains::contacts::PipelineSettings;
use crate::domains::schools::EnrichmentSettings;

/// Provenance tag stamped into `created_by` of generated rows.
pub const DEFAULT_PROVENANCE_TAG: &str = "NIL_AD_Rolodex_v1";

/// Slack between the generation deadline and the HTTP client's own timeout.
const TRANSPORT_GRACE: Duration = Duration::from_secs(5);

/// Google service-account credentials for the spreadsheet store
#[derive(Debug)]
pub struct GoogleCredentials {
    pub sheets_id: String,
    pub client_email: String,
    /// PEM-encoded RSA key, already decoded/unescaped
    pub private_key: SecretString,
}

/// Application configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub gemini_api_key: SecretString,
    pub gemini_model: String,
    pub gemini_base_url: Option<String>,
    pub generation_timeout: Duration,
    pub generation_attempts: u32,
    /// `None` only when `use_memory_store` is set
    pub google: Option<GoogleCredentials>,
    pub use_memory_store: bool,
    pub contacts_range: String,
    pub audit_range: String,
    pub schools_range: String,
    pub enrichment_range: String,
    pub provenance_tag: String,
    pub dedupe_contacts: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let use_memory_store = parse_or(var("USE_MEMORY_STORE"), false)
            .context("USE_MEMORY_STORE must be true or false")?;

        let google = if use_memory_store {
            None
        } else {
            let sheets_id = var("GOOGLE_SHEETS_ID").context("GOOGLE_SHEETS_ID must be set")?;
            let client_email = var("GOOGLE_SERVICE_ACCOUNT_EMAIL")
                .context("GOOGLE_SERVICE_ACCOUNT_EMAIL must be set")?;
            let private_key = match (var("GOOGLE_PRIVATE_KEY_B64"), var("GOOGLE_PRIVATE_KEY")) {
                (Some(encoded), _) => sheets_client::decode_private_key_b64(&encoded)
                    .context("GOOGLE_PRIVATE_KEY_B64 must be base64-encoded PEM")?,
                (None, Some(raw)) => sheets_client::unescape_private_key(&raw),
                (None, None) => {
                    anyhow::bail!("GOOGLE_PRIVATE_KEY_B64 or GOOGLE_PRIVATE_KEY must be set")
                }
            };
            Some(GoogleCredentials {
                sheets_id,
                client_email,
                private_key: SecretString::from(private_key),
            })
        };

        let timeout_secs: u64 = parse_or(var("GENERATION_TIMEOUT_SECS"), 60)
            .context("GENERATION_TIMEOUT_SECS must be a valid number")?;
        let attempts: u32 = parse_or(var("GENERATION_ATTEMPTS"), 1)
            .context("GENERATION_ATTEMPTS must be a valid number")?;

        Ok(Self {
            port: parse_or(var("PORT"), 8080).context("PORT must be a valid number")?,
            gemini_api_key: SecretString::from(
                var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?,
            ),
            gemini_model: var("GEMINI_MODEL")
                .unwrap_or_else(|| gemini_client::DEFAULT_MODEL.to_string()),
            gemini_base_url: var("GEMINI_BASE_URL"),
            generation_timeout: Duration::from_secs(timeout_secs.max(1)),
            generation_attempts: attempts.clamp(1, 3),
            google,
            use_memory_store,
            contacts_range: var("CONTACTS_RANGE")
                .unwrap_or_else(|| "Contacts_AD_NIL!A:Z".to_string()),
            audit_range: var("AUDIT_RANGE").unwrap_or_else(|| "Change_Log!A:D".to_string()),
            schools_range: var("SCHOOLS_RANGE")
                .unwrap_or_else(|| "Schools_Main!A2:Z".to_string()),
            enrichment_range: var("ENRICHMENT_RANGE")
                .unwrap_or_else(|| "AD_Contacts!A2".to_string()),
            provenance_tag: var("PROVENANCE_TAG")
                .unwrap_or_else(|| DEFAULT_PROVENANCE_TAG.to_string()),
            dedupe_contacts: parse_or(var("DEDUPE_CONTACTS"), false)
                .context("DEDUPE_CONTACTS must be true or false")?,
        })
    }

    /// Settings for the search-ads pipeline
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            contacts_range: self.contacts_range.clone(),
            audit_range: self.audit_range.clone(),
            provenance_tag: self.provenance_tag.clone(),
            generation_timeout: self.generation_timeout,
            generation_attempts: self.generation_attempts,
            dedupe: self.dedupe_contacts,
        }
    }

    /// Timeout for the model's HTTP client. Outlives the generation deadline
    /// so a slow model is reported as a timeout, not a transport error.
    pub fn transport_timeout(&self) -> Duration {
        self.generation_timeout + TRANSPORT_GRACE
    }

    /// Settings for the per-school enrichment flow
    pub fn enrichment_settings(&self) -> EnrichmentSettings {
        EnrichmentSettings {
            schools_range: self.schools_range.clone(),
            enrichment_range: self.enrichment_range.clone(),
            generation_timeout: self.generation_timeout,
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => Ok(v.trim().parse()?),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_memory_store_needs_only_gemini_key() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("USE_MEMORY_STORE", "true"),
        ]))
        .unwrap();

        assert!(config.google.is_none());
        assert_eq!(config.port, 8080);
        assert_eq!(config.contacts_range, "Contacts_AD_NIL!A:Z");
        assert_eq!(config.audit_range, "Change_Log!A:D");
        assert_eq!(config.generation_attempts, 1);
        assert_eq!(config.provenance_tag, DEFAULT_PROVENANCE_TAG);
        assert!(!config.dedupe_contacts);
        assert!(config.transport_timeout() > config.generation_timeout);
    }

    #[test]
    fn test_missing_gemini_key_fails() {
        let err = Config::from_lookup(lookup(&[("USE_MEMORY_STORE", "true")])).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_sheets_requires_credentials() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("GOOGLE_SHEETS_ID", "sheet"),
            ("GOOGLE_SERVICE_ACCOUNT_EMAIL", "svc@example.com"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("GOOGLE_PRIVATE_KEY"));
    }

    #[test]
    fn test_escaped_private_key_is_unescaped() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("GOOGLE_SHEETS_ID", "sheet"),
            ("GOOGLE_SERVICE_ACCOUNT_EMAIL", "svc@example.com"),
            ("GOOGLE_PRIVATE_KEY", "line1\\nline2"),
        ]))
        .unwrap();

        let google = config.google.unwrap();
        assert_eq!(google.private_key.expose_secret(), "line1\nline2");
    }

    #[test]
    fn test_attempts_are_clamped_and_port_validated() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("USE_MEMORY_STORE", "true"),
            ("GENERATION_ATTEMPTS", "9"),
        ]))
        .unwrap();
        assert_eq!(config.generation_attempts, 3);

        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("USE_MEMORY_STORE", "true"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_debug_does_not_leak_secrets() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "super-secret"),
            ("USE_MEMORY_STORE", "true"),
        ]))
        .unwrap();
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
