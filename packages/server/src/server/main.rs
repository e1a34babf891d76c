// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use gemini_client::GeminiClient;
use rolodex_core::kernel::{GeminiAdapter, MemoryStore, ServerDeps, SheetsAdapter};
use rolodex_core::kernel::{BaseAI, BaseTabularStore};
use rolodex_core::{server::build_app, Config};
use secrecy::ExposeSecret;
use sheets_client::{Credentials, ServiceAccount, SheetsClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rolodex_core=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting NIL AD Rolodex API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(model = %config.gemini_model, "Configuration loaded");

    // Generation client
    let mut gemini = GeminiClient::new(config.gemini_api_key.expose_secret())
        .with_model(config.gemini_model.clone())
        .with_timeout(config.transport_timeout())
        .context("Failed to build Gemini client")?;
    if let Some(url) = &config.gemini_base_url {
        gemini = gemini.with_base_url(url.clone());
    }
    let ai: Arc<dyn BaseAI> = Arc::new(GeminiAdapter::new(Arc::new(gemini)));

    // Tabular store
    let store: Arc<dyn BaseTabularStore> = match &config.google {
        Some(google) => {
            let account = ServiceAccount::new(
                google.client_email.clone(),
                google.private_key.expose_secret(),
            );
            let client = SheetsClient::new(
                google.sheets_id.clone(),
                Credentials::ServiceAccount(account),
            );
            tracing::info!(spreadsheet = %client.spreadsheet_id(), "Using Google Sheets store");
            Arc::new(SheetsAdapter::new(Arc::new(client)))
        }
        None => {
            tracing::warn!("USE_MEMORY_STORE is set; rows are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    // Build application
    let app = build_app(
        ServerDeps::new(ai, store),
        config.pipeline_settings(),
        config.enrichment_settings(),
    );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
