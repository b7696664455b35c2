//! Lunchbox Server
//!
//! HTTP front end of the menu extractor: one endpoint that turns a
//! restaurant URL and a day into a structured lunch menu.
//!
//! ```text
//! POST /api/menu → MenuOrchestrator → cache | fetcher → extractor → cache
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod orchestrator;

use config::{ConfigError, ServerConfig};
use handlers::{create_router, AppState};
use lunchbox_domain::SystemClock;
use lunchbox_extractor::{ExtractorError, MenuExtractionClient};
use lunchbox_fetcher::{FetchError, HttpPageFetcher};
use lunchbox_llm::{LlmError, OpenAiProvider};
use lunchbox_store::{SqliteMenuCache, StoreError};
use orchestrator::MenuOrchestrator;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The production pipeline
pub type LiveOrchestrator = MenuOrchestrator<
    SqliteMenuCache,
    HttpPageFetcher,
    MenuExtractionClient<OpenAiProvider>,
    SystemClock,
>;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Cache database error
    #[error("Cache error: {0}")]
    Store(#[from] StoreError),

    /// Page fetcher setup error
    #[error("Fetcher error: {0}")]
    Fetch(#[from] FetchError),

    /// LLM provider setup error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Extractor setup error
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Build the production pipeline from configuration
///
/// Creates blocking HTTP clients, so it must not run inside the async runtime.
pub fn build_orchestrator(config: &ServerConfig) -> Result<LiveOrchestrator, ServerError> {
    let cache = SqliteMenuCache::new(&config.database_path)?;
    let fetcher = HttpPageFetcher::new(config.fetcher.clone())?;
    let provider = OpenAiProvider::new(config.llm.clone())?;
    let extractor = MenuExtractionClient::new(provider, config.extractor.clone())?;

    Ok(MenuOrchestrator::new(cache, fetcher, extractor, SystemClock))
}

/// Build the shared application state
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let orchestrator = Arc::new(build_orchestrator(config)?);
    Ok(AppState::new(orchestrator, config.auth_token()))
}

/// Start the HTTP server
///
/// Binds the configured address and serves until the server fails.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), ServerError> {
    info!("Starting Lunchbox menu service");
    info!("Cache database: {}", config.database_path.display());
    info!("Model: {} at {}", config.llm.model, config.llm.endpoint);
    info!(
        "Auth token: {}",
        if state.auth_token.is_some() { "required" } else { "disabled" }
    );

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::default();
        config.database_path = dir.path().join("menus.db");
        config.llm.api_key = "sk-test".to_string();
        config.auth_token = Some("s3cret".to_string());

        let state = build_state(&config).unwrap();
        assert_eq!(state.auth_token.as_deref(), Some("s3cret"));
        assert!(config.database_path.exists());
    }

    #[test]
    fn test_build_state_without_api_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::default();
        config.database_path = dir.path().join("menus.db");

        assert!(matches!(build_state(&config), Err(ServerError::Llm(_))));
    }
}
