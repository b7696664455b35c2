//! Configuration file parsing for the server.
//!
//! Loads settings from a TOML file (bind address, cache database, optional
//! auth token and the LLM, fetcher and extractor sections), then lets the
//! environment override the secrets and the database path.

use lunchbox_extractor::ExtractorConfig;
use lunchbox_fetcher::FetcherConfig;
use lunchbox_llm::OpenAiConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A field has an unusable value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 5000)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// SQLite file holding the menu cache
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Shared secret expected in the `AUTH_TOKEN` header; no auth when unset
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Chat model connection
    #[serde(default)]
    pub llm: OpenAiConfig,

    /// Page download settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Extraction settings
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    5000
}

fn default_database_path() -> PathBuf {
    PathBuf::from("menu_cache.db")
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `OPENAI_API_KEY`, `AUTH_TOKEN` and `MENU_CACHE_DB`
    ///
    /// `lookup` is normally `std::env::var(..).ok()`. Empty values are
    /// ignored.
    pub fn apply_env<E>(&mut self, lookup: E)
    where
        E: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = var("OPENAI_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(token) = var("AUTH_TOKEN") {
            self.auth_token = Some(token);
        }
        if let Some(path) = var("MENU_CACHE_DB") {
            self.database_path = PathBuf::from(path);
        }
    }

    /// Check everything needed to start serving
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.api_key".to_string()));
        }
        self.fetcher.validate().map_err(ConfigError::Invalid)?;
        self.extractor.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// The auth token, if one is configured and non-empty
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref().filter(|token| !token.is_empty())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            database_path: default_database_path(),
            auth_token: None,
            llm: OpenAiConfig::default(),
            fetcher: FetcherConfig::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}
