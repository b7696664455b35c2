//! Lunchbox Page Fetcher
//!
//! Downloads restaurant pages and reduces them to the visible text of the
//! document body, bounded to a fixed number of characters so the prompt
//! built from it stays bounded too.
//!
//! # Examples
//!
//! ```no_run
//! use lunchbox_domain::PageFetcher;
//! use lunchbox_fetcher::{FetcherConfig, HttpPageFetcher};
//!
//! let fetcher = HttpPageFetcher::new(FetcherConfig::default()).unwrap();
//! let text = fetcher.fetch("https://example.com/menu").unwrap();
//! assert!(text.chars().count() <= 15_000);
//! ```

#![warn(missing_docs)]

mod html;

pub use html::{truncate_chars, visible_text};

use lunchbox_domain::PageFetcher;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Default request timeout (15 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default upper bound on returned text, in characters
pub const DEFAULT_MAX_CHARS: usize = 15_000;

/// Default client identifier
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; MenuScraper/1.0)";

/// Errors that can occur while fetching a page
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP client could not be constructed
    #[error("Client error: {0}")]
    Client(String),

    /// Request did not complete in time
    #[error("Request to {0} timed out")]
    Timeout(String),

    /// Network or protocol failure
    #[error("Request failed: {0}")]
    Request(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Configuration for the page fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum characters of text returned
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// `User-Agent` header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_chars: DEFAULT_MAX_CHARS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_chars == 0 {
            return Err("max_chars must be greater than 0".to_string());
        }
        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".to_string());
        }
        Ok(())
    }
}

/// Blocking HTTP page fetcher
pub struct HttpPageFetcher {
    client: reqwest::blocking::Client,
    max_chars: usize,
}

impl HttpPageFetcher {
    /// Create a fetcher from configuration
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        config.validate().map_err(FetchError::Client)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            max_chars: config.max_chars,
        })
    }

    fn download(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::Body(e.to_string())
            }
        })
    }
}

impl PageFetcher for HttpPageFetcher {
    type Error = FetchError;

    fn fetch(&self, url: &str) -> Result<String, Self::Error> {
        let html = self.download(url)?;
        debug!("Downloaded {} bytes of HTML from {}", html.len(), url);

        let text = visible_text(&html);
        let text = truncate_chars(&text, self.max_chars);

        info!("Fetched {} chars of text from {}", text.chars().count(), url);
        Ok(text)
    }
}
