//! Lunchbox Extractor
//!
//! Turns the visible text of a restaurant page into a validated menu with a
//! tool-calling chat model.
//!
//! # Architecture
//!
//! ```text
//! page text → PromptBuilder → Conversation ⇄ ChatProvider
//!                                  ↓ normalize_prices (local)
//!                             final text → parser → MenuResponse
//! ```
//!
//! The model gets at most two turns. On the first it may ask for the
//! `normalize_prices` tool; the results are sent back and the second turn
//! must produce the menu JSON. Output that is not JSON, or JSON that is not
//! a menu, comes back as [`ExtractionOutcome::Rejected`] with diagnostics.
//!
//! # Example Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use lunchbox_domain::{ExtractionMode, MenuExtractor};
//! use lunchbox_extractor::{ExtractorConfig, MenuExtractionClient};
//! use lunchbox_llm::MockProvider;
//!
//! let llm = MockProvider::new(
//!     r#"{"date": "x", "day_of_week": "x", "menu_items": [{"name": "Kulajda"}], "source_url": "x"}"#,
//! );
//! let client = MenuExtractionClient::new(llm, ExtractorConfig::default()).unwrap();
//!
//! let date = NaiveDate::from_ymd_opt(2025, 11, 19).unwrap();
//! let outcome = client
//!     .extract("https://r.example/menu", "Kulajda 55,-", date, ExtractionMode::Strict)
//!     .unwrap();
//!
//! let menu = outcome.menu().unwrap();
//! assert_eq!(menu.date, "2025-11-19");
//! assert_eq!(menu.source_url, "https://r.example/menu");
//! ```
//!
//! [`ExtractionOutcome::Rejected`]: lunchbox_domain::ExtractionOutcome::Rejected

#![warn(missing_docs)]

mod config;
mod conversation;
mod error;
mod extractor;
pub mod parser;
mod prompt;
pub mod tools;

#[cfg(test)]
mod tests;

pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::MenuExtractionClient;
pub use prompt::PromptBuilder;
