//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the request pipeline and
//! infrastructure. Implementations live in other crates.

use crate::extraction::{ExtractionMode, ExtractionOutcome};
use crate::menu::MenuResponse;
use chrono::NaiveDate;

/// Persistent (url, date) → menu cache
///
/// Implemented by the infrastructure layer (lunchbox-store). Every call is
/// its own atomic unit; implementations must not rely on state shared
/// between calls.
pub trait MenuCache {
    /// Error type for cache operations
    type Error;

    /// Delete every entry dated strictly before `today_iso`, returning how many went
    fn prune(&self, today_iso: &str) -> Result<usize, Self::Error>;

    /// Exact-key lookup
    fn get(&self, url: &str, date_iso: &str) -> Result<Option<MenuResponse>, Self::Error>;

    /// Insert or fully replace the entry for (url, date)
    fn put(&self, url: &str, date_iso: &str, menu: &MenuResponse) -> Result<(), Self::Error>;
}

/// Downloads a page and returns its visible text
///
/// Implemented by the infrastructure layer (lunchbox-fetcher)
pub trait PageFetcher {
    /// Error type for fetch operations
    type Error;

    /// Fetch `url` and return bounded plain text
    fn fetch(&self, url: &str) -> Result<String, Self::Error>;
}

/// Turns page text into a menu with the help of a language model
///
/// Implemented by the application layer (lunchbox-extractor). `Err` is
/// reserved for failures to talk to the model at all; bad model output is
/// an [`ExtractionOutcome::Rejected`].
pub trait MenuExtractor {
    /// Error type for extraction operations
    type Error;

    /// Extract the menu for `target_date` from `page_text`
    fn extract(
        &self,
        url: &str,
        page_text: &str,
        target_date: NaiveDate,
        mode: ExtractionMode,
    ) -> Result<ExtractionOutcome, Self::Error>;
}

/// Source of the current calendar date
pub trait Clock {
    /// Today's date
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A clock stuck on one day, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
