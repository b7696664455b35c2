//! Lunchbox Domain Layer
//!
//! This crate contains the document model and the pure logic of the menu
//! service, plus the trait interfaces that all other layers depend upon.
//! It performs no I/O.
//!
//! ## Key Concepts
//!
//! - **MenuResponse**: a restaurant's lunch menu for one day
//! - **Canonical date**: the ISO `YYYY-MM-DD` string the service treats as
//!   ground truth, overriding anything the model echoes
//! - **ExtractionMode**: strict (exact date) or loose (any current menu)
//! - **ExtractionOutcome**: a menu, or diagnostics for unusable model output
//!
//! ## Architecture
//!
//! - Pure logic only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod date;
pub mod extraction;
pub mod menu;
pub mod traits;

// Re-exports for convenience
pub use date::{parse_input_date, DateFormatError};
pub use extraction::{ExtractionFailure, ExtractionMode, ExtractionOutcome, FieldError};
pub use menu::{iso_date, weekday_name, MenuItem, MenuPayload, MenuResponse};
pub use traits::{Clock, FixedClock, MenuCache, MenuExtractor, PageFetcher, SystemClock};
