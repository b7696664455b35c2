//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
///
/// Unusable model output is not an error; it is reported as
/// `ExtractionOutcome::Rejected`.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
