//! Request-level errors and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use lunchbox_domain::{DateFormatError, ExtractionFailure};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body for every non-extraction failure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl ErrorResponse {
    /// Create an error body
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// Why a menu request failed
#[derive(Debug, Error)]
pub enum MenuError {
    /// No url in the request
    #[error("Missing 'url' in JSON payload.")]
    MissingUrl,

    /// The date matched none of the accepted spellings
    #[error("Invalid 'date' format. Use YYYY-MM-DD, DD.MM.YYYY or DD.MM.")]
    InvalidDate(#[source] DateFormatError),

    /// The date is before today
    #[error("Date cannot be in the past.")]
    PastDate,

    /// The page could not be downloaded
    #[error("Failed to download page: {0}")]
    Download(String),

    /// The model could not be reached
    #[error("OpenAI API call failed: {0}")]
    Llm(String),

    /// The model answered with something that is not a menu
    #[error("{}", .0.error)]
    Extraction(ExtractionFailure),
}

impl MenuError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            MenuError::MissingUrl | MenuError::InvalidDate(_) | MenuError::PastDate => {
                StatusCode::BAD_REQUEST
            }
            MenuError::Download(_) => StatusCode::BAD_GATEWAY,
            MenuError::Llm(_) | MenuError::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MenuError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            MenuError::Extraction(failure) => (status, Json(failure)).into_response(),
            other => (status, Json(ErrorResponse::new(other.to_string()))).into_response(),
        }
    }
}
