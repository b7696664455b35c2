//! Extraction outcomes
//!
//! A model that answers with broken JSON or the wrong shape is an expected
//! event, not an exceptional one. Extractors report it as
//! [`ExtractionOutcome::Rejected`] so the caller can retry in another mode or
//! surface the diagnostics; only transport problems are errors.

use crate::menu::MenuResponse;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How tightly the extraction is bound to the requested date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Only the section of the page for the requested date
    Strict,
    /// Any reasonable current daily or weekly lunch menu
    Loose,
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::Strict => write!(f, "strict"),
            ExtractionMode::Loose => write!(f, "loose"),
        }
    }
}

/// One field-level validation problem in the model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the offending field, e.g. `["menu_items", "0", "name"]`
    pub loc: Vec<String>,

    /// Human-readable description
    pub msg: String,

    /// Machine-readable kind: `missing`, `string_type`, `float_type`, ...
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    /// Create a field error at the given path
    pub fn new<I, S>(loc: I, kind: impl Into<String>, msg: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            loc: loc.into_iter().map(Into::into).collect(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// Dotted path, e.g. `menu_items.0.name`
    pub fn path(&self) -> String {
        self.loc.join(".")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path(), self.msg)
    }
}

/// Diagnostics for model output that could not be turned into a menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    /// Summary of what went wrong
    pub error: String,

    /// The cleaned text (unparseable JSON) or the parsed object (schema mismatch)
    pub raw_response: serde_json::Value,

    /// Field-level problems; empty when the output was not JSON at all
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<FieldError>,
}

impl ExtractionFailure {
    /// The model output was not valid JSON
    pub fn invalid_json(cleaned: impl Into<String>) -> Self {
        Self {
            error: "Model did not return valid JSON.".to_string(),
            raw_response: serde_json::Value::String(cleaned.into()),
            validation_errors: Vec::new(),
        }
    }

    /// The model output was JSON but not a menu
    pub fn schema_mismatch(raw: serde_json::Value, errors: Vec<FieldError>) -> Self {
        Self {
            error: "Model JSON does not match expected schema.".to_string(),
            raw_response: raw,
            validation_errors: errors,
        }
    }
}

/// Result of one extraction attempt that reached the model
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// A validated, stamped menu (possibly with no items)
    Menu(MenuResponse),
    /// The model answered, but not with a usable menu
    Rejected(ExtractionFailure),
}

impl ExtractionOutcome {
    /// The menu, if extraction succeeded
    pub fn menu(&self) -> Option<&MenuResponse> {
        match self {
            ExtractionOutcome::Menu(menu) => Some(menu),
            ExtractionOutcome::Rejected(_) => None,
        }
    }

    /// Whether this is a successful extraction that found no dishes
    pub fn is_empty_menu(&self) -> bool {
        self.menu().is_some_and(MenuResponse::is_empty)
    }

    /// Whether this is a successful extraction with at least one dish
    pub fn has_items(&self) -> bool {
        self.menu().is_some_and(|menu| !menu.is_empty())
    }
}
