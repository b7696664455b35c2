//! Locally executed tools offered to the model

use std::sync::LazyLock;

use lunchbox_llm::{ToolCall, ToolDefinition};
use regex::Regex;
use serde_json::{json, Value};

/// Name of the price normalization tool
pub const NORMALIZE_PRICES: &str = "normalize_prices";

static PRICE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+([.,]\d+)?").expect("price pattern is valid"));

/// Tool definition advertised on the first turn
pub fn price_tool() -> ToolDefinition {
    ToolDefinition::new(
        NORMALIZE_PRICES,
        "Convert an array of raw price strings to numeric values in CZK.",
        json!({
            "type": "object",
            "properties": {
                "prices": {
                    "type": "array",
                    "items": { "type": ["string", "null"] }
                }
            },
            "required": ["prices"]
        }),
    )
}

/// First number in a raw price string, with `,` read as the decimal separator
///
/// `"145,- Kč"` gives `145.0`, `"89,50 CZK"` gives `89.5`, `"zdarma"` gives `None`.
pub fn normalize_price(raw: &str) -> Option<f64> {
    let found = PRICE_NUMBER.find(raw)?;
    found.as_str().replace(',', ".").parse().ok()
}

/// Normalize a batch of raw prices, position for position
pub fn normalize_prices(prices: &[Option<String>]) -> Vec<Option<f64>> {
    prices
        .iter()
        .map(|raw| raw.as_deref().and_then(normalize_price))
        .collect()
}

/// Execute one tool call and return the JSON result sent back to the model
///
/// Never fails: malformed arguments are treated as an empty object and
/// unknown tools produce an error object the model can read.
pub fn run_tool_call(call: &ToolCall) -> Value {
    if call.name != NORMALIZE_PRICES {
        return json!({ "error": format!("Unknown tool {}", call.name) });
    }

    let args: Value = call
        .parse_arguments()
        .unwrap_or_else(|_| Value::Object(Default::default()));

    let raw: Vec<Option<String>> = args
        .get("prices")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(price_argument).collect())
        .unwrap_or_default();

    json!({ "normalized": normalize_prices(&raw) })
}

fn price_argument(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
