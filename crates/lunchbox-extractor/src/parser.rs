//! Parse model output into a menu

use lunchbox_domain::{ExtractionFailure, FieldError, MenuItem, MenuResponse};
use serde_json::{Map, Value};

/// Strip surrounding whitespace and a markdown code fence
///
/// Fenced output is cut down to the span between the first `{` and the last
/// `}`; unfenced output is only trimmed.
pub fn clean_model_output(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Parse the model's final text into a menu
///
/// The authoritative fields are left as the model wrote them; the caller
/// stamps them.
pub fn parse_menu_response(content: &str) -> Result<MenuResponse, ExtractionFailure> {
    let cleaned = clean_model_output(content);

    let json: Value = serde_json::from_str(cleaned)
        .map_err(|_| ExtractionFailure::invalid_json(cleaned))?;

    let mut errors = Vec::new();
    let menu = validate_menu(&json, &mut errors);

    match menu {
        Some(menu) if errors.is_empty() => Ok(menu),
        _ => Err(ExtractionFailure::schema_mismatch(json, errors)),
    }
}

/// Path into the document being validated
#[derive(Clone, Default)]
struct Loc(Vec<String>);

impl Loc {
    fn at(&self, segment: impl ToString) -> Loc {
        let mut loc = self.0.clone();
        loc.push(segment.to_string());
        Loc(loc)
    }

    fn error(&self, kind: &str, msg: &str) -> FieldError {
        FieldError::new(self.0.clone(), kind, msg)
    }
}

fn validate_menu(json: &Value, errors: &mut Vec<FieldError>) -> Option<MenuResponse> {
    let root = Loc::default();
    let Some(obj) = json.as_object() else {
        errors.push(root.error("model_type", "Input should be an object"));
        return None;
    };

    let restaurant_name = optional_string(obj, &root, "restaurant_name", errors);
    let date = required_string(obj, &root, "date", errors);
    let day_of_week = required_string(obj, &root, "day_of_week", errors);
    let source_url = required_string(obj, &root, "source_url", errors);
    let menu_items = menu_items(obj, &root, errors);

    let daily_menu = match obj.get("daily_menu") {
        None => Some(true),
        Some(Value::Bool(flag)) => Some(*flag),
        Some(_) => {
            errors.push(root.at("daily_menu").error("bool_type", "Input should be a valid boolean"));
            None
        }
    };

    Some(MenuResponse {
        restaurant_name,
        date: date?,
        day_of_week: day_of_week?,
        menu_items: menu_items?,
        daily_menu: daily_menu?,
        source_url: source_url?,
    })
}

fn menu_items(obj: &Map<String, Value>, parent: &Loc, errors: &mut Vec<FieldError>) -> Option<Vec<MenuItem>> {
    let loc = parent.at("menu_items");
    let items = match obj.get("menu_items") {
        None => {
            errors.push(loc.error("missing", "Field required"));
            return None;
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            errors.push(loc.error("list_type", "Input should be a valid list"));
            return None;
        }
    };

    let parsed: Vec<Option<MenuItem>> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| menu_item(item, &loc.at(idx), errors))
        .collect();

    parsed.into_iter().collect()
}

fn menu_item(json: &Value, loc: &Loc, errors: &mut Vec<FieldError>) -> Option<MenuItem> {
    let Some(obj) = json.as_object() else {
        errors.push(loc.error("model_type", "Input should be an object"));
        return None;
    };

    let category = optional_string(obj, loc, "category", errors);
    let weight = optional_string(obj, loc, "weight", errors);
    let price = price(obj, loc, errors);
    let allergens = allergens(obj, loc, errors);

    let name = required_string(obj, loc, "name", errors).and_then(|name| {
        if name.is_empty() {
            errors.push(loc.at("name").error("string_too_short", "String should have at least 1 character"));
            None
        } else {
            Some(name)
        }
    });

    Some(MenuItem {
        category,
        name: name?,
        price: price?,
        allergens: allergens?,
        weight,
    })
}

fn required_string(
    obj: &Map<String, Value>,
    parent: &Loc,
    key: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        None => {
            errors.push(parent.at(key).error("missing", "Field required"));
            None
        }
        Some(_) => {
            errors.push(parent.at(key).error("string_type", "Input should be a valid string"));
            None
        }
    }
}

/// Absent and `null` both mean "not stated"
fn optional_string(
    obj: &Map<String, Value>,
    parent: &Loc,
    key: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(parent.at(key).error("string_type", "Input should be a valid string"));
            None
        }
    }
}

/// Outer `None` means invalid; numeric strings are accepted
fn price(obj: &Map<String, Value>, parent: &Loc, errors: &mut Vec<FieldError>) -> Option<Option<f64>> {
    match obj.get("price") {
        None | Some(Value::Null) => Some(None),
        Some(Value::Number(n)) => Some(n.as_f64()),
        Some(Value::String(s)) if s.trim().parse::<f64>().is_ok_and(f64::is_finite) => {
            Some(s.trim().parse().ok())
        }
        Some(_) => {
            errors.push(parent.at("price").error("float_type", "Input should be a valid number"));
            None
        }
    }
}

fn allergens(obj: &Map<String, Value>, parent: &Loc, errors: &mut Vec<FieldError>) -> Option<Vec<String>> {
    let loc = parent.at("allergens");
    let values = match obj.get("allergens") {
        None => return Some(Vec::new()),
        Some(Value::Array(values)) => values,
        Some(_) => {
            errors.push(loc.error("list_type", "Input should be a valid list"));
            return None;
        }
    };

    let mut allergens = Vec::with_capacity(values.len());
    let mut valid = true;
    for (idx, value) in values.iter().enumerate() {
        match value {
            Value::String(s) => allergens.push(s.clone()),
            _ => {
                errors.push(loc.at(idx).error("string_type", "Input should be a valid string"));
                valid = false;
            }
        }
    }

    valid.then_some(allergens)
}
