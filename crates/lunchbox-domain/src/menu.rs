//! Menu module - the documents produced by extraction and served to clients

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dish on a lunch menu
///
/// Items have no identity of their own; their position in
/// [`MenuResponse::menu_items`] mirrors the order on the source page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Loose category label: soup, main, dessert, drink, other, speciality
    #[serde(default)]
    pub category: Option<String>,

    /// Dish name (required, non-empty)
    pub name: String,

    /// Price in CZK
    #[serde(default)]
    pub price: Option<f64>,

    /// Allergen codes as printed on the page (e.g. "1", "3", "7")
    #[serde(default)]
    pub allergens: Vec<String>,

    /// Portion size as free text (e.g. "150g")
    #[serde(default)]
    pub weight: Option<String>,
}

impl MenuItem {
    /// Create an item with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            category: None,
            name: name.into(),
            price: None,
            allergens: Vec::new(),
            weight: None,
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the price
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }
}

/// A restaurant's lunch menu for one day
///
/// `date`, `day_of_week` and `source_url` are always stamped by the service
/// (see [`MenuResponse::stamp`]); whatever the model echoed is discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuResponse {
    /// Restaurant name, when the page states one
    #[serde(default)]
    pub restaurant_name: Option<String>,

    /// Canonical ISO date (`YYYY-MM-DD`)
    pub date: String,

    /// English weekday name
    pub day_of_week: String,

    /// Dishes in source page order
    pub menu_items: Vec<MenuItem>,

    /// Whether this is a daily (as opposed to weekly/permanent) menu
    #[serde(default = "default_true")]
    pub daily_menu: bool,

    /// URL the menu was extracted from
    pub source_url: String,
}

fn default_true() -> bool {
    true
}

impl MenuResponse {
    /// Create an empty menu for the given page and day
    pub fn empty(url: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            restaurant_name: None,
            date: iso_date(date),
            day_of_week: weekday_name(date).to_string(),
            menu_items: Vec::new(),
            daily_menu: true,
            source_url: url.into(),
        }
    }

    /// Overwrite the authoritative fields with service-computed values
    pub fn stamp(&mut self, url: &str, date: NaiveDate) {
        self.date = iso_date(date);
        self.day_of_week = weekday_name(date).to_string();
        self.source_url = url.to_string();
    }

    /// Whether the menu lists no dishes at all
    pub fn is_empty(&self) -> bool {
        self.menu_items.is_empty()
    }
}

/// Response document returned to the client
///
/// The menu fields are flattened next to `cached`, which is not part of the
/// validated menu shape and is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuPayload {
    /// The extracted or cached menu
    #[serde(flatten)]
    pub menu: MenuResponse,

    /// Whether the menu was served from the cache
    pub cached: bool,
}

impl MenuPayload {
    /// Wrap a menu read from the cache
    pub fn from_cache(menu: MenuResponse) -> Self {
        Self { menu, cached: true }
    }

    /// Wrap a freshly extracted menu
    pub fn fresh(menu: MenuResponse) -> Self {
        Self { menu, cached: false }
    }
}

/// Format a date as `YYYY-MM-DD`
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// English weekday name (e.g. "Wednesday")
pub fn weekday_name(date: NaiveDate) -> &'static str {
    use chrono::{Datelike, Weekday};

    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
