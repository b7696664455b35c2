//! LLM prompt engineering for menu extraction

use chrono::NaiveDate;
use lunchbox_domain::{iso_date, weekday_name, ExtractionMode};

use crate::tools::NORMALIZE_PRICES;

/// Builds the prompts for one extraction attempt
pub struct PromptBuilder {
    mode: ExtractionMode,
    url: String,
    target_date: NaiveDate,
    page_text: Option<String>,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(mode: ExtractionMode, url: impl Into<String>, target_date: NaiveDate) -> Self {
        Self {
            mode,
            url: url.into(),
            target_date,
            page_text: None,
        }
    }

    /// Attach the visible page text the model should read
    pub fn with_page_text(mut self, text: impl Into<String>) -> Self {
        self.page_text = Some(text.into());
        self
    }

    /// The system turn, identical for every mode
    pub fn system_message() -> String {
        format!(
            "You are an assistant that EXTRACTS a restaurant LUNCH MENU from raw webpage text. \
             You must respond ONLY with final JSON that matches the requested schema. \
             If you need to convert messy price strings like '145,- Kc' to numeric values, \
             you MUST call the '{NORMALIZE_PRICES}' tool."
        )
    }

    /// The mode-specific instructions, without page text
    pub fn user_message(&self) -> String {
        let mut prompt = String::new();

        let (date, weekday) = match self.mode {
            ExtractionMode::Strict => {
                let target_iso = iso_date(self.target_date);
                let weekday = weekday_name(self.target_date);
                prompt.push_str(&format!("Requested date (ISO): {target_iso}\n"));
                prompt.push_str(&format!("Requested weekday (English): {weekday}\n"));
                prompt.push_str(&format!("Page URL: {}\n\n", self.url));
                prompt.push_str(STRICT_INSTRUCTIONS);
                (target_iso, weekday)
            }
            ExtractionMode::Loose => {
                prompt.push_str(&format!("Page URL: {}\n\n", self.url));
                prompt.push_str(LOOSE_INSTRUCTIONS);
                // Placeholders; the menu is stamped with the real values afterwards
                ("YYYY-MM-DD".to_string(), "weekday")
            }
        };

        prompt.push_str("\n\n");
        prompt.push_str(ITEM_RULES);
        prompt.push_str("\n\n");
        prompt.push_str(&output_structure(&date, weekday, &self.url));

        prompt
    }

    /// Build the complete user turn: instructions followed by the page text
    pub fn build(&self) -> String {
        let mut prompt = self.user_message();

        if let Some(text) = &self.page_text {
            prompt.push_str("\n\nPage text:\n");
            prompt.push_str("---\n");
            prompt.push_str(text);
            prompt.push_str("\n---\n");
        }

        prompt
    }
}

fn output_structure(target_iso: &str, weekday: &str, url: &str) -> String {
    format!(
        r#"Return ONLY JSON in this exact structure:

{{
  "restaurant_name": "restaurant name or null",
  "date": "{target_iso}",
  "day_of_week": "{weekday}",
  "menu_items": [
    {{
      "category": "soup / main / dessert / drink / other",
      "name": "dish name",
      "price": 145,
      "allergens": ["1", "3", "7"],
      "weight": "150g"
    }}
  ],
  "daily_menu": true,
  "source_url": "{url}"
}}"#
    )
}

const STRICT_INSTRUCTIONS: &str = r#"You receive raw text of a restaurant webpage.

Your task is to EXTRACT THE FULL LUNCH MENU for the requested date, not a summary.

VERY IMPORTANT RULES (STRICT MODE):

1. Find the section that corresponds to the requested date (for example
   a heading like "STŘEDA 19.11.2025"). Treat ALL dishes listed under this heading
   until the next date/heading as part of the lunch menu for that day."#;

const LOOSE_INSTRUCTIONS: &str = r#"You receive raw text of a restaurant webpage.

Your task is to EXTRACT THE CURRENT LUNCH MENU shown on the page, not a summary.

VERY IMPORTANT RULES (LOOSE MODE):

1. Do not insist on a particular date, weekday or year. Take the daily or weekly
   lunch menu the page currently presents. If the page shows a weekly menu, list
   the dishes of the whole week, including items served every day."#;

const ITEM_RULES: &str = r#"2. You MUST return ALL individual dishes as separate items in menu_items.
   Do NOT summarise multiple dishes into a single item. If there are 5 main dishes,
   there must be 5 separate objects in the menu_items array (plus soups, desserts, etc.).

3. Include at least:
   - every soup with a price,
   - every main course with a price,
   - any visible dessert or speciality with a price.
   Even if the menu looks long, list all items.

4. When extracting dishes, if prices appear in formats like "145,-", "145 Kč", "145 CZK",
   collect these raw price strings and call the 'normalize_prices' tool with an array
   of them to get numeric values in CZK. Then fill the numeric 'price' field
   in the final JSON (or null if unknown).

5. Guess the category based on the words:
   - if the name contains "polévka", "krém" → category = "soup"
   - sweet dishes / desserts → category = "dessert"
   - everything else → category = "main" or "speciality" as appropriate.

You should return an EMPTY menu_items array ONLY if the page clearly does not contain
any lunch menu or explicitly says the restaurant is closed."#;
