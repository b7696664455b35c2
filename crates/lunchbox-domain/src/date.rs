//! Requested-date parsing
//!
//! Clients send dates the way Czech restaurant pages print them, so besides
//! ISO dates the parser accepts `DD.MM.YYYY` and the year-less `DD.MM`.
//! Formats are tried in a fixed order and the first match wins:
//!
//! 1. `YYYY-MM-DD`
//! 2. `DD.MM.YYYY` / `DD.MM.YYYY.` (whitespace anywhere is ignored)
//! 3. `DD.MM` / `DD.MM.` in the current year
//!
//! Years must be written with exactly four digits.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// The input matched none of the accepted date formats
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized date '{input}', expected YYYY-MM-DD, DD.MM.YYYY or DD.MM")]
pub struct DateFormatError {
    /// The rejected input, as received
    pub input: String,
}

/// Parse a requested date relative to `today`
///
/// Empty or absent input means `today`; whitespace-only input is present
/// and fails like any other unrecognized text. Year-less input takes the
/// year of `today`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use lunchbox_domain::parse_input_date;
///
/// let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
/// let date = parse_input_date(Some("19. 11. 2030"), today).unwrap();
/// assert_eq!(date, NaiveDate::from_ymd_opt(2030, 11, 19).unwrap());
/// ```
pub fn parse_input_date(input: Option<&str>, today: NaiveDate) -> Result<NaiveDate, DateFormatError> {
    let raw = match input {
        None | Some("") => return Ok(today),
        Some(raw) => raw.trim(),
    };

    if four_digit_year(raw.split('-').next()) {
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(date);
        }
    }

    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let without_dot = compact.strip_suffix('.').unwrap_or(&compact);

    if four_digit_year(without_dot.rsplit('.').next()) {
        for format in ["%d.%m.%Y", "%d.%m.%Y."] {
            if let Ok(date) = NaiveDate::parse_from_str(&compact, format) {
                return Ok(date);
            }
        }
    }

    if let Some(date) = parse_day_month(without_dot, today.year()) {
        return Ok(date);
    }

    Err(DateFormatError {
        input: raw.to_string(),
    })
}

// chrono's %Y takes one to four digits
fn four_digit_year(segment: Option<&str>) -> bool {
    segment.is_some_and(|s| s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()))
}

/// Parse `D.M` / `DD.MM` into a date in `year`
fn parse_day_month(s: &str, year: i32) -> Option<NaiveDate> {
    let (day, month) = s.split_once('.')?;
    let day = parse_component(day)?;
    let month = parse_component(month)?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every calendar date survives all three spellings
        #[test]
        fn test_all_spellings_agree(y in 2000i32..2100, m in 1u32..=12, d in 1u32..=28) {
            let expected = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            let today = NaiveDate::from_ymd_opt(y, 1, 1).unwrap();

            let iso = format!("{y:04}-{m:02}-{d:02}");
            let czech = format!("{d}.{m}.{y}");
            let short = format!("{d:02}.{m:02}.");

            prop_assert_eq!(parse_input_date(Some(&iso), today).unwrap(), expected);
            prop_assert_eq!(parse_input_date(Some(&czech), today).unwrap(), expected);
            prop_assert_eq!(parse_input_date(Some(&short), today).unwrap(), expected);
        }

        /// Property: inputs without digits never parse
        #[test]
        fn test_digitless_input_fails(s in "[a-zA-Z .-]{1,20}") {
            prop_assume!(!s.trim().is_empty());
            prop_assert!(parse_input_date(Some(&s), NaiveDate::MIN).is_err());
        }
    }
}
