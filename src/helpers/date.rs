//! Date helper functions

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;

/// Format used when a configured one is unusable
pub const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date with a strftime string.
///
/// An invalid format string falls back to `YYYY-MM-DD` instead of failing.
///
/// # Examples
/// ```ignore
/// format_date(&date, "%B %-d, %Y") // -> "January 5, 2024"
/// ```
pub fn format_date(date: &NaiveDate, format: &str) -> String {
    let valid = StrftimeItems::new(format).all(|item| !matches!(item, Item::Error));
    if valid {
        date.format(format).to_string()
    } else {
        tracing::debug!("Invalid date format {:?}, using default", format);
        date.format(FALLBACK_DATE_FORMAT).to_string()
    }
}

/// Format a date for `<time datetime="...">`
pub fn date_iso(date: &NaiveDate) -> String {
    date.format(FALLBACK_DATE_FORMAT).to_string()
}
