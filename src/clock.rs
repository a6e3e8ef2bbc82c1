//! Date and time formatting shared by the stores.

use chrono::{Local, NaiveDate, Utc};

/// Human-readable creation stamp, e.g. `10/19/2026, 3:04:05 PM`.
pub fn display_timestamp() -> String {
    Local::now().format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Calendar date used in export file names.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// `2026-10-19` -> `October 19, 2026`. `None` when the input is not an ISO date.
pub fn long_date_label(iso: &str) -> Option<String> {
    NaiveDate::parse_from_str(iso.trim(), "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%B %-d, %Y").to_string())
}
