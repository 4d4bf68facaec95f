//! Calendar helpers for the inspection window.

use chrono::NaiveDate;

/// First night checked when no `--start` is given.
pub const DEFAULT_START: &str = "2026-07-26";
/// Last night checked when no `--end` is given.
pub const DEFAULT_END: &str = "2026-08-02";

/// Every day from `start` to `end`, both included, in ascending order.
///
/// Returns an empty range when `start` is after `end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// `YYYY-MM-DD`, the key every bulk provider uses.
pub fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `DD/MM/YYYY`.
pub fn dmy(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
