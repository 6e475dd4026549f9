//! Date bucketing for stats keys.

use chrono::{Datelike, Duration, NaiveDate};

/// Short weekday labels, Monday first.
pub const DAY_LABELS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// `YYYY-MM-DD`
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// ISO-8601 week key: Monday-start weeks, week 1 holds the year's first
/// Thursday. The year is the ISO year, so 2024-12-30 is `2025-W1`.
/// Week numbers are not zero padded.
pub fn iso_week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{}", week.year(), week.week())
}

/// `YYYY-MM`
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// The seven dates of `date`'s ISO week, Monday first.
pub fn week_days(date: NaiveDate) -> [NaiveDate; 7] {
    let monday = week_start(date);
    std::array::from_fn(|i| monday + Duration::days(i as i64))
}

/// Every date in `date`'s calendar month.
pub fn month_days(date: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let first = date.with_day(1).unwrap_or(date);
    let month = first.month();
    first.iter_days().take_while(move |d| d.month() == month)
}
