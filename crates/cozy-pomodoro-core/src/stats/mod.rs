//! Statistics for completed work sessions.
//!
//! Completions are counted per UTC day and rolled up into ISO weeks,
//! calendar months and a lifetime total.

pub mod calendar;
mod recorder;

pub use calendar::{date_key, iso_week_key, month_key};
pub use recorder::{DayCount, SessionStats, StatsRecorder, StatsSummary, STATS_KEY};
