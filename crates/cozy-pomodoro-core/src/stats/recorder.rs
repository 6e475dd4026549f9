use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::calendar::{date_key, iso_week_key, month_days, month_key, week_days, DAY_LABELS};
use crate::events::Event;
use crate::storage::kv::{read_json, write_json, KvStore};
use crate::timer::StatsSink;

pub const STATS_KEY: &str = "stats";

/// Completed work sessions, bucketed. Persisted as one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    #[serde(default)]
    pub daily: BTreeMap<String, u64>,
    #[serde(default)]
    pub weekly: BTreeMap<String, u64>,
    #[serde(default)]
    pub monthly: BTreeMap<String, u64>,
    #[serde(default)]
    pub total: u64,
}

/// One bar of the weekly chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub date: NaiveDate,
    pub today: u64,
    pub week_key: String,
    pub week: u64,
    pub month_key: String,
    pub month: u64,
    pub total: u64,
}

type RefreshHook = Box<dyn FnMut(&SessionStats)>;

/// Owns [`SessionStats`]; the timer writes to it through [`StatsSink`].
pub struct StatsRecorder<S: KvStore> {
    store: S,
    stats: SessionStats,
    on_refresh: Option<RefreshHook>,
}

impl<S: KvStore> fmt::Debug for StatsRecorder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsRecorder")
            .field("stats", &self.stats)
            .field("on_refresh", &self.on_refresh.is_some())
            .finish()
    }
}

impl<S: KvStore> StatsRecorder<S> {
    /// Load saved stats; empty when nothing is saved or it cannot be read.
    pub fn load(store: S) -> Self {
        let stats = match read_json::<SessionStats>(&store, STATS_KEY) {
            Ok(Some(stats)) => stats,
            Ok(None) => SessionStats::default(),
            Err(e) => {
                warn!("could not load stats, starting empty: {e}");
                SessionStats::default()
            }
        };
        Self {
            store,
            stats,
            on_refresh: None,
        }
    }

    /// Called with the new stats after every recorded completion.
    pub fn on_refresh(mut self, hook: impl FnMut(&SessionStats) + 'static) -> Self {
        self.on_refresh = Some(Box::new(hook));
        self
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Count one completed work session on `date`.
    pub fn record(&mut self, date: NaiveDate) -> Event {
        let day = date_key(date);
        *self.stats.daily.entry(day).or_insert(0) += 1;

        let week_key = iso_week_key(date);
        let week_count = self.week_total(date);
        self.stats.weekly.insert(week_key.clone(), week_count);
        let month_count = self.month_total(date);
        self.stats.monthly.insert(month_key(date), month_count);
        self.stats.total += 1;

        if let Err(e) = write_json(&self.store, STATS_KEY, &self.stats) {
            warn!("stats kept in memory only: {e}");
        }
        debug!(%date, week = %week_key, total = self.stats.total, "completion recorded");

        if let Some(hook) = self.on_refresh.as_mut() {
            hook(&self.stats);
        }

        Event::StatsRecorded {
            date,
            day_count: self.day_count(date),
            week_key,
            week_count,
            total: self.stats.total,
            at: Utc::now(),
        }
    }

    pub fn day_count(&self, date: NaiveDate) -> u64 {
        self.stats.daily.get(&date_key(date)).copied().unwrap_or(0)
    }

    /// Sessions in `date`'s ISO week, Monday through Sunday.
    pub fn week_total(&self, date: NaiveDate) -> u64 {
        week_days(date).iter().map(|d| self.day_count(*d)).sum()
    }

    pub fn month_total(&self, date: NaiveDate) -> u64 {
        month_days(date).map(|d| self.day_count(d)).sum()
    }

    pub fn total(&self) -> u64 {
        self.stats.total
    }

    /// Per-day counts for `date`'s week, Monday first.
    pub fn week_days(&self, date: NaiveDate) -> Vec<DayCount> {
        week_days(date)
            .iter()
            .zip(DAY_LABELS)
            .map(|(d, label)| DayCount {
                date: *d,
                label: label.to_string(),
                count: self.day_count(*d),
            })
            .collect()
    }

    pub fn summary(&self, date: NaiveDate) -> StatsSummary {
        StatsSummary {
            date,
            today: self.day_count(date),
            week_key: iso_week_key(date),
            week: self.week_total(date),
            month_key: month_key(date),
            month: self.month_total(date),
            total: self.stats.total,
        }
    }
}

impl<S: KvStore> StatsSink for StatsRecorder<S> {
    fn record_completion(&mut self, date: NaiveDate) {
        self.record(date);
    }
}
