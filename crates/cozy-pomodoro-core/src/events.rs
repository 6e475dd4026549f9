use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::settings::TimerConfig;
use crate::timer::{Mode, RewardTier};

/// Every state change in the system produces an Event.
/// Hosts print or forward them; tests match on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        remaining_secs: u64,
        deadline_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        mode: Mode,
        next_mode: Mode,
        sessions_completed: u64,
        /// Set only when a work session finished.
        reward: Option<RewardTier>,
        auto_started: bool,
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    ModeChangeRejected {
        requested: Mode,
        reason: String,
        at: DateTime<Utc>,
    },
    SettingsChanged {
        config: TimerConfig,
        durations_changed: bool,
        at: DateTime<Utc>,
    },
    StatsRecorded {
        date: NaiveDate,
        day_count: u64,
        week_key: String,
        week_count: u64,
        total: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        progress: f64,
        sessions_completed: u64,
        today_sessions: u64,
        at: DateTime<Utc>,
    },
}
