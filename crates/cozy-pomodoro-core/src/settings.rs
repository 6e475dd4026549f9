//! User-facing timer settings and their persistence.
//!
//! Settings are stored under the `settings` key as
//! `{pomodoroTime, shortBreakTime, longBreakTime, autoStart, notification, focusMode}`.
//! Every change writes the full snapshot back and hands it to the timer.

use std::ops::RangeInclusive;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};
use crate::events::Event;
use crate::storage::kv::{read_json, write_json, KvStore};
use crate::timer::{Mode, TimerCore};

pub const SETTINGS_KEY: &str = "settings";

pub const WORK_MINUTES: RangeInclusive<u32> = 1..=60;
pub const SHORT_BREAK_MINUTES: RangeInclusive<u32> = 1..=30;
pub const LONG_BREAK_MINUTES: RangeInclusive<u32> = 1..=60;

const DEFAULT_WORK_MINUTES: u32 = 25;
const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;
const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;

/// Keys accepted by [`SettingsSync::set_key`], in display order.
pub const SETTING_KEYS: [&str; 6] = [
    "pomodoroTime",
    "shortBreakTime",
    "longBreakTime",
    "autoStart",
    "notification",
    "focusMode",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(rename = "pomodoroTime")]
    pub work_minutes: u32,
    #[serde(rename = "shortBreakTime")]
    pub short_break_minutes: u32,
    #[serde(rename = "longBreakTime")]
    pub long_break_minutes: u32,
    #[serde(rename = "autoStart")]
    pub auto_start: bool,
    #[serde(rename = "notification")]
    pub notifications_enabled: bool,
    #[serde(rename = "focusMode")]
    pub focus_mode_enabled: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            short_break_minutes: DEFAULT_SHORT_BREAK_MINUTES,
            long_break_minutes: DEFAULT_LONG_BREAK_MINUTES,
            auto_start: false,
            notifications_enabled: true,
            focus_mode_enabled: false,
        }
    }
}

impl TimerConfig {
    pub fn duration_minutes(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Work => self.work_minutes,
            Mode::ShortBreak => self.short_break_minutes,
            Mode::LongBreak => self.long_break_minutes,
        }
    }

    pub fn duration_secs(&self, mode: Mode) -> u64 {
        u64::from(self.duration_minutes(mode)) * 60
    }

    /// Copy with every duration pulled into its allowed range.
    pub fn clamped(self) -> Self {
        Self {
            work_minutes: clamp_minutes(i64::from(self.work_minutes), &WORK_MINUTES),
            short_break_minutes: clamp_minutes(
                i64::from(self.short_break_minutes),
                &SHORT_BREAK_MINUTES,
            ),
            long_break_minutes: clamp_minutes(
                i64::from(self.long_break_minutes),
                &LONG_BREAK_MINUTES,
            ),
            ..self
        }
    }

    fn durations(&self) -> (u32, u32, u32) {
        (
            self.work_minutes,
            self.short_break_minutes,
            self.long_break_minutes,
        )
    }
}

fn clamp_minutes(value: i64, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(i64::from(*range.start()), i64::from(*range.end())) as u32
}

/// Settings as found in storage. Anything missing, zero or of the wrong
/// shape falls back to the default.
#[derive(Debug, Default, Deserialize)]
struct StoredSettings {
    #[serde(rename = "pomodoroTime", default)]
    pomodoro_time: Option<serde_json::Value>,
    #[serde(rename = "shortBreakTime", default)]
    short_break_time: Option<serde_json::Value>,
    #[serde(rename = "longBreakTime", default)]
    long_break_time: Option<serde_json::Value>,
    #[serde(rename = "autoStart", default)]
    auto_start: Option<bool>,
    #[serde(default)]
    notification: Option<bool>,
    #[serde(rename = "focusMode", default)]
    focus_mode: Option<bool>,
}

fn stored_minutes(value: Option<&serde_json::Value>) -> Option<i64> {
    let value = value?;
    let minutes = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.trunc() as i64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<i64>().ok()))?;
    (minutes != 0).then_some(minutes)
}

impl StoredSettings {
    fn into_config(self) -> TimerConfig {
        let defaults = TimerConfig::default();
        let minutes = |value: Option<&serde_json::Value>, fallback: u32, range: &RangeInclusive<u32>| {
            clamp_minutes(stored_minutes(value).unwrap_or(i64::from(fallback)), range)
        };
        TimerConfig {
            work_minutes: minutes(
                self.pomodoro_time.as_ref(),
                defaults.work_minutes,
                &WORK_MINUTES,
            ),
            short_break_minutes: minutes(
                self.short_break_time.as_ref(),
                defaults.short_break_minutes,
                &SHORT_BREAK_MINUTES,
            ),
            long_break_minutes: minutes(
                self.long_break_time.as_ref(),
                defaults.long_break_minutes,
                &LONG_BREAK_MINUTES,
            ),
            auto_start: self.auto_start.unwrap_or(defaults.auto_start),
            notifications_enabled: self
                .notification
                .unwrap_or(defaults.notifications_enabled),
            focus_mode_enabled: self.focus_mode.unwrap_or(defaults.focus_mode_enabled),
        }
    }
}

/// A partial change to the settings. Durations are taken as raw user input
/// and clamped on apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub work_minutes: Option<i64>,
    pub short_break_minutes: Option<i64>,
    pub long_break_minutes: Option<i64>,
    pub auto_start: Option<bool>,
    pub notifications_enabled: Option<bool>,
    pub focus_mode_enabled: Option<bool>,
}

impl SettingsUpdate {
    pub fn durations(work: i64, short_break: i64, long_break: i64) -> Self {
        Self {
            work_minutes: Some(work),
            short_break_minutes: Some(short_break),
            long_break_minutes: Some(long_break),
            ..Self::default()
        }
    }

    fn apply_to(&self, config: TimerConfig) -> TimerConfig {
        TimerConfig {
            work_minutes: self
                .work_minutes
                .map(|m| clamp_minutes(m, &WORK_MINUTES))
                .unwrap_or(config.work_minutes),
            short_break_minutes: self
                .short_break_minutes
                .map(|m| clamp_minutes(m, &SHORT_BREAK_MINUTES))
                .unwrap_or(config.short_break_minutes),
            long_break_minutes: self
                .long_break_minutes
                .map(|m| clamp_minutes(m, &LONG_BREAK_MINUTES))
                .unwrap_or(config.long_break_minutes),
            auto_start: self.auto_start.unwrap_or(config.auto_start),
            notifications_enabled: self
                .notifications_enabled
                .unwrap_or(config.notifications_enabled),
            focus_mode_enabled: self.focus_mode_enabled.unwrap_or(config.focus_mode_enabled),
        }
    }

    /// Parse one `key=value` style change.
    ///
    /// # Errors
    /// Unknown key, or a value that does not parse for that key.
    pub fn from_key_value(key: &str, value: &str) -> Result<Self, ConfigError> {
        let invalid = |expected: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected {expected}, got '{value}'"),
        };
        let minutes = || value.trim().parse::<i64>().map_err(|_| invalid("a whole number of minutes"));
        let flag = || parse_flag(value).ok_or_else(|| invalid("true or false"));

        let mut update = Self::default();
        match key {
            "pomodoroTime" => update.work_minutes = Some(minutes()?),
            "shortBreakTime" => update.short_break_minutes = Some(minutes()?),
            "longBreakTime" => update.long_break_minutes = Some(minutes()?),
            "autoStart" => update.auto_start = Some(flag()?),
            "notification" => update.notifications_enabled = Some(flag()?),
            "focusMode" => update.focus_mode_enabled = Some(flag()?),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(update)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Owns the persisted settings snapshot and pushes changes into the timer.
#[derive(Debug)]
pub struct SettingsSync<S: KvStore> {
    store: S,
    config: TimerConfig,
}

impl<S: KvStore> SettingsSync<S> {
    /// Load settings, falling back to defaults when storage is empty,
    /// corrupt, or unreachable.
    pub fn load(store: S) -> Self {
        let config = match read_json::<StoredSettings>(&store, SETTINGS_KEY) {
            Ok(Some(stored)) => stored.into_config(),
            Ok(None) => {
                debug!("no saved settings, using defaults");
                TimerConfig::default()
            }
            Err(e) => {
                warn!("could not load settings, using defaults: {e}");
                TimerConfig::default()
            }
        };
        Self { store, config }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply a change: clamp, persist, hand the new snapshot to the timer,
    /// and reset the timer when a duration moved.
    pub fn apply(&mut self, core: &mut TimerCore, update: SettingsUpdate) -> Event {
        let previous = self.config;
        self.config = update.apply_to(previous);
        let durations_changed = previous.durations() != self.config.durations();

        if let Err(e) = self.persist() {
            warn!("settings kept in memory only: {e}");
        }

        core.set_config(self.config);
        if durations_changed {
            core.reset();
        }
        debug!(config = ?self.config, durations_changed, "settings applied");

        Event::SettingsChanged {
            config: self.config,
            durations_changed,
            at: Utc::now(),
        }
    }

    /// String form of [`apply`](Self::apply) for command-line input.
    ///
    /// # Errors
    /// Unknown key or unparsable value; nothing is changed in that case.
    pub fn set_key(&mut self, core: &mut TimerCore, key: &str, value: &str) -> Result<Event> {
        let update = SettingsUpdate::from_key_value(key, value)?;
        Ok(self.apply(core, update))
    }

    pub fn get_key(&self, key: &str) -> Option<String> {
        let c = &self.config;
        let value = match key {
            "pomodoroTime" => c.work_minutes.to_string(),
            "shortBreakTime" => c.short_break_minutes.to_string(),
            "longBreakTime" => c.long_break_minutes.to_string(),
            "autoStart" => c.auto_start.to_string(),
            "notification" => c.notifications_enabled.to_string(),
            "focusMode" => c.focus_mode_enabled.to_string(),
            _ => return None,
        };
        Some(value)
    }

    pub fn reset_to_defaults(&mut self, core: &mut TimerCore) -> Event {
        let d = TimerConfig::default();
        self.apply(
            core,
            SettingsUpdate {
                work_minutes: Some(i64::from(d.work_minutes)),
                short_break_minutes: Some(i64::from(d.short_break_minutes)),
                long_break_minutes: Some(i64::from(d.long_break_minutes)),
                auto_start: Some(d.auto_start),
                notifications_enabled: Some(d.notifications_enabled),
                focus_mode_enabled: Some(d.focus_mode_enabled),
            },
        )
    }

    /// Write the full snapshot.
    pub fn persist(&self) -> Result<()> {
        write_json(&self.store, SETTINGS_KEY, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::timer::ManualClock;
    use chrono::TimeZone;
    use std::rc::Rc;

    fn core_with(config: TimerConfig) -> (TimerCore, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        ));
        (TimerCore::new(config, clock.clone()), clock)
    }

    #[test]
    fn defaults_when_nothing_saved() {
        let sync = SettingsSync::load(MemoryStore::new());
        assert_eq!(*sync.config(), TimerConfig::default());
    }

    #[test]
    fn loads_and_clamps_saved_values() {
        let store = MemoryStore::new();
        store
            .set(
                SETTINGS_KEY,
                r#"{"pomodoroTime":90,"shortBreakTime":0,"longBreakTime":"20","autoStart":true,"focusMode":true}"#,
            )
            .unwrap();
        let config = *SettingsSync::load(store).config();
        assert_eq!(config.work_minutes, 60);
        // zero means "not set"
        assert_eq!(config.short_break_minutes, 5);
        assert_eq!(config.long_break_minutes, 20);
        assert!(config.auto_start);
        // notification defaults to on when absent
        assert!(config.notifications_enabled);
        assert!(config.focus_mode_enabled);
    }

    #[test]
    fn corrupt_or_unavailable_storage_falls_back_to_defaults() {
        let store = MemoryStore::new();
        store.set(SETTINGS_KEY, "{{{").unwrap();
        assert_eq!(*SettingsSync::load(store).config(), TimerConfig::default());
        assert_eq!(
            *SettingsSync::load(MemoryStore::unavailable()).config(),
            TimerConfig::default()
        );
    }

    #[test]
    fn apply_clamps_persists_and_resets_timer() {
        let (mut core, _clock) = core_with(TimerConfig::default());
        let mut sync = SettingsSync::load(MemoryStore::new());

        let event = sync.apply(&mut core, SettingsUpdate::durations(0, 45, 61));
        match event {
            Event::SettingsChanged {
                config,
                durations_changed,
                ..
            } => {
                assert!(durations_changed);
                assert_eq!(config.work_minutes, 1);
                assert_eq!(config.short_break_minutes, 30);
                assert_eq!(config.long_break_minutes, 60);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(core.remaining_secs(), 60);

        let saved: serde_json::Value =
            serde_json::from_str(&sync.store().get(SETTINGS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved["pomodoroTime"], 1);
        assert_eq!(saved["shortBreakTime"], 30);
        assert_eq!(saved["notification"], true);
    }

    #[test]
    fn duration_change_while_running_pauses_and_reloads() {
        let (mut core, clock) = core_with(TimerConfig::default());
        let mut sync = SettingsSync::load(MemoryStore::new());
        core.start();
        clock.advance_ms(10_000);
        core.tick();

        sync.apply(
            &mut core,
            SettingsUpdate {
                work_minutes: Some(30),
                ..SettingsUpdate::default()
            },
        );
        assert!(!core.is_running());
        assert_eq!(core.remaining_secs(), 30 * 60);
    }

    #[test]
    fn toggle_change_does_not_reset() {
        let (mut core, clock) = core_with(TimerConfig::default());
        let mut sync = SettingsSync::load(MemoryStore::new());
        core.start();
        clock.advance_ms(5_000);
        core.tick();

        sync.set_key(&mut core, "autoStart", "true").unwrap();
        assert!(core.is_running());
        assert!(core.config().auto_start);
        assert_eq!(core.remaining_secs(), 25 * 60 - 5);
    }

    #[test]
    fn set_key_rejects_bad_input_without_changes() {
        let (mut core, _clock) = core_with(TimerConfig::default());
        let mut sync = SettingsSync::load(MemoryStore::new());
        assert!(sync.set_key(&mut core, "volume", "3").is_err());
        assert!(sync.set_key(&mut core, "pomodoroTime", "soon").is_err());
        assert!(sync.set_key(&mut core, "focusMode", "maybe").is_err());
        assert_eq!(*sync.config(), TimerConfig::default());
        assert!(sync.store().get(SETTINGS_KEY).unwrap().is_none());
    }

    #[test]
    fn get_key_and_reset_to_defaults() {
        let (mut core, _clock) = core_with(TimerConfig::default());
        let mut sync = SettingsSync::load(MemoryStore::new());
        sync.set_key(&mut core, "longBreakTime", "25").unwrap();
        assert_eq!(sync.get_key("longBreakTime").as_deref(), Some("25"));
        assert!(sync.get_key("nope").is_none());

        sync.reset_to_defaults(&mut core);
        assert_eq!(*sync.config(), TimerConfig::default());
        assert_eq!(*core.config(), TimerConfig::default());
    }

    #[test]
    fn unavailable_storage_still_applies_in_memory() {
        let (mut core, _clock) = core_with(TimerConfig::default());
        let mut sync = SettingsSync::load(MemoryStore::unavailable());
        sync.set_key(&mut core, "pomodoroTime", "50").unwrap();
        assert_eq!(sync.config().work_minutes, 50);
        assert_eq!(core.remaining_secs(), 50 * 60);
    }
}
