//! # Cozy Pomodoro Core Library
//!
//! This library provides the core logic for the Cozy Pomodoro timer. Every
//! operation is available through the `cozy-pomodoro` CLI, which is a thin
//! layer over the same types.
//!
//! ## Architecture
//!
//! - **Timer Core**: A wall-clock-based state machine that requires the caller
//!   to periodically invoke `tick()`. Alerts, stats, rewards and focus mode are
//!   reached through injected collaborator traits.
//! - **Settings Sync**: Loads, clamps and persists user settings and pushes
//!   them into the timer.
//! - **Stats Recorder**: Counts completed work sessions per day, ISO week,
//!   month and in total.
//! - **Storage**: A string key/value store (SQLite or in-memory) plus a TOML
//!   application config.
//!
//! ## Key Components
//!
//! - [`TimerCore`]: Core timer state machine
//! - [`SettingsSync`]: Settings persistence
//! - [`StatsRecorder`]: Session statistics
//! - [`Database`]: SQLite-backed [`KvStore`]
//! - [`AppConfig`]: Application configuration management

pub mod ambience;
pub mod error;
pub mod events;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use ambience::{
    Ambience, AmbienceSettings, GradientIntensity, GradientSettings, GradientSpeed, Sound,
    ThemePreference,
};
pub use error::{ConfigError, CoreError, Result, StorageError, ValidationError};
pub use events::Event;
pub use settings::{SettingsSync, SettingsUpdate, TimerConfig};
pub use stats::{SessionStats, StatsRecorder, StatsSummary};
pub use storage::{AppConfig, Database, KvStore, MemoryStore};
pub use task::{Task, TaskList};
pub use timer::{
    Clock, Collaborators, ManualClock, Mode, Reward, RewardTier, SystemClock, TimerCheckpoint,
    TimerCore, TimerState,
};
