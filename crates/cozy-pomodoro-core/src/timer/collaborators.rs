//! Capability traits the timer core talks to.
//!
//! Every collaborator is optional. When one is not wired up the core logs
//! and carries on, so a headless host can run the timer with nothing but a
//! clock.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::mode::Mode;
use super::reward::Reward;

/// Desktop notification permission, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    #[default]
    Default,
}

pub trait Notifier {
    fn request_permission(&mut self) -> Permission;
    fn permission(&self) -> Permission;
    fn show(&mut self, title: &str, body: &str);
}

pub trait AudioSink {
    fn play(&mut self, sound_id: &str);
    fn stop(&mut self, _sound_id: &str) {}
    /// Volume in `0.0..=1.0`.
    fn set_volume(&mut self, _volume: f32) {}
}

/// Receives one call per completed work session.
pub trait StatsSink {
    fn record_completion(&mut self, date: NaiveDate);
}

pub trait RewardSink {
    fn show_reward(&mut self, reward: &Reward);
}

/// Focus overlay; entered when a work session starts, left when it ends.
pub trait FocusSink {
    fn enter(&mut self);
    fn exit(&mut self);
}

/// Display-side hooks. All default to no-ops.
pub trait TimerObserver {
    fn on_tick(&mut self, _remaining_secs: u64, _progress: f64) {}
    fn on_complete(&mut self, _mode: Mode, _sessions_completed: u64) {}
    fn on_mode_change_rejected(&mut self, _reason: &str) {}
    fn on_mode_changed(&mut self, _mode: Mode) {}
}

impl<T: StatsSink + ?Sized> StatsSink for Rc<RefCell<T>> {
    fn record_completion(&mut self, date: NaiveDate) {
        self.borrow_mut().record_completion(date);
    }
}

impl<T: TimerObserver + ?Sized> TimerObserver for Rc<RefCell<T>> {
    fn on_tick(&mut self, remaining_secs: u64, progress: f64) {
        self.borrow_mut().on_tick(remaining_secs, progress);
    }

    fn on_complete(&mut self, mode: Mode, sessions_completed: u64) {
        self.borrow_mut().on_complete(mode, sessions_completed);
    }

    fn on_mode_change_rejected(&mut self, reason: &str) {
        self.borrow_mut().on_mode_change_rejected(reason);
    }

    fn on_mode_changed(&mut self, mode: Mode) {
        self.borrow_mut().on_mode_changed(mode);
    }
}

/// Text and sound used when a countdown finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alerts {
    pub title: String,
    pub sound_id: String,
}

impl Default for Alerts {
    fn default() -> Self {
        Self {
            title: "Cozy Pomodoro Timer".into(),
            sound_id: "timer-complete".into(),
        }
    }
}

impl Alerts {
    pub fn body_for(finished: Mode) -> &'static str {
        match finished {
            Mode::Work => "Pomodoro complete! Time for a break.",
            Mode::ShortBreak | Mode::LongBreak => "Break is over! Ready for the next pomodoro?",
        }
    }
}

/// Everything the core can call out to.
#[derive(Default)]
pub struct Collaborators {
    pub observer: Option<Box<dyn TimerObserver>>,
    pub stats: Option<Box<dyn StatsSink>>,
    pub rewards: Option<Box<dyn RewardSink>>,
    pub focus: Option<Box<dyn FocusSink>>,
    pub notifier: Option<Box<dyn Notifier>>,
    pub audio: Option<Box<dyn AudioSink>>,
    pub alerts: Alerts,
}

impl Collaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(mut self, observer: impl TimerObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn with_stats(mut self, stats: impl StatsSink + 'static) -> Self {
        self.stats = Some(Box::new(stats));
        self
    }

    pub fn with_rewards(mut self, rewards: impl RewardSink + 'static) -> Self {
        self.rewards = Some(Box::new(rewards));
        self
    }

    pub fn with_focus(mut self, focus: impl FocusSink + 'static) -> Self {
        self.focus = Some(Box::new(focus));
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    pub fn with_audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    pub fn with_alerts(mut self, alerts: Alerts) -> Self {
        self.alerts = alerts;
        self
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("observer", &self.observer.is_some())
            .field("stats", &self.stats.is_some())
            .field("rewards", &self.rewards.is_some())
            .field("focus", &self.focus.is_some())
            .field("notifier", &self.notifier.is_some())
            .field("audio", &self.audio.is_some())
            .field("alerts", &self.alerts)
            .finish()
    }
}
