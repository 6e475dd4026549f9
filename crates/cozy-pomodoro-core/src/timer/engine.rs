//! Timer core implementation.
//!
//! The timer core is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically (every 100ms or faster) while the timer runs.
//!
//! Remaining time is recomputed from an absolute deadline on every tick, so
//! late or skipped ticks never make the countdown drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle/Paused -> Running -> Paused
//!                   |
//!                   +-> (deadline reached) complete -> next mode, Idle or Running
//! ```
//!
//! The mode (work, short break, long break) is orthogonal to the run state
//! and can only be changed while the timer is stopped.
//!
//! ## Usage
//!
//! ```ignore
//! let mut core = TimerCore::new(config, Rc::new(SystemClock));
//! core.start();
//! // In a loop:
//! core.tick(); // Returns Some(Event::TimerCompleted) when the countdown ends
//! ```

use std::rc::Rc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::collaborators::{Alerts, Collaborators, Permission};
use super::mode::Mode;
use super::reward::Reward;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::settings::TimerConfig;

/// Warning shown when a mode change is attempted mid-countdown.
pub const MODE_CHANGE_WHILE_RUNNING: &str = "Timer must be stopped first";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: Mode,
    pub remaining_secs: u64,
    pub running: bool,
    pub sessions_completed: u64,
    pub today_sessions: u64,
    /// UTC date `today_sessions` counts for.
    #[serde(default)]
    pub last_session_date: Option<NaiveDate>,
}

/// Serializable form of the core, so a countdown survives a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerCheckpoint {
    pub state: TimerState,
    /// Absolute deadline (ms since epoch) while running.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

/// Core timer state machine.
///
/// Exactly one countdown exists at a time: it is the deadline, and it is
/// set if and only if the timer is running.
#[derive(Debug)]
pub struct TimerCore {
    config: TimerConfig,
    state: TimerState,
    deadline_ms: Option<u64>,
    progress: f64,
    clock: Rc<dyn Clock>,
    collaborators: Collaborators,
}

impl TimerCore {
    /// Create an idle timer in work mode with a full countdown.
    pub fn new(config: TimerConfig, clock: Rc<dyn Clock>) -> Self {
        let config = config.clamped();
        Self {
            state: TimerState {
                mode: Mode::Work,
                remaining_secs: config.duration_secs(Mode::Work),
                running: false,
                sessions_completed: 0,
                today_sessions: 0,
                last_session_date: None,
            },
            config,
            deadline_ms: None,
            progress: 0.0,
            clock,
            collaborators: Collaborators::default(),
        }
    }

    /// Rebuild a timer from a checkpoint taken with [`checkpoint`](Self::checkpoint).
    ///
    /// A running checkpoint keeps counting toward its original deadline; if
    /// that deadline has already passed, the next `tick()` completes it.
    pub fn restore(config: TimerConfig, checkpoint: TimerCheckpoint, clock: Rc<dyn Clock>) -> Self {
        let mut core = Self::new(config, clock);
        let TimerCheckpoint {
            mut state,
            deadline_ms,
        } = checkpoint;

        let total_secs = core.config.duration_secs(state.mode);
        state.remaining_secs = state.remaining_secs.min(total_secs);
        // A deadline can never lie further out than one full session.
        let latest = core.clock.now_ms().saturating_add(total_secs * 1000);
        core.deadline_ms = if state.running {
            deadline_ms.map(|deadline| deadline.min(latest))
        } else {
            None
        };
        state.running = core.deadline_ms.is_some();
        core.state = state;
        core.progress = core.progress_for(core.state.remaining_secs);
        core
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    pub fn checkpoint(&self) -> TimerCheckpoint {
        TimerCheckpoint {
            state: self.state.clone(),
            deadline_ms: self.deadline_ms,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    pub fn sessions_completed(&self) -> u64 {
        self.state.sessions_completed
    }

    /// Work sessions finished on the clock's current UTC date.
    pub fn today_sessions(&self) -> u64 {
        if self.state.last_session_date == Some(self.clock.today()) {
            self.state.today_sessions
        } else {
            0
        }
    }

    /// Full duration of the current mode.
    pub fn total_secs(&self) -> u64 {
        self.config.duration_secs(self.state.mode)
    }

    /// 0.0 .. 1.0 progress within the current countdown.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.state.mode,
            running: self.state.running,
            remaining_secs: self.state.remaining_secs,
            total_secs: self.total_secs(),
            progress: self.progress,
            sessions_completed: self.state.sessions_completed,
            today_sessions: self.today_sessions(),
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.state.running {
            return None;
        }

        let deadline = self
            .clock
            .now_ms()
            .saturating_add(self.state.remaining_secs.saturating_mul(1000));
        self.deadline_ms = Some(deadline);
        self.state.running = true;
        debug!(mode = %self.state.mode, remaining_secs = self.state.remaining_secs, "timer started");

        if self.state.mode == Mode::Work && self.config.focus_mode_enabled {
            match self.collaborators.focus.as_mut() {
                Some(focus) => focus.enter(),
                None => skip("focus"),
            }
        }

        Some(Event::TimerStarted {
            mode: self.state.mode,
            remaining_secs: self.state.remaining_secs,
            deadline_ms: deadline,
            at: self.clock.now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }

        if let Some(deadline) = self.deadline_ms.take() {
            self.state.remaining_secs = self.remaining_until(deadline);
        }
        self.state.running = false;
        self.progress = self.progress_for(self.state.remaining_secs);
        debug!(remaining_secs = self.state.remaining_secs, "timer paused");

        Some(Event::TimerPaused {
            mode: self.state.mode,
            remaining_secs: self.state.remaining_secs,
            at: self.clock.now(),
        })
    }

    /// Stop the countdown and refill it for the current mode.
    pub fn reset(&mut self) -> Option<Event> {
        self.pause();
        self.state.remaining_secs = self.total_secs();
        self.progress = 0.0;
        Some(Event::TimerReset {
            mode: self.state.mode,
            remaining_secs: self.state.remaining_secs,
            at: self.clock.now(),
        })
    }

    /// Call periodically. Returns `Some(Event::TimerCompleted)` when the
    /// countdown finishes.
    pub fn tick(&mut self) -> Option<Event> {
        let deadline = match (self.state.running, self.deadline_ms) {
            (true, Some(deadline)) => deadline,
            _ => return None,
        };

        let remaining = self.remaining_until(deadline);
        if remaining == 0 {
            return self.complete();
        }

        self.state.remaining_secs = remaining;
        self.progress = self.progress_for(remaining);
        if let Some(observer) = self.collaborators.observer.as_mut() {
            observer.on_tick(remaining, self.progress);
        }
        None
    }

    /// Finish the current countdown and move to the next mode.
    pub fn complete(&mut self) -> Option<Event> {
        let finished = self.state.mode;
        self.deadline_ms = None;
        self.state.running = false;
        self.state.remaining_secs = 0;

        self.alert(finished);

        let (next_mode, reward) = match finished {
            Mode::Work => {
                self.state.sessions_completed += 1;
                let sessions = self.state.sessions_completed;
                let today = self.clock.today();
                self.count_today(today);
                info!(sessions, today_sessions = self.state.today_sessions, "work session completed");

                match self.collaborators.stats.as_mut() {
                    Some(stats) => stats.record_completion(today),
                    None => warn!("{}; completion not recorded", CoreError::MissingCollaborator("stats")),
                }

                let reward = Reward::for_sessions(sessions);
                match self.collaborators.rewards.as_mut() {
                    Some(rewards) => rewards.show_reward(&reward),
                    None => skip("rewards"),
                }

                match self.collaborators.focus.as_mut() {
                    Some(focus) => focus.exit(),
                    None => skip("focus"),
                }

                (Mode::break_after(sessions), Some(reward.tier))
            }
            Mode::ShortBreak | Mode::LongBreak => {
                info!(mode = %finished, "break completed");
                (Mode::Work, None)
            }
        };

        // Cannot be rejected: the running flag was cleared above.
        self.enter_mode(next_mode);

        if let Some(observer) = self.collaborators.observer.as_mut() {
            observer.on_complete(finished, self.state.sessions_completed);
        }

        let auto_started = self.config.auto_start && self.start().is_some();

        Some(Event::TimerCompleted {
            mode: finished,
            next_mode,
            sessions_completed: self.state.sessions_completed,
            reward,
            auto_started,
            at: self.clock.now(),
        })
    }

    /// Switch mode and refill the countdown. Rejected while running.
    ///
    /// # Errors
    /// [`CoreError::InvalidModeTransition`] if the timer is running; the
    /// state is left untouched and the observer is told why.
    pub fn change_mode(&mut self, mode: Mode) -> Result<Event> {
        if self.state.running {
            warn!(requested = %mode, "{MODE_CHANGE_WHILE_RUNNING}");
            if let Some(observer) = self.collaborators.observer.as_mut() {
                observer.on_mode_change_rejected(MODE_CHANGE_WHILE_RUNNING);
            }
            return Err(CoreError::InvalidModeTransition {
                reason: MODE_CHANGE_WHILE_RUNNING.into(),
            });
        }
        Ok(self.enter_mode(mode))
    }

    /// Replace the settings the timer reads. Keeps the countdown within the
    /// new duration; callers reset explicitly when durations change.
    pub fn set_config(&mut self, config: TimerConfig) {
        self.config = config.clamped();
        let total = self.total_secs();
        if self.state.remaining_secs > total {
            self.state.remaining_secs = total;
        }
        self.progress = self.progress_for(self.state.remaining_secs);
    }

    /// Ask the host for notification permission if it has not been decided.
    pub fn request_notification_permission(&mut self) -> Option<Permission> {
        let notifier = self.collaborators.notifier.as_mut()?;
        match notifier.permission() {
            Permission::Default => Some(notifier.request_permission()),
            decided => Some(decided),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter_mode(&mut self, mode: Mode) -> Event {
        self.state.mode = mode;
        self.state.remaining_secs = self.total_secs();
        self.progress = 0.0;
        debug!(mode = %mode, remaining_secs = self.state.remaining_secs, "mode changed");
        if let Some(observer) = self.collaborators.observer.as_mut() {
            observer.on_mode_changed(mode);
        }
        Event::ModeChanged {
            mode,
            remaining_secs: self.state.remaining_secs,
            at: self.clock.now(),
        }
    }

    fn count_today(&mut self, today: NaiveDate) {
        if self.state.last_session_date != Some(today) {
            self.state.today_sessions = 0;
            self.state.last_session_date = Some(today);
        }
        self.state.today_sessions += 1;
    }

    fn alert(&mut self, finished: Mode) {
        if !self.config.notifications_enabled {
            return;
        }
        let Collaborators {
            audio,
            notifier,
            alerts,
            ..
        } = &mut self.collaborators;

        match audio.as_mut() {
            Some(audio) => audio.play(&alerts.sound_id),
            None => skip("audio"),
        }
        match notifier.as_mut() {
            Some(notifier) if notifier.permission() == Permission::Granted => {
                notifier.show(&alerts.title, Alerts::body_for(finished));
            }
            Some(_) => debug!("notification permission not granted, skipping"),
            None => skip("notifier"),
        }
    }

    /// Whole seconds left until `deadline`, rounded to nearest.
    fn remaining_until(&self, deadline: u64) -> u64 {
        let left_ms = deadline.saturating_sub(self.clock.now_ms());
        (left_ms.saturating_add(500) / 1000).min(self.total_secs())
    }

    fn progress_for(&self, remaining_secs: u64) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        ((total as f64 - remaining_secs as f64) / total as f64).clamp(0.0, 1.0)
    }
}

fn skip(collaborator: &'static str) {
    debug!("{}, skipping", CoreError::MissingCollaborator(collaborator));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::collaborators::{
        AudioSink, FocusSink, Notifier, RewardSink, StatsSink, TimerObserver,
    };
    use crate::timer::{ManualClock, RewardTier};
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;

    #[derive(Debug, Default)]
    struct Log {
        ticks: Vec<(u64, f64)>,
        completions: Vec<(Mode, u64)>,
        rejected: Vec<String>,
        modes: Vec<Mode>,
        stats: Vec<NaiveDate>,
        rewards: Vec<RewardTier>,
        focus: Vec<&'static str>,
        sounds: Vec<String>,
        shown: Vec<(String, String)>,
    }

    #[derive(Clone, Default)]
    struct Recorder {
        log: Rc<RefCell<Log>>,
        permission: Permission,
    }

    impl TimerObserver for Recorder {
        fn on_tick(&mut self, remaining_secs: u64, progress: f64) {
            self.log.borrow_mut().ticks.push((remaining_secs, progress));
        }
        fn on_complete(&mut self, mode: Mode, sessions_completed: u64) {
            self.log.borrow_mut().completions.push((mode, sessions_completed));
        }
        fn on_mode_change_rejected(&mut self, reason: &str) {
            self.log.borrow_mut().rejected.push(reason.to_string());
        }
        fn on_mode_changed(&mut self, mode: Mode) {
            self.log.borrow_mut().modes.push(mode);
        }
    }

    impl StatsSink for Recorder {
        fn record_completion(&mut self, date: NaiveDate) {
            self.log.borrow_mut().stats.push(date);
        }
    }

    impl RewardSink for Recorder {
        fn show_reward(&mut self, reward: &Reward) {
            self.log.borrow_mut().rewards.push(reward.tier);
        }
    }

    impl FocusSink for Recorder {
        fn enter(&mut self) {
            self.log.borrow_mut().focus.push("enter");
        }
        fn exit(&mut self) {
            self.log.borrow_mut().focus.push("exit");
        }
    }

    impl AudioSink for Recorder {
        fn play(&mut self, sound_id: &str) {
            self.log.borrow_mut().sounds.push(sound_id.to_string());
        }
    }

    impl Notifier for Recorder {
        fn request_permission(&mut self) -> Permission {
            self.permission = Permission::Granted;
            self.permission
        }
        fn permission(&self) -> Permission {
            self.permission
        }
        fn show(&mut self, title: &str, body: &str) {
            self.log
                .borrow_mut()
                .shown
                .push((title.to_string(), body.to_string()));
        }
    }

    fn clock() -> Rc<ManualClock> {
        Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        ))
    }

    fn wired(config: TimerConfig) -> (TimerCore, Rc<ManualClock>, Rc<RefCell<Log>>) {
        let clock = clock();
        let recorder = Recorder {
            permission: Permission::Granted,
            ..Recorder::default()
        };
        let log = Rc::clone(&recorder.log);
        let collaborators = Collaborators::new()
            .with_observer(recorder.clone())
            .with_stats(recorder.clone())
            .with_rewards(recorder.clone())
            .with_focus(recorder.clone())
            .with_audio(recorder.clone())
            .with_notifier(recorder);
        let core = TimerCore::new(config, clock.clone()).with_collaborators(collaborators);
        (core, clock, log)
    }

    fn finish(core: &mut TimerCore, clock: &ManualClock) -> Option<Event> {
        if !core.is_running() {
            core.start();
        }
        clock.advance_ms(core.remaining_secs() as i64 * 1000);
        core.tick()
    }

    #[test]
    fn new_timer_is_idle_in_work_mode() {
        let core = TimerCore::new(TimerConfig::default(), clock());
        assert_eq!(core.mode(), Mode::Work);
        assert!(!core.is_running());
        assert_eq!(core.remaining_secs(), 25 * 60);
        assert_eq!(core.progress(), 0.0);
        assert!(core.deadline_ms().is_none());
    }

    #[test]
    fn start_then_pause_keeps_remaining() {
        let mut core = TimerCore::new(TimerConfig::default(), clock());
        assert!(core.start().is_some());
        assert!(core.is_running());
        assert!(core.pause().is_some());
        assert!(!core.is_running());
        assert_eq!(core.remaining_secs(), 25 * 60);
        assert!(core.deadline_ms().is_none());
    }

    #[test]
    fn start_twice_is_a_noop() {
        let clock = clock();
        let mut core = TimerCore::new(TimerConfig::default(), clock.clone());
        core.start();
        let deadline = core.deadline_ms();
        clock.advance_ms(3_000);
        assert!(core.start().is_none());
        assert_eq!(core.deadline_ms(), deadline);
    }

    #[test]
    fn pause_when_idle_is_a_noop() {
        let mut core = TimerCore::new(TimerConfig::default(), clock());
        assert!(core.pause().is_none());
        assert!(core.tick().is_none());
    }

    #[test]
    fn countdown_follows_the_deadline_not_the_tick_count() {
        let (mut core, clock, log) = wired(TimerConfig::default());
        core.start();

        clock.advance_ms(100);
        core.tick();
        assert_eq!(core.remaining_secs(), 1500);

        // A stalled host: one late tick after 7.3s.
        clock.advance_ms(7_300);
        core.tick();
        assert_eq!(core.remaining_secs(), 1500 - 7);

        let (remaining, progress) = *log.borrow().ticks.last().unwrap();
        assert_eq!(remaining, 1493);
        assert!((progress - 7.0 / 1500.0).abs() < 1e-9);
    }

    #[test]
    fn pause_and_resume_carry_remaining_over() {
        let clock = clock();
        let mut core = TimerCore::new(TimerConfig::default(), clock.clone());
        core.start();
        clock.advance_ms(60_000);
        core.pause();
        assert_eq!(core.remaining_secs(), 24 * 60);

        // Time spent paused does not count.
        clock.advance_ms(600_000);
        core.start();
        clock.advance_ms(30_000);
        core.tick();
        assert_eq!(core.remaining_secs(), 24 * 60 - 30);
    }

    #[test]
    fn work_completion_records_rewards_and_moves_to_short_break() {
        let (mut core, clock, log) = wired(TimerConfig {
            focus_mode_enabled: true,
            ..TimerConfig::default()
        });

        let event = finish(&mut core, &clock).expect("completion event");
        match event {
            Event::TimerCompleted {
                mode,
                next_mode,
                sessions_completed,
                reward,
                auto_started,
                ..
            } => {
                assert_eq!(mode, Mode::Work);
                assert_eq!(next_mode, Mode::ShortBreak);
                assert_eq!(sessions_completed, 1);
                assert_eq!(reward, Some(RewardTier::Base));
                assert!(!auto_started);
            }
            other => panic!("unexpected event {other:?}"),
        }

        assert_eq!(core.mode(), Mode::ShortBreak);
        assert_eq!(core.remaining_secs(), 5 * 60);
        assert!(!core.is_running());
        assert_eq!(core.today_sessions(), 1);

        let log = log.borrow();
        assert_eq!(log.stats, vec![NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()]);
        assert_eq!(log.rewards, vec![RewardTier::Base]);
        assert_eq!(log.focus, vec!["enter", "exit"]);
        assert_eq!(log.sounds, vec!["timer-complete".to_string()]);
        assert_eq!(log.shown[0].0, "Cozy Pomodoro Timer");
        assert_eq!(log.shown[0].1, Alerts::body_for(Mode::Work));
        assert_eq!(log.completions, vec![(Mode::Work, 1)]);
    }

    #[test]
    fn every_fourth_session_earns_a_long_break() {
        let (mut core, clock, log) = wired(TimerConfig::default());
        let mut breaks = Vec::new();
        for _ in 0..4 {
            finish(&mut core, &clock);
            breaks.push(core.mode());
            finish(&mut core, &clock);
            assert_eq!(core.mode(), Mode::Work);
        }
        assert_eq!(
            breaks,
            vec![Mode::ShortBreak, Mode::ShortBreak, Mode::ShortBreak, Mode::LongBreak]
        );
        assert_eq!(core.sessions_completed(), 4);
        // Breaks never reach the stats sink.
        assert_eq!(log.borrow().stats.len(), 4);
        assert_eq!(log.borrow().rewards[3], RewardTier::Block);
    }

    #[test]
    fn break_completion_returns_to_work() {
        let (mut core, clock, log) = wired(TimerConfig::default());
        core.change_mode(Mode::LongBreak).unwrap();
        let event = finish(&mut core, &clock).unwrap();
        assert!(matches!(
            event,
            Event::TimerCompleted {
                mode: Mode::LongBreak,
                next_mode: Mode::Work,
                reward: None,
                sessions_completed: 0,
                ..
            }
        ));
        assert_eq!(core.remaining_secs(), 25 * 60);
        assert!(log.borrow().stats.is_empty());
        assert_eq!(log.borrow().shown[0].1, Alerts::body_for(Mode::LongBreak));
    }

    #[test]
    fn auto_start_chains_into_the_next_session() {
        let (mut core, clock, _log) = wired(TimerConfig {
            auto_start: true,
            ..TimerConfig::default()
        });
        let event = finish(&mut core, &clock).unwrap();
        assert!(matches!(event, Event::TimerCompleted { auto_started: true, .. }));
        assert!(core.is_running());
        assert_eq!(core.mode(), Mode::ShortBreak);

        clock.advance_ms(2_000);
        core.tick();
        assert_eq!(core.remaining_secs(), 5 * 60 - 2);
    }

    #[test]
    fn change_mode_while_running_is_rejected_unchanged() {
        let (mut core, clock, log) = wired(TimerConfig::default());
        core.start();
        clock.advance_ms(4_000);
        core.tick();
        let before = core.checkpoint();

        let result = core.change_mode(Mode::ShortBreak);
        assert!(matches!(result, Err(CoreError::InvalidModeTransition { .. })));
        assert_eq!(core.checkpoint(), before);
        assert_eq!(log.borrow().rejected, vec![MODE_CHANGE_WHILE_RUNNING.to_string()]);
    }

    #[test]
    fn change_mode_loads_mode_duration() {
        let config = TimerConfig {
            work_minutes: 50,
            short_break_minutes: 10,
            long_break_minutes: 30,
            ..TimerConfig::default()
        };
        let mut core = TimerCore::new(config, clock());
        core.change_mode(Mode::ShortBreak).unwrap();
        assert_eq!(core.remaining_secs(), 600);
        core.change_mode(Mode::LongBreak).unwrap();
        assert_eq!(core.remaining_secs(), 1800);
        core.change_mode(Mode::Work).unwrap();
        assert_eq!(core.remaining_secs(), 3000);
        assert_eq!(core.progress(), 0.0);
    }

    #[test]
    fn reset_refills_without_changing_mode() {
        let clock = clock();
        let mut core = TimerCore::new(TimerConfig::default(), clock.clone());
        core.change_mode(Mode::ShortBreak).unwrap();
        core.start();
        clock.advance_ms(90_000);
        core.tick();
        assert!(core.progress() > 0.0);

        core.reset();
        assert_eq!(core.mode(), Mode::ShortBreak);
        assert!(!core.is_running());
        assert_eq!(core.remaining_secs(), 300);
        assert_eq!(core.progress(), 0.0);
    }

    #[test]
    fn notifications_disabled_stay_quiet() {
        let (mut core, clock, log) = wired(TimerConfig {
            notifications_enabled: false,
            ..TimerConfig::default()
        });
        finish(&mut core, &clock);
        assert!(log.borrow().sounds.is_empty());
        assert!(log.borrow().shown.is_empty());
        // Stats are independent of notifications.
        assert_eq!(log.borrow().stats.len(), 1);
    }

    #[test]
    fn notifier_without_permission_only_plays_sound() {
        let clock = clock();
        let recorder = Recorder::default();
        let log = Rc::clone(&recorder.log);
        let mut core = TimerCore::new(TimerConfig::default(), clock.clone()).with_collaborators(
            Collaborators::new()
                .with_audio(recorder.clone())
                .with_notifier(recorder),
        );
        finish(&mut core, &clock);
        assert_eq!(log.borrow().sounds.len(), 1);
        assert!(log.borrow().shown.is_empty());

        assert_eq!(core.request_notification_permission(), Some(Permission::Granted));
    }

    #[test]
    fn missing_collaborators_do_not_stop_completion() {
        let clock = clock();
        let mut core = TimerCore::new(
            TimerConfig {
                focus_mode_enabled: true,
                ..TimerConfig::default()
            },
            clock.clone(),
        );
        assert!(finish(&mut core, &clock).is_some());
        assert_eq!(core.sessions_completed(), 1);
        assert_eq!(core.mode(), Mode::ShortBreak);
        assert_eq!(core.request_notification_permission(), None);
    }

    #[test]
    fn focus_only_entered_for_work_sessions() {
        let (mut core, _clock, log) = wired(TimerConfig {
            focus_mode_enabled: true,
            ..TimerConfig::default()
        });
        core.change_mode(Mode::ShortBreak).unwrap();
        core.start();
        assert!(log.borrow().focus.is_empty());
    }

    #[test]
    fn checkpoint_restore_keeps_counting() {
        let clock = clock();
        let mut core = TimerCore::new(TimerConfig::default(), clock.clone());
        core.start();
        let checkpoint = core.checkpoint();
        let json = serde_json::to_string(&checkpoint).unwrap();

        clock.advance_ms(120_000);
        let restored: TimerCheckpoint = serde_json::from_str(&json).unwrap();
        let mut core = TimerCore::restore(TimerConfig::default(), restored, clock.clone());
        assert!(core.is_running());
        core.tick();
        assert_eq!(core.remaining_secs(), 23 * 60);
    }

    #[test]
    fn restore_past_deadline_completes_once() {
        let clock = clock();
        let mut core = TimerCore::new(TimerConfig::default(), clock.clone());
        core.start();
        let checkpoint = core.checkpoint();

        clock.advance_ms(3_600_000);
        let mut core = TimerCore::restore(TimerConfig::default(), checkpoint, clock.clone());
        assert!(core.tick().is_some());
        assert!(core.tick().is_none());
        assert_eq!(core.sessions_completed(), 1);
    }

    #[test]
    fn restore_clamps_to_current_durations() {
        let core = TimerCore::new(TimerConfig::default(), clock());
        let checkpoint = core.checkpoint();
        let shorter = TimerConfig {
            work_minutes: 10,
            ..TimerConfig::default()
        };
        let core = TimerCore::restore(shorter, checkpoint, clock());
        assert_eq!(core.remaining_secs(), 600);
        assert!(!core.is_running());
    }

    #[test]
    fn restore_caps_far_future_deadline() {
        let clock = clock();
        let mut core = TimerCore::new(TimerConfig::default(), clock.clone());
        core.start();
        let mut checkpoint = core.checkpoint();
        checkpoint.deadline_ms = Some(u64::MAX);

        let mut core = TimerCore::restore(TimerConfig::default(), checkpoint, clock.clone());
        assert_eq!(core.deadline_ms(), Some(clock.now_ms() + 25 * 60 * 1000));
        assert!(core.tick().is_none());
        assert_eq!(core.remaining_secs(), 25 * 60);

        clock.advance_ms(25 * 60 * 1000);
        assert!(core.tick().is_some());
    }

    #[test]
    fn today_sessions_roll_over_at_midnight_utc() {
        let (mut core, clock, _log) = wired(TimerConfig::default());
        finish(&mut core, &clock);
        finish(&mut core, &clock);
        finish(&mut core, &clock);
        assert_eq!(core.today_sessions(), 2);

        clock.advance(chrono::Duration::days(1));
        assert_eq!(core.today_sessions(), 0);
        finish(&mut core, &clock);
        assert_eq!(core.today_sessions(), 0);
        finish(&mut core, &clock);
        assert_eq!(core.today_sessions(), 1);
        assert_eq!(core.sessions_completed(), 3);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let core = TimerCore::new(TimerConfig::default(), clock());
        match core.snapshot() {
            Event::StateSnapshot {
                mode,
                running,
                remaining_secs,
                total_secs,
                ..
            } => {
                assert_eq!(mode, Mode::Work);
                assert!(!running);
                assert_eq!(remaining_secs, 25 * 60);
                assert_eq!(total_secs, 25 * 60);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }
}
