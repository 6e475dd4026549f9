//! Terminal-side collaborators for the timer core.
//!
//! Everything here writes to stderr; stdout is reserved for JSON output.

use std::io::Write;

use cozy_pomodoro_core::timer::{
    AudioSink, FocusSink, Notifier, Permission, RewardSink, TimerObserver,
};
use cozy_pomodoro_core::{Mode, Reward};
use tracing::debug;

/// Notifications are printed, so permission is always granted.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn show(&mut self, title: &str, body: &str) {
        eprintln!("\n[{title}] {body}");
    }
}

/// Rings the terminal bell for the completion sound; other sounds are
/// only logged since a terminal has no way to loop audio.
#[derive(Debug)]
pub struct Bell {
    pub enabled: bool,
}

impl AudioSink for Bell {
    fn play(&mut self, sound_id: &str) {
        debug!(sound_id, "play");
        if self.enabled {
            eprint!("\x07");
            let _ = std::io::stderr().flush();
        }
    }

    fn stop(&mut self, sound_id: &str) {
        debug!(sound_id, "stop");
    }

    fn set_volume(&mut self, volume: f32) {
        debug!(volume, "volume");
    }
}

#[derive(Debug, Default)]
pub struct RewardBanner;

impl RewardSink for RewardBanner {
    fn show_reward(&mut self, reward: &Reward) {
        eprintln!(
            "{} {} ({} sessions)",
            reward.achievement, reward.message, reward.sessions_completed
        );
    }
}

#[derive(Debug, Default)]
pub struct FocusBanner;

impl FocusSink for FocusBanner {
    fn enter(&mut self) {
        eprintln!("focus mode on");
    }

    fn exit(&mut self) {
        eprintln!("focus mode off");
    }
}

/// Redraws an `MM:SS` progress line on every tick.
#[derive(Debug, Default)]
pub struct ProgressLine {
    mode: Option<Mode>,
    last_drawn: Option<u64>,
}

impl ProgressLine {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode: Some(mode),
            last_drawn: None,
        }
    }
}

pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

impl TimerObserver for ProgressLine {
    fn on_tick(&mut self, remaining_secs: u64, progress: f64) {
        if self.last_drawn == Some(remaining_secs) {
            return;
        }
        self.last_drawn = Some(remaining_secs);
        let label = self.mode.map(|m| m.label()).unwrap_or("");
        eprint!(
            "\r{label:<12} {} [{}]",
            format_clock(remaining_secs),
            bar(progress, 20)
        );
        let _ = std::io::stderr().flush();
    }

    fn on_complete(&mut self, mode: Mode, sessions_completed: u64) {
        eprintln!("\r{:<12} 00:00 done ({sessions_completed} sessions)", mode.label());
        self.last_drawn = None;
    }

    fn on_mode_change_rejected(&mut self, reason: &str) {
        eprintln!("{reason}");
    }

    fn on_mode_changed(&mut self, mode: Mode) {
        self.mode = Some(mode);
        self.last_drawn = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(25 * 60), "25:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(0), "00:00");
    }

    #[test]
    fn progress_bar_width() {
        assert_eq!(bar(0.0, 4), "----");
        assert_eq!(bar(0.5, 4), "##--");
        assert_eq!(bar(2.0, 4), "####");
    }
}
