use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use cozy_pomodoro_core::storage::kv::{read_json, write_json};
use cozy_pomodoro_core::timer::{Collaborators, SystemClock};
use cozy_pomodoro_core::{
    AppConfig, CoreError, Database, Event, Mode, SettingsSync, StatsRecorder, TimerCheckpoint,
    TimerConfig, TimerCore,
};
use tracing::{info, warn};

use super::{open_db, print_json, CommandResult};
use crate::terminal::{Bell, FocusBanner, ProgressLine, RewardBanner, TerminalNotifier};

pub const CHECKPOINT_KEY: &str = "timer_core";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start (or resume) the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Stop and refill the countdown for the current mode
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Switch mode (pomodoro, short-break, long-break); timer must be stopped
    Mode {
        /// Target mode
        mode: Mode,
    },
    /// Run the countdown in the foreground until it completes
    Run {
        /// Number of completed sessions (work or break) before exiting
        #[arg(long, default_value = "1")]
        cycles: u32,
    },
}

/// The saved countdown, or a fresh one when there is none.
fn restore_core(db: &Rc<Database>, config: TimerConfig) -> TimerCore {
    let clock = Rc::new(SystemClock);
    match read_json::<TimerCheckpoint>(db, CHECKPOINT_KEY) {
        Ok(Some(checkpoint)) => TimerCore::restore(config, checkpoint, clock),
        Ok(None) => TimerCore::new(config, clock),
        Err(e) => {
            warn!("discarding unreadable timer checkpoint: {e}");
            TimerCore::new(config, clock)
        }
    }
}

pub fn save_core(db: &Database, core: &TimerCore) -> CommandResult {
    write_json(db, CHECKPOINT_KEY, &core.checkpoint())?;
    Ok(())
}

fn load_core(db: &Rc<Database>, config: &AppConfig, with_progress: bool) -> TimerCore {
    let settings = SettingsSync::load(Rc::clone(db));
    let core = restore_core(db, *settings.config());

    let stats = Rc::new(RefCell::new(StatsRecorder::load(Rc::clone(db))));
    let mut collaborators = Collaborators::new()
        .with_stats(stats)
        .with_rewards(RewardBanner)
        .with_focus(FocusBanner)
        .with_notifier(TerminalNotifier)
        .with_audio(Bell {
            enabled: config.notifications.bell,
        })
        .with_alerts(config.alerts());
    if with_progress {
        collaborators = collaborators.with_observer(ProgressLine::new(core.mode()));
    }
    core.with_collaborators(collaborators)
}

/// Apply a deadline that passed while no process was ticking.
fn catch_up(core: &mut TimerCore) {
    if let Some(Event::TimerCompleted { mode, next_mode, .. }) = core.tick() {
        info!(%mode, %next_mode, "countdown finished while idle");
    }
}

/// The saved countdown with stats wired in and any idle completion applied.
///
/// Commands that touch the timer or read stats go through here so a session
/// that ended between invocations is counted before anything else happens.
pub fn settled_core(
    db: &Rc<Database>,
    config: &AppConfig,
) -> Result<TimerCore, Box<dyn std::error::Error>> {
    let mut core = load_core(db, config, false);
    catch_up(&mut core);
    save_core(db, &core)?;
    Ok(core)
}

pub fn run(action: TimerAction) -> CommandResult {
    let db = open_db()?;
    let config = AppConfig::load_or_default();
    let with_progress = matches!(action, TimerAction::Run { .. });
    let mut core = load_core(&db, &config, with_progress);
    catch_up(&mut core);

    let result = match action {
        TimerAction::Start => print_json(&core.start().unwrap_or_else(|| core.snapshot())),
        TimerAction::Pause => print_json(&core.pause().unwrap_or_else(|| core.snapshot())),
        TimerAction::Reset => print_json(&core.reset().unwrap_or_else(|| core.snapshot())),
        TimerAction::Status => print_json(&core.snapshot()),
        TimerAction::Mode { mode } => match core.change_mode(mode) {
            Ok(event) => print_json(&event),
            Err(CoreError::InvalidModeTransition { reason }) => {
                print_json(&Event::ModeChangeRejected {
                    requested: mode,
                    reason: reason.clone(),
                    at: Utc::now(),
                })?;
                Err(CoreError::InvalidModeTransition { reason }.into())
            }
            Err(e) => Err(e.into()),
        },
        TimerAction::Run { cycles } => run_loop(&db, &mut core, &config, cycles),
    };

    save_core(&db, &core)?;
    result
}

/// Foreground countdown. Prints one JSON line per completion.
fn run_loop(db: &Database, core: &mut TimerCore, config: &AppConfig, cycles: u32) -> CommandResult {
    let interval = Duration::from_millis(config.tick_interval_ms());
    let mut completed = 0;

    while completed < cycles {
        if !core.is_running() {
            core.start();
            save_core(db, core)?;
        }

        std::thread::sleep(interval);

        if let Some(event) = core.tick() {
            completed += 1;
            println!("{}", serde_json::to_string(&event)?);
            save_core(db, core)?;
        }
    }
    Ok(())
}
