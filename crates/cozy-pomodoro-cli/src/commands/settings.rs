use std::rc::Rc;

use clap::Subcommand;
use cozy_pomodoro_core::settings::SETTING_KEYS;
use cozy_pomodoro_core::{AppConfig, ConfigError, SettingsSync};

use super::timer::{save_core, settled_core};
use super::{open_db, print_json, CommandResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a setting
    Get {
        /// One of pomodoroTime, shortBreakTime, longBreakTime, autoStart,
        /// notification, focusMode
        key: String,
    },
    /// Change a setting; duration changes reset the timer
    Set {
        /// Setting key
        key: String,
        /// New value (minutes or true/false)
        value: String,
    },
    /// List all settings
    List,
    /// Restore default settings
    Reset,
}

pub fn run(action: SettingsAction) -> CommandResult {
    let db = open_db()?;
    let mut settings = SettingsSync::load(Rc::clone(&db));
    let config = AppConfig::load_or_default();

    match action {
        SettingsAction::Get { key } => match settings.get_key(&key) {
            Some(value) => println!("{value}"),
            None => {
                let known = SETTING_KEYS.join(", ");
                return Err(format!("{} (known: {known})", ConfigError::UnknownKey(key)).into());
            }
        },
        SettingsAction::List => print_json(settings.config())?,
        SettingsAction::Set { key, value } => {
            let mut core = settled_core(&db, &config)?;
            let event = settings.set_key(&mut core, &key, &value)?;
            save_core(&db, &core)?;
            print_json(&event)?;
        }
        SettingsAction::Reset => {
            let mut core = settled_core(&db, &config)?;
            let event = settings.reset_to_defaults(&mut core);
            save_core(&db, &core)?;
            print_json(&event)?;
        }
    }
    Ok(())
}

