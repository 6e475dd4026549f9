use std::rc::Rc;

use clap::Subcommand;
use cozy_pomodoro_core::{Ambience, GradientIntensity, GradientSpeed, Sound, ThemePreference};
use serde_json::json;

use super::{open_db, print_json, CommandResult};
use crate::terminal::Bell;

#[derive(Subcommand)]
pub enum AmbienceAction {
    /// Print background, sound, volume, theme and gradient
    Show,
    /// Change the background
    Background {
        /// Background name
        name: String,
    },
    /// Change the ambient sound loop (none, rain, forest, waves, lofi)
    Sound {
        sound: Sound,
    },
    /// Set the volume, 0 to 100
    Volume {
        level: u32,
    },
    /// Switch between dark and light
    Theme {
        theme: ThemePreference,
    },
    /// Adjust the animated gradient backdrop
    Gradient {
        /// Gradient color theme
        #[arg(long)]
        theme: Option<String>,
        /// slow, normal or fast
        #[arg(long)]
        speed: Option<GradientSpeed>,
        /// low, medium or high
        #[arg(long)]
        intensity: Option<GradientIntensity>,
        /// Turn the backdrop on or off
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: Option<bool>,
        /// Flip the backdrop on or off
        #[arg(long, conflicts_with = "enabled")]
        toggle: bool,
    },
}

pub fn run(action: AmbienceAction) -> CommandResult {
    let db = open_db()?;
    let mut ambience = Ambience::load(Rc::clone(&db));
    // The terminal cannot loop audio; sound changes are logged.
    let mut audio = Bell { enabled: false };

    match action {
        AmbienceAction::Show => {}
        AmbienceAction::Background { name } => ambience.change_background(&name)?,
        AmbienceAction::Sound { sound } => ambience.change_sound(sound, &mut audio),
        AmbienceAction::Volume { level } => {
            ambience.set_volume(level, &mut audio);
        }
        AmbienceAction::Theme { theme } => ambience.set_theme(theme)?,
        AmbienceAction::Gradient {
            theme,
            speed,
            intensity,
            enabled,
            toggle,
        } => {
            if let Some(theme) = theme {
                ambience.set_gradient_theme(&theme)?;
            }
            if let Some(speed) = speed {
                ambience.set_gradient_speed(speed);
            }
            if let Some(intensity) = intensity {
                ambience.set_gradient_intensity(intensity);
            }
            if let Some(enabled) = enabled {
                ambience.set_gradient_enabled(enabled);
            }
            if toggle {
                ambience.toggle_gradient();
            }
        }
    }

    let settings = ambience.settings();
    print_json(&json!({
        "background": settings.background,
        "sound": settings.sound,
        "volume": settings.volume,
        "theme": ambience.theme(),
        "gradient": ambience.gradient(),
    }))
}
