//! Background, ambient sound loop, volume, light/dark theme and the
//! animated gradient backdrop.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, ValidationError};
use crate::storage::kv::{read_json, write_json, KvStore};
use crate::timer::AudioSink;

pub const AMBIENCE_KEY: &str = "ambienceSettings";
pub const THEME_KEY: &str = "darkMode";
pub const DEFAULT_BACKGROUND: &str = "default";
pub const DEFAULT_VOLUME: u8 = 50;
pub const GRADIENT_KEY: &str = "gradientSettings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sound {
    #[default]
    None,
    Rain,
    Forest,
    Waves,
    Lofi,
}

impl Sound {
    pub const ALL: [Sound; 5] = [
        Sound::None,
        Sound::Rain,
        Sound::Forest,
        Sound::Waves,
        Sound::Lofi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sound::None => "none",
            Sound::Rain => "rain",
            Sound::Forest => "forest",
            Sound::Waves => "waves",
            Sound::Lofi => "lofi",
        }
    }

    /// Sound id handed to the audio sink; `None` has none.
    pub fn sound_id(&self) -> Option<&'static str> {
        match self {
            Sound::None => None,
            Sound::Rain => Some("sound-rain"),
            Sound::Forest => Some("sound-forest"),
            Sound::Waves => Some("sound-waves"),
            Sound::Lofi => Some("sound-lofi"),
        }
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sound {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Sound::ALL
            .into_iter()
            .find(|sound| sound.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "sound".into(),
                message: format!("unknown sound '{s}' (none, rain, forest, waves, lofi)"),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            other => Err(ValidationError::InvalidValue {
                field: "theme".into(),
                message: format!("expected 'dark' or 'light', got '{other}'"),
            }),
        }
    }
}

/// Animation speed of the gradient backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl GradientSpeed {
    pub const ALL: [GradientSpeed; 3] = [
        GradientSpeed::Slow,
        GradientSpeed::Normal,
        GradientSpeed::Fast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GradientSpeed::Slow => "slow",
            GradientSpeed::Normal => "normal",
            GradientSpeed::Fast => "fast",
        }
    }
}

impl fmt::Display for GradientSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradientSpeed {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        GradientSpeed::ALL
            .into_iter()
            .find(|speed| speed.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "speed".into(),
                message: format!("unknown speed '{s}' (slow, normal, fast)"),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientIntensity {
    Low,
    #[default]
    Medium,
    High,
}

impl GradientIntensity {
    pub const ALL: [GradientIntensity; 3] = [
        GradientIntensity::Low,
        GradientIntensity::Medium,
        GradientIntensity::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GradientIntensity::Low => "low",
            GradientIntensity::Medium => "medium",
            GradientIntensity::High => "high",
        }
    }
}

impl fmt::Display for GradientIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradientIntensity {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        GradientIntensity::ALL
            .into_iter()
            .find(|intensity| intensity.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "intensity".into(),
                message: format!("unknown intensity '{s}' (low, medium, high)"),
            })
    }
}

/// Gradient backdrop snapshot. Each field falls back to its default on its
/// own, so one stale value does not throw away the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradientSettings {
    #[serde(default = "default_background", deserialize_with = "lenient_theme")]
    pub theme: String,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub speed: GradientSpeed,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub intensity: GradientIntensity,
    #[serde(default = "enabled_by_default", deserialize_with = "lenient_enabled")]
    pub enabled: bool,
}

impl Default for GradientSettings {
    fn default() -> Self {
        Self {
            theme: default_background(),
            speed: GradientSpeed::default(),
            intensity: GradientIntensity::default(),
            enabled: true,
        }
    }
}

fn enabled_by_default() -> bool {
    true
}

fn lenient_theme<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(str::trim)
        .filter(|theme| !theme.is_empty())
        .map_or_else(default_background, str::to_string))
}

fn lenient_parse<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default())
}

fn lenient_enabled<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<bool, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(enabled) => enabled,
        serde_json::Value::String(s) => s.trim() != "false",
        _ => true,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbienceSettings {
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default)]
    pub sound: Sound,
    /// Slider position, 0 to 100. Older snapshots stored it as a string.
    #[serde(default = "default_volume", deserialize_with = "lenient_volume")]
    pub volume: u8,
}

impl Default for AmbienceSettings {
    fn default() -> Self {
        Self {
            background: default_background(),
            sound: Sound::None,
            volume: DEFAULT_VOLUME,
        }
    }
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

fn default_volume() -> u8 {
    DEFAULT_VOLUME
}

fn lenient_volume<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u8, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let volume = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(volume
        .map(|v| v.clamp(0.0, 100.0).round() as u8)
        .unwrap_or(DEFAULT_VOLUME))
}

/// Owns the ambience and gradient snapshots and the theme flag.
#[derive(Debug)]
pub struct Ambience<S: KvStore> {
    store: S,
    settings: AmbienceSettings,
    gradient: GradientSettings,
    theme: ThemePreference,
}

impl<S: KvStore> Ambience<S> {
    pub fn load(store: S) -> Self {
        let settings = match read_json::<AmbienceSettings>(&store, AMBIENCE_KEY) {
            Ok(Some(settings)) => settings,
            Ok(None) => AmbienceSettings::default(),
            Err(e) => {
                warn!("could not load ambience settings, using defaults: {e}");
                AmbienceSettings::default()
            }
        };
        let gradient = match read_json::<GradientSettings>(&store, GRADIENT_KEY) {
            Ok(Some(gradient)) => gradient,
            Ok(None) => GradientSettings::default(),
            Err(e) => {
                warn!("could not load gradient settings, using defaults: {e}");
                GradientSettings::default()
            }
        };
        let theme = match store.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_default(),
            Ok(None) => ThemePreference::default(),
            Err(e) => {
                warn!("could not load theme: {e}");
                ThemePreference::default()
            }
        };
        Self {
            store,
            settings,
            gradient,
            theme,
        }
    }

    pub fn settings(&self) -> &AmbienceSettings {
        &self.settings
    }

    pub fn gradient(&self) -> &GradientSettings {
        &self.gradient
    }

    pub fn theme(&self) -> ThemePreference {
        self.theme
    }

    /// Restart the saved sound loop on a fresh sink.
    pub fn resume(&self, audio: &mut dyn AudioSink) {
        if let Some(id) = self.settings.sound.sound_id() {
            audio.set_volume(self.gain());
            audio.play(id);
        }
    }

    pub fn change_background(&mut self, background: &str) -> Result<()> {
        let background = background.trim();
        if background.is_empty() {
            return Err(ValidationError::Empty("background".into()).into());
        }
        self.settings.background = background.to_string();
        debug!(background, "background changed");
        self.save();
        Ok(())
    }

    /// Stop whatever is looping, then start `sound` at the current volume.
    pub fn change_sound(&mut self, sound: Sound, audio: &mut dyn AudioSink) {
        if let Some(id) = self.settings.sound.sound_id() {
            audio.stop(id);
        }
        if let Some(id) = sound.sound_id() {
            audio.set_volume(self.gain());
            audio.play(id);
        }
        self.settings.sound = sound;
        debug!(%sound, "ambient sound changed");
        self.save();
    }

    /// Set the slider position; values above 100 are clamped.
    pub fn set_volume(&mut self, volume: u32, audio: &mut dyn AudioSink) -> u8 {
        let volume = volume.min(100) as u8;
        self.settings.volume = volume;
        audio.set_volume(self.gain());
        self.save();
        volume
    }

    pub fn set_theme(&mut self, theme: ThemePreference) -> Result<()> {
        self.theme = theme;
        debug!(%theme, "theme changed");
        self.store.set(THEME_KEY, theme.as_str())
    }

    // ── Gradient backdrop ────────────────────────────────────────────

    pub fn set_gradient_theme(&mut self, theme: &str) -> Result<()> {
        let theme = theme.trim();
        if theme.is_empty() {
            return Err(ValidationError::Empty("gradient theme".into()).into());
        }
        self.gradient.theme = theme.to_string();
        debug!(theme, "gradient theme changed");
        self.save_gradient();
        Ok(())
    }

    pub fn set_gradient_speed(&mut self, speed: GradientSpeed) {
        self.gradient.speed = speed;
        debug!(%speed, "gradient speed changed");
        self.save_gradient();
    }

    pub fn set_gradient_intensity(&mut self, intensity: GradientIntensity) {
        self.gradient.intensity = intensity;
        debug!(%intensity, "gradient intensity changed");
        self.save_gradient();
    }

    pub fn set_gradient_enabled(&mut self, enabled: bool) {
        self.gradient.enabled = enabled;
        debug!(enabled, "gradient toggled");
        self.save_gradient();
    }

    /// Flip the backdrop on or off; returns the new state.
    pub fn toggle_gradient(&mut self) -> bool {
        self.set_gradient_enabled(!self.gradient.enabled);
        self.gradient.enabled
    }

    fn gain(&self) -> f32 {
        f32::from(self.settings.volume) / 100.0
    }

    fn save(&self) {
        if let Err(e) = write_json(&self.store, AMBIENCE_KEY, &self.settings) {
            warn!("ambience settings kept in memory only: {e}");
        }
    }

    fn save_gradient(&self) {
        if let Err(e) = write_json(&self.store, GRADIENT_KEY, &self.gradient) {
            warn!("gradient settings kept in memory only: {e}");
        }
    }
}
