use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Which countdown the timer is running.
///
/// Serialized with the names the settings and stats snapshots have always
/// used (`pomodoro`, `short-break`, `long-break`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "pomodoro")]
    Work,
    #[serde(rename = "short-break")]
    ShortBreak,
    #[serde(rename = "long-break")]
    LongBreak,
}

/// Work sessions per cycle; the break after every fourth one is long.
pub const SESSIONS_PER_CYCLE: u64 = 4;

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Work, Mode::ShortBreak, Mode::LongBreak];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Work => "pomodoro",
            Mode::ShortBreak => "short-break",
            Mode::LongBreak => "long-break",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Work => "Pomodoro",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    /// Theme color token the UI paints the timer ring with.
    pub fn color_token(&self) -> &'static str {
        match self {
            Mode::Work => "primary",
            Mode::ShortBreak => "secondary",
            Mode::LongBreak => "accent",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Mode::Work)
    }

    /// Break that follows the work session which brought the count to
    /// `sessions_completed`.
    pub fn break_after(sessions_completed: u64) -> Mode {
        if sessions_completed % SESSIONS_PER_CYCLE == 0 {
            Mode::LongBreak
        } else {
            Mode::ShortBreak
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pomodoro" | "work" => Ok(Mode::Work),
            "short-break" | "short" => Ok(Mode::ShortBreak),
            "long-break" | "long" => Ok(Mode::LongBreak),
            other => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("unknown mode '{other}' (expected pomodoro, short-break or long-break)"),
            }),
        }
    }
}
