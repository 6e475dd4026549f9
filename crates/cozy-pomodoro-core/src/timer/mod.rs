mod clock;
pub mod collaborators;
mod engine;
mod mode;
mod reward;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collaborators::{
    Alerts, AudioSink, Collaborators, FocusSink, Notifier, Permission, RewardSink, StatsSink,
    TimerObserver,
};
pub use engine::{TimerCheckpoint, TimerCore, TimerState, MODE_CHANGE_WHILE_RUNNING};
pub use mode::{Mode, SESSIONS_PER_CYCLE};
pub use reward::{Reward, RewardTier};
