use serde::{Deserialize, Serialize};

/// Reward shown after a work session.
///
/// Every session earns `Base`. Every fourth earns `Block`, and every tenth
/// past the first ten earns `Flow`, which wins over `Block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardTier {
    Base,
    Block,
    Flow,
}

impl RewardTier {
    pub fn for_sessions(sessions_completed: u64) -> Self {
        if sessions_completed > 10 && sessions_completed % 10 == 0 {
            RewardTier::Flow
        } else if sessions_completed > 1 && sessions_completed % 4 == 0 {
            RewardTier::Block
        } else {
            RewardTier::Base
        }
    }

    /// 1-based tier number.
    pub fn level(&self) -> u8 {
        match self {
            RewardTier::Base => 1,
            RewardTier::Block => 2,
            RewardTier::Flow => 3,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RewardTier::Base => "You finished a pomodoro!",
            RewardTier::Block => "Great job! You finished a whole pomodoro block!",
            RewardTier::Flow => "Impressive! Ten more pomodoros done - you're in the flow!",
        }
    }

    pub fn achievement(&self) -> &'static str {
        match self {
            RewardTier::Base => "achievement-1",
            RewardTier::Block => "achievement-2",
            RewardTier::Flow => "achievement-3",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub tier: RewardTier,
    pub sessions_completed: u64,
    pub message: String,
    pub achievement: String,
}

impl Reward {
    pub fn for_sessions(sessions_completed: u64) -> Self {
        let tier = RewardTier::for_sessions(sessions_completed);
        Self {
            tier,
            sessions_completed,
            message: tier.message().to_string(),
            achievement: tier.achievement().to_string(),
        }
    }
}
