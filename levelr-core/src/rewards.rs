//! Reward schedule.
//!
//! Every level pays a base amount chosen by difficulty, raised by a fixed
//! step per level index. Finishing the last level of a goal pays a flat
//! completion bonus on top.

use serde::{Deserialize, Serialize};

use crate::models::Difficulty;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reward {
    pub xp: u32,
    pub coins: u32,
}

impl Reward {
    pub const fn new(xp: u32, coins: u32) -> Self {
        Self { xp, coins }
    }
}

impl std::ops::Add for Reward {
    type Output = Reward;

    /// Saturates; level rewards come from client-editable documents.
    fn add(self, rhs: Reward) -> Reward {
        Reward::new(
            self.xp.saturating_add(rhs.xp),
            self.coins.saturating_add(rhs.coins),
        )
    }
}

pub const XP_STEP: u32 = 10;
pub const COIN_STEP: u32 = 5;

/// Paid once when the final level of a goal is completed.
pub const COMPLETION_BONUS: Reward = Reward::new(500, 200);

pub fn base_reward(difficulty: Difficulty) -> Reward {
    match difficulty {
        Difficulty::Easy => Reward::new(50, 10),
        Difficulty::Medium => Reward::new(100, 25),
        Difficulty::Hard => Reward::new(150, 50),
    }
}

/// Reward for the level at zero-based `index`.
pub fn level_reward(difficulty: Difficulty, index: u32) -> Reward {
    let base = base_reward(difficulty);
    Reward::new(base.xp + index * XP_STEP, base.coins + index * COIN_STEP)
}
