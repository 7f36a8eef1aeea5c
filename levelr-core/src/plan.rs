//! Turning drafted levels into a playable plan.

use serde::{Deserialize, Serialize};

use crate::models::{Difficulty, Level, LevelStatus, Resource};
use crate::rewards::level_reward;

pub const DEFAULT_ESTIMATED_TIME: &str = "1 hour";
pub const PLACEHOLDER_DESCRIPTION: &str = "Complete this milestone.";

/// A level as described by the generator, before numbering and rewards.
///
/// Every field is optional on the wire; generators routinely omit some.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub tips: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Number the drafts, attach rewards and lock everything past level 1.
/// At most `max_levels` drafts are used.
pub fn build_levels(drafts: Vec<LevelDraft>, difficulty: Difficulty, max_levels: u32) -> Vec<Level> {
    drafts
        .into_iter()
        .take(max_levels as usize)
        .enumerate()
        .map(|(index, draft)| {
            let index = index as u32;
            let level_number = index + 1;
            let reward = level_reward(difficulty, index);
            let title = match draft.title.trim() {
                "" => format!("Level {}", level_number),
                t => t.to_string(),
            };
            let estimated_time = draft
                .estimated_time
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ESTIMATED_TIME.to_string());

            Level {
                level_number,
                title,
                description: draft.description,
                xp_reward: reward.xp,
                coin_reward: reward.coins,
                status: if index == 0 {
                    LevelStatus::Unlocked
                } else {
                    LevelStatus::Locked
                },
                completed_tasks: vec![false; draft.tasks.len()],
                tasks: draft.tasks,
                estimated_time: Some(estimated_time),
                resources: draft.resources,
                tips: draft.tips.filter(|t| !t.trim().is_empty()),
            }
        })
        .collect()
}

/// Generic plan used when generation is unavailable.
pub fn placeholder_levels(count: u32, difficulty: Difficulty) -> Vec<Level> {
    let drafts = (1..=count)
        .map(|n| LevelDraft {
            title: format!("Level {}", n),
            description: PLACEHOLDER_DESCRIPTION.to_string(),
            ..Default::default()
        })
        .collect();
    build_levels(drafts, difficulty, count)
}
