use serde::{Deserialize, Serialize};

/// Position of a level in the unlock chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LevelStatus {
    Locked,
    Unlocked,
    Completed,
}

impl LevelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "LOCKED",
            Self::Unlocked => "UNLOCKED",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "LOCKED" => Some(Self::Locked),
            "UNLOCKED" => Some(Self::Unlocked),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

/// One milestone of a goal, embedded in the goal document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub level_number: u32,
    pub title: String,
    pub description: String,
    pub xp_reward: u32,
    pub coin_reward: u32,
    pub status: LevelStatus,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub tips: Option<String>,
    /// Per-task checklist, parallel to `tasks`.
    #[serde(default)]
    pub completed_tasks: Vec<bool>,
}
