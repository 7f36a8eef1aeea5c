use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::level::Level;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum GoalCategory {
    Study,
    Fitness,
    Work,
    Growth,
    Projects,
}

impl GoalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Study => "Study",
            Self::Fitness => "Fitness",
            Self::Work => "Work",
            Self::Growth => "Growth",
            Self::Projects => "Projects",
        }
    }

    /// Accepts the plain label as well as the decorated client labels
    /// such as `"Study 📚"`.
    pub fn from_str(s: &str) -> Option<Self> {
        match first_word(s)?.as_str() {
            "study" => Some(Self::Study),
            "fitness" => Some(Self::Fitness),
            "work" => Some(Self::Work),
            "growth" | "personal" => Some(Self::Growth),
            "projects" | "project" => Some(Self::Projects),
            _ => None,
        }
    }
}

impl From<GoalCategory> for String {
    fn from(value: GoalCategory) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for GoalCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown category: {}", value))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    /// Accepts `"Hard"`, `"hard"` and the decorated `"Hard 🔴"`.
    pub fn from_str(s: &str) -> Option<Self> {
        match first_word(s)?.as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown difficulty: {}", value))
    }
}

fn first_word(s: &str) -> Option<String> {
    s.split_whitespace().next().map(str::to_lowercase)
}

/// A user-defined objective decomposed into levels. Stored as one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub category: GoalCategory,
    pub difficulty: Difficulty,
    pub total_levels: u32,
    pub created_at: DateTime<Utc>,
    /// Highest unlocked level number.
    pub current_level: u32,
    /// Percentage 0-100.
    pub progress: u8,
    pub is_completed: bool,
    pub levels: Vec<Level>,
}

impl Goal {
    pub fn level(&self, level_number: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.level_number == level_number)
    }

    pub fn level_mut(&mut self, level_number: u32) -> Option<&mut Level> {
        self.levels.iter_mut().find(|l| l.level_number == level_number)
    }
}

/// Body of a goal upsert. Without `id` a new goal is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGoalInput {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub title: String,
    pub category: GoalCategory,
    pub difficulty: Difficulty,
    pub total_levels: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
    pub current_level: Option<u32>,
    pub progress: Option<u8>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub levels: Vec<Level>,
}

impl SaveGoalInput {
    pub fn into_goal(self) -> Goal {
        let total_levels = self.total_levels.unwrap_or(self.levels.len() as u32);
        Goal {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            user_id: self.user_id,
            title: self.title,
            category: self.category,
            difficulty: self.difficulty,
            total_levels,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            current_level: self.current_level.unwrap_or(1),
            progress: self.progress.unwrap_or(0).min(100),
            is_completed: self.is_completed,
            levels: self.levels,
        }
    }
}
