//! Level completion state machine.
//!
//! A goal's levels form a linear unlock chain: completed levels, then exactly
//! one unlocked level, then locked levels. Once the last level is completed
//! nothing is unlocked and the goal is marked complete.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Difficulty, Goal, GoalCategory, Level, LevelStatus};
use crate::rewards::{Reward, COMPLETION_BONUS};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressionError {
    #[error("Level {0} not found")]
    LevelNotFound(u32),
    #[error("Level {0} is locked")]
    LevelLocked(u32),
    #[error("Level {0} is already completed")]
    AlreadyCompleted(u32),
    #[error("Task {index} out of range for level {level} ({len} tasks)")]
    TaskOutOfRange { level: u32, index: usize, len: usize },
    #[error("Inconsistent level chain: {0}")]
    Inconsistent(String),
}

/// Outcome of completing one level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelCompletion {
    pub level_number: u32,
    /// Level reward plus the completion bonus when the goal was finished.
    pub reward: Reward,
    pub quest_completed: bool,
}

/// Fresh goal positioned at level 1.
pub fn new_goal(
    user_id: Uuid,
    title: impl Into<String>,
    category: GoalCategory,
    difficulty: Difficulty,
    levels: Vec<Level>,
) -> Goal {
    Goal {
        id: Uuid::new_v4(),
        user_id,
        title: title.into(),
        category,
        difficulty,
        total_levels: levels.len() as u32,
        created_at: Utc::now(),
        current_level: 1,
        progress: 0,
        is_completed: levels.is_empty(),
        levels,
    }
}

/// `round(100 * done / total)`, rounding halves up.
pub fn progress_percent(done: u32, total: u32) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = done.min(total) as u64;
    let total = total as u64;
    ((200 * done + total) / (2 * total)) as u8
}

pub fn complete_level(goal: &mut Goal, level_number: u32) -> Result<LevelCompletion, ProgressionError> {
    let level = goal
        .level_mut(level_number)
        .ok_or(ProgressionError::LevelNotFound(level_number))?;

    match level.status {
        LevelStatus::Locked => return Err(ProgressionError::LevelLocked(level_number)),
        LevelStatus::Completed => return Err(ProgressionError::AlreadyCompleted(level_number)),
        LevelStatus::Unlocked => {}
    }

    level.status = LevelStatus::Completed;
    let mut reward = Reward::new(level.xp_reward, level.coin_reward);

    if let Some(next) = level_number
        .checked_add(1)
        .and_then(|n| goal.level_mut(n))
    {
        next.status = LevelStatus::Unlocked;
    }

    let is_last = level_number >= goal.total_levels;
    if is_last {
        goal.current_level = goal.total_levels;
        goal.progress = 100;
        goal.is_completed = true;
        reward = reward + COMPLETION_BONUS;
    } else {
        goal.current_level = level_number + 1;
        goal.progress = progress_percent(level_number, goal.total_levels);
    }

    tracing::debug!(
        goal_id = %goal.id,
        level_number,
        progress = goal.progress,
        completed = goal.is_completed,
        "Level completed"
    );

    Ok(LevelCompletion {
        level_number,
        reward,
        quest_completed: is_last,
    })
}

/// Flip one checklist entry and return its new value.
///
/// A checklist whose length no longer matches the task list is reset first.
pub fn toggle_task(goal: &mut Goal, level_number: u32, index: usize) -> Result<bool, ProgressionError> {
    let level = goal
        .level_mut(level_number)
        .ok_or(ProgressionError::LevelNotFound(level_number))?;

    if level.status == LevelStatus::Locked {
        return Err(ProgressionError::LevelLocked(level_number));
    }

    let len = level.tasks.len();
    if index >= len {
        return Err(ProgressionError::TaskOutOfRange {
            level: level_number,
            index,
            len,
        });
    }

    if level.completed_tasks.len() != len {
        level.completed_tasks = vec![false; len];
    }

    let done = &mut level.completed_tasks[index];
    *done = !*done;
    Ok(*done)
}

/// Check the completed/unlocked/locked ordering of a goal's levels.
pub fn check_progression(goal: &Goal) -> Result<(), ProgressionError> {
    let mut levels: Vec<&Level> = goal.levels.iter().collect();
    levels.sort_by_key(|l| l.level_number);

    let unlocked: Vec<u32> = levels
        .iter()
        .filter(|l| l.status == LevelStatus::Unlocked)
        .map(|l| l.level_number)
        .collect();

    match (goal.is_completed, unlocked.as_slice()) {
        (true, []) => {
            if levels.iter().any(|l| l.status != LevelStatus::Completed) {
                return Err(ProgressionError::Inconsistent(
                    "completed goal has unfinished levels".into(),
                ));
            }
            Ok(())
        }
        (true, _) => Err(ProgressionError::Inconsistent(
            "completed goal still has an unlocked level".into(),
        )),
        (false, [current]) => {
            for level in &levels {
                let expected = match level.level_number.cmp(current) {
                    std::cmp::Ordering::Less => LevelStatus::Completed,
                    std::cmp::Ordering::Equal => LevelStatus::Unlocked,
                    std::cmp::Ordering::Greater => LevelStatus::Locked,
                };
                if level.status != expected {
                    return Err(ProgressionError::Inconsistent(format!(
                        "level {} is {} but should be {}",
                        level.level_number,
                        level.status.as_str(),
                        expected.as_str()
                    )));
                }
            }
            Ok(())
        }
        (false, found) => Err(ProgressionError::Inconsistent(format!(
            "expected exactly one unlocked level, found {}",
            found.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::placeholder_levels;

    fn goal(n: u32) -> Goal {
        new_goal(
            Uuid::new_v4(),
            "Run 10k",
            GoalCategory::Fitness,
            Difficulty::Easy,
            placeholder_levels(n, Difficulty::Easy),
        )
    }

    #[test]
    fn progress_rounds_half_up() {
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(5, 5), 100);
    }

    #[test]
    fn new_goal_satisfies_chain() {
        let g = goal(5);
        assert_eq!(g.total_levels, 5);
        assert_eq!(g.current_level, 1);
        assert!(check_progression(&g).is_ok());
    }

    #[test]
    fn toggle_resets_stale_checklist() {
        let mut g = goal(2);
        g.levels[0].tasks = vec!["a".into(), "b".into()];
        g.levels[0].completed_tasks = vec![true];

        assert_eq!(toggle_task(&mut g, 1, 1), Ok(true));
        assert_eq!(g.levels[0].completed_tasks, vec![false, true]);
        assert_eq!(toggle_task(&mut g, 1, 1), Ok(false));
    }

    #[test]
    fn toggle_rejects_locked_level() {
        let mut g = goal(2);
        g.levels[1].tasks = vec!["a".into()];
        assert_eq!(toggle_task(&mut g, 2, 0), Err(ProgressionError::LevelLocked(2)));
    }

    #[test]
    fn completing_the_highest_level_number_does_not_overflow() {
        let mut g = goal(1);
        g.levels[0].level_number = u32::MAX;
        g.levels[0].xp_reward = u32::MAX;

        let done = complete_level(&mut g, u32::MAX).unwrap();
        assert!(done.quest_completed);
        assert_eq!(done.reward.xp, u32::MAX);
        assert_eq!(g.progress, 100);
    }

    #[test]
    fn check_detects_two_unlocked_levels() {
        let mut g = goal(3);
        g.levels[2].status = LevelStatus::Unlocked;
        assert!(matches!(
            check_progression(&g),
            Err(ProgressionError::Inconsistent(_))
        ));
    }
}
