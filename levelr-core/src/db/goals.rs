use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::users::{credit_user, read_user};
use super::{conversion_error, parse_timestamp, parse_uuid, Database, GoalUpdateError};
use crate::models::{Difficulty, Goal, GoalCategory, Level, User};
use crate::progression::{self, LevelCompletion};

const GOAL_COLUMNS: &str = "id, user_id, title, category, difficulty, total_levels, \
     current_level, progress, is_completed, levels, created_at";

/// Result of an atomic level completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOutcome {
    pub goal: Goal,
    pub user: User,
    pub reward: LevelCompletion,
}

fn goal_from_row(row: &Row) -> rusqlite::Result<Goal> {
    let category: String = row.get(3)?;
    let difficulty: String = row.get(4)?;
    let levels: String = row.get(9)?;
    let levels: Vec<Level> = serde_json::from_str(&levels)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(Goal {
        id: parse_uuid(0, row.get(0)?)?,
        user_id: parse_uuid(1, row.get(1)?)?,
        title: row.get(2)?,
        category: GoalCategory::from_str(&category)
            .ok_or_else(|| conversion_error(3, format!("invalid category: {}", category)))?,
        difficulty: Difficulty::from_str(&difficulty)
            .ok_or_else(|| conversion_error(4, format!("invalid difficulty: {}", difficulty)))?,
        total_levels: row.get(5)?,
        current_level: row.get(6)?,
        progress: row.get(7)?,
        is_completed: row.get(8)?,
        levels,
        created_at: parse_timestamp(10, row.get(10)?)?,
    })
}

fn read_goal(conn: &Connection, id: Uuid) -> rusqlite::Result<Option<Goal>> {
    conn.query_row(
        &format!("SELECT {} FROM goals WHERE id = ?1", GOAL_COLUMNS),
        params![id.to_string()],
        goal_from_row,
    )
    .optional()
}

/// Last-write-wins replace of the whole document.
fn write_goal(conn: &Connection, goal: &Goal) -> Result<(), GoalUpdateError> {
    let levels = serde_json::to_string(&goal.levels)?;
    conn.execute(
        "INSERT INTO goals (id, user_id, title, category, difficulty, total_levels,
                            current_level, progress, is_completed, levels, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET
            user_id = excluded.user_id,
            title = excluded.title,
            category = excluded.category,
            difficulty = excluded.difficulty,
            total_levels = excluded.total_levels,
            current_level = excluded.current_level,
            progress = excluded.progress,
            is_completed = excluded.is_completed,
            levels = excluded.levels",
        params![
            goal.id.to_string(),
            goal.user_id.to_string(),
            goal.title,
            goal.category.as_str(),
            goal.difficulty.as_str(),
            goal.total_levels,
            goal.current_level,
            goal.progress,
            goal.is_completed,
            levels,
            goal.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

impl Database {
    pub fn list_goals(&self, user_id: Uuid) -> Result<Vec<Goal>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM goals WHERE user_id = ?1 ORDER BY created_at DESC",
            GOAL_COLUMNS
        ))?;
        let goals = stmt
            .query_map(params![user_id.to_string()], goal_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(goals)
    }

    pub fn get_goal(&self, id: Uuid) -> Result<Option<Goal>> {
        let conn = self.lock()?;
        Ok(read_goal(&conn, id)?)
    }

    pub fn upsert_goal(&self, goal: &Goal) -> Result<()> {
        let conn = self.lock()?;
        write_goal(&conn, goal)?;
        tracing::debug!(goal_id = %goal.id, "Goal saved");
        Ok(())
    }

    /// Returns false if no goal had that id.
    pub fn delete_goal(&self, id: Uuid) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM goals WHERE id = ?1", params![id.to_string()])?;
        Ok(deleted > 0)
    }

    /// Flip one checklist entry of a level and persist the goal.
    pub fn toggle_task(
        &self,
        goal_id: Uuid,
        level_number: u32,
        task_index: usize,
    ) -> Result<Goal, GoalUpdateError> {
        let conn = self.lock_for_update()?;
        let mut goal = read_goal(&conn, goal_id)?.ok_or(GoalUpdateError::GoalNotFound)?;
        progression::toggle_task(&mut goal, level_number, task_index)?;
        write_goal(&conn, &goal)?;
        Ok(goal)
    }

    /// Complete a level and credit its owner in one transaction.
    pub fn complete_level(
        &self,
        goal_id: Uuid,
        level_number: u32,
    ) -> Result<CompletionOutcome, GoalUpdateError> {
        let mut conn = self.lock_for_update()?;
        let tx = conn.transaction()?;

        let mut goal = read_goal(&tx, goal_id)?.ok_or(GoalUpdateError::GoalNotFound)?;
        let reward = progression::complete_level(&mut goal, level_number)?;
        write_goal(&tx, &goal)?;

        let quests = u32::from(reward.quest_completed);
        if !credit_user(&tx, goal.user_id, reward.reward, quests)? {
            return Err(GoalUpdateError::UserNotFound);
        }
        let user = read_user(&tx, goal.user_id)?.ok_or(GoalUpdateError::UserNotFound)?;

        tx.commit()?;

        tracing::info!(
            goal_id = %goal.id,
            user_id = %user.id,
            level_number,
            xp = reward.reward.xp,
            coins = reward.reward.coins,
            "Level completed"
        );

        Ok(CompletionOutcome { goal, user, reward })
    }
}
