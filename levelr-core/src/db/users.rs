use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{parse_timestamp, parse_uuid, Database};
use crate::models::{RegisterInput, UpdateUserInput, User, UserStats};
use crate::rewards::Reward;

const USER_COLUMNS: &str = "id, username, email, xp, coins, completed_quests, joined_at";

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(0, row.get(0)?)?,
        username: row.get(1)?,
        email: row.get(2)?,
        stats: UserStats {
            xp: row.get::<_, i64>(3)?.max(0) as u64,
            coins: row.get::<_, i64>(4)?.max(0) as u64,
            completed_quests: row.get(5)?,
        },
        joined_at: parse_timestamp(6, row.get(6)?)?,
    })
}

pub(super) fn read_user(conn: &Connection, id: Uuid) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
        params![id.to_string()],
        user_from_row,
    )
    .optional()
}

pub(super) fn credit_user(
    conn: &Connection,
    id: Uuid,
    reward: Reward,
    quests_completed: u32,
) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE users
         SET xp = xp + ?2, coins = coins + ?3, completed_quests = completed_quests + ?4
         WHERE id = ?1",
        params![id.to_string(), reward.xp, reward.coins, quests_completed],
    )?;
    Ok(changed > 0)
}

impl Database {
    pub fn create_user(&self, input: RegisterInput) -> Result<User> {
        let conn = self.lock()?;
        let user = User {
            id: Uuid::new_v4(),
            username: input.username.trim().to_string(),
            email: input.email.trim().to_string(),
            stats: UserStats::default(),
            joined_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO users (id, username, email, password, xp, coins, completed_quests, joined_at)
             VALUES (?1, ?2, ?3, ?4, 0, 0, 0, ?5)",
            params![
                user.id.to_string(),
                user.username,
                user.email,
                input.password,
                user.joined_at.to_rfc3339(),
            ],
        )?;

        tracing::info!(user_id = %user.id, "User created: {}", user.email);
        Ok(user)
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let conn = self.lock()?;
        Ok(read_user(&conn, id)?)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                params![email.trim()],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Plain comparison of the stored credentials. Returns `None` for an
    /// unknown email and for a wrong password alike.
    pub fn find_user_by_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                &format!(
                    "SELECT {} FROM users WHERE email = ?1 AND password = ?2",
                    USER_COLUMNS
                ),
                params![email.trim(), password],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Apply a partial update. Returns the updated user, or `None` if absent.
    pub fn update_user(&self, id: Uuid, input: UpdateUserInput) -> Result<Option<User>> {
        let conn = self.lock()?;
        let Some(current) = read_user(&conn, id)? else {
            return Ok(None);
        };

        let username = input
            .username
            .map(|u| u.trim().to_string())
            .unwrap_or(current.username);
        let email = input
            .email
            .map(|e| e.trim().to_string())
            .unwrap_or(current.email);
        let stats = input.stats.unwrap_or(current.stats);

        conn.execute(
            "UPDATE users SET username = ?2, email = ?3, xp = ?4, coins = ?5, completed_quests = ?6
             WHERE id = ?1",
            params![
                id.to_string(),
                username,
                email,
                stats.xp as i64,
                stats.coins as i64,
                stats.completed_quests,
            ],
        )?;

        if let Some(password) = input.password {
            conn.execute(
                "UPDATE users SET password = ?2 WHERE id = ?1",
                params![id.to_string(), password],
            )?;
        }

        Ok(read_user(&conn, id)?)
    }

    /// Add a reward to a user's stats. Returns false if the user is absent.
    pub fn add_rewards(&self, id: Uuid, reward: Reward, quests_completed: u32) -> Result<bool> {
        let conn = self.lock()?;
        Ok(credit_user(&conn, id, reward, quests_completed)?)
    }
}
