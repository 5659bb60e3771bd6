use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::{ProfileUpdateRecord, ReminderRecord, UserRecord};
use super::errors::RepositoryError;

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, age, sex, location, conditions, health_data, last_health_update";

const REMINDER_COLUMNS: &str = "id, user_id, test_name, frequency, info_link, next_due, last_check, last_notified, created_at";

/// Database storage operations for users and reminders
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Store a new user
    pub fn insert_user(pool: &DatabasePool, user: &UserRecord) -> Result<(), RepositoryError> {
        debug!("Storing user in database: id={}", user.id);

        let conn = pool.get()?;
        let health_data = user
            .health_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            "INSERT INTO users
             (id, username, email, password_hash, created_at, age, sex, location, conditions, health_data, last_health_update)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                user.id,
                user.username,
                user.email,
                user.password_hash,
                user.created_at,
                user.age,
                user.sex,
                user.location,
                user.conditions,
                health_data,
                user.last_health_update,
            ],
        )?;

        Ok(())
    }

    /// Get a user by ID
    pub fn user_by_id(pool: &DatabasePool, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        debug!("Getting user by ID from database: id={}", id);

        let conn = pool.get()?;
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        let user = conn.query_row(&sql, [id], user_from_row).optional()?;
        Ok(user)
    }

    /// Get a user by email, case-insensitive
    pub fn user_by_email(pool: &DatabasePool, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        debug!("Getting user by email from database");

        let conn = pool.get()?;
        let sql = format!("SELECT {} FROM users WHERE lower(email) = lower(?1)", USER_COLUMNS);
        let user = conn.query_row(&sql, [email], user_from_row).optional()?;
        Ok(user)
    }

    /// Update profile fields of a user
    pub fn update_profile(
        pool: &DatabasePool,
        id: &str,
        update: &ProfileUpdateRecord,
    ) -> Result<usize, RepositoryError> {
        debug!("Updating profile in database: id={}", id);

        let conn = pool.get()?;
        let changed = conn.execute(
            "UPDATE users SET age = ?1, sex = ?2, location = ?3, conditions = ?4 WHERE id = ?5",
            params![update.age, update.sex, update.location, update.conditions, id],
        )?;
        Ok(changed)
    }

    /// Replace the stored health assessment of a user
    pub fn update_health_data(
        pool: &DatabasePool,
        id: &str,
        health_data: &serde_json::Value,
        updated_at: &str,
    ) -> Result<usize, RepositoryError> {
        debug!("Updating health data in database: id={}", id);

        let conn = pool.get()?;
        let changed = conn.execute(
            "UPDATE users SET health_data = ?1, last_health_update = ?2 WHERE id = ?3",
            params![serde_json::to_string(health_data)?, updated_at, id],
        )?;
        Ok(changed)
    }

    /// Store a new reminder
    pub fn insert_reminder(pool: &DatabasePool, reminder: &ReminderRecord) -> Result<(), RepositoryError> {
        debug!("Storing reminder in database: id={}", reminder.id);

        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO reminders
             (id, user_id, test_name, frequency, info_link, next_due, last_check, last_notified, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                reminder.id,
                reminder.user_id,
                reminder.test_name,
                reminder.frequency,
                reminder.info_link,
                reminder.next_due,
                reminder.last_check,
                reminder.last_notified,
                reminder.created_at,
            ],
        )?;

        Ok(())
    }

    /// Get a reminder by ID
    pub fn reminder_by_id(pool: &DatabasePool, id: &str) -> Result<Option<ReminderRecord>, RepositoryError> {
        debug!("Getting reminder by ID from database: id={}", id);

        let conn = pool.get()?;
        let sql = format!("SELECT {} FROM reminders WHERE id = ?1", REMINDER_COLUMNS);
        let reminder = conn.query_row(&sql, [id], reminder_from_row).optional()?;
        Ok(reminder)
    }

    /// All reminders of a user, ordered by due date with unset dates last
    pub fn reminders_for_user(pool: &DatabasePool, user_id: &str) -> Result<Vec<ReminderRecord>, RepositoryError> {
        debug!("Getting reminders for user from database: user_id={}", user_id);

        let conn = pool.get()?;
        let sql = format!(
            "SELECT {} FROM reminders WHERE user_id = ?1
             ORDER BY next_due IS NULL, next_due ASC, created_at ASC",
            REMINDER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([user_id], reminder_from_row)?;

        let mut result = Vec::new();
        for reminder in rows {
            result.push(reminder?);
        }
        Ok(result)
    }

    /// Reminders with `next_due` inside `[start, end]`, inclusive
    pub fn reminders_due_between(
        pool: &DatabasePool,
        start: &str,
        end: &str,
    ) -> Result<Vec<ReminderRecord>, RepositoryError> {
        debug!("Getting reminders due between {} and {} from database", start, end);

        let conn = pool.get()?;
        let sql = format!(
            "SELECT {} FROM reminders
             WHERE next_due IS NOT NULL AND next_due >= ?1 AND next_due <= ?2
             ORDER BY next_due ASC, created_at ASC",
            REMINDER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([start, end], reminder_from_row)?;

        let mut result = Vec::new();
        for reminder in rows {
            result.push(reminder?);
        }
        Ok(result)
    }

    /// Set the schedule fields of a reminder
    pub fn update_schedule(
        pool: &DatabasePool,
        id: &str,
        next_due: Option<&str>,
        last_check: Option<&str>,
    ) -> Result<usize, RepositoryError> {
        debug!("Updating reminder schedule in database: id={}", id);

        let conn = pool.get()?;
        let changed = conn.execute(
            "UPDATE reminders SET next_due = ?1, last_check = ?2 WHERE id = ?3",
            params![next_due, last_check, id],
        )?;
        Ok(changed)
    }

    /// Record that a notification was sent
    pub fn mark_notified(pool: &DatabasePool, id: &str, at: &str) -> Result<usize, RepositoryError> {
        debug!("Marking reminder notified in database: id={}", id);

        let conn = pool.get()?;
        let changed = conn.execute(
            "UPDATE reminders SET last_notified = ?1 WHERE id = ?2",
            params![at, id],
        )?;
        Ok(changed)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    let health_data: Option<String> = row.get(9)?;
    let health_data = health_data
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

    Ok(UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
        age: row.get(5)?,
        sex: row.get(6)?,
        location: row.get(7)?,
        conditions: row.get(8)?,
        health_data,
        last_health_update: row.get(10)?,
    })
}

fn reminder_from_row(row: &Row<'_>) -> rusqlite::Result<ReminderRecord> {
    Ok(ReminderRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        test_name: row.get(2)?,
        frequency: row.get(3)?,
        info_link: row.get(4)?,
        next_due: row.get(5)?,
        last_check: row.get(6)?,
        last_notified: row.get(7)?,
        created_at: row.get(8)?,
    })
}
