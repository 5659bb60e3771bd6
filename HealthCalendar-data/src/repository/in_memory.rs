use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::{ReminderRecord, UserRecord};
use super::errors::RepositoryError;

/// In-memory storage for users and reminders.
///
/// Used when `DB_TYPE=memory` and in tests. Clones share the same maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<Mutex<HashMap<String, UserRecord>>>,
    reminders: Arc<Mutex<HashMap<String, ReminderRecord>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user, rejecting duplicate usernames and emails
    pub fn insert_user(&self, user: &UserRecord) -> Result<UserRecord, RepositoryError> {
        let mut store = self.users.lock()?;

        if store.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(RepositoryError::Conflict(format!("email {} already registered", user.email)));
        }
        if store.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict(format!("username {} already taken", user.username)));
        }

        store.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }

    /// Get a user by ID
    pub fn user_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let store = self.users.lock()?;
        Ok(store.get(id).cloned())
    }

    /// Get a user by email, case-insensitive
    pub fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let store = self.users.lock()?;
        Ok(store.values().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    /// Apply a change to a stored user and return the updated record
    pub fn update_user<F>(&self, id: &str, apply: F) -> Result<UserRecord, RepositoryError>
    where
        F: FnOnce(&mut UserRecord),
    {
        let mut store = self.users.lock()?;
        let user = store
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))?;
        apply(user);
        Ok(user.clone())
    }

    /// Insert a reminder
    pub fn insert_reminder(&self, reminder: &ReminderRecord) -> Result<ReminderRecord, RepositoryError> {
        let mut store = self.reminders.lock()?;
        store.insert(reminder.id.clone(), reminder.clone());
        Ok(reminder.clone())
    }

    /// Get a reminder by ID
    pub fn reminder_by_id(&self, id: &str) -> Result<Option<ReminderRecord>, RepositoryError> {
        let store = self.reminders.lock()?;
        Ok(store.get(id).cloned())
    }

    /// Reminders matching a predicate, ordered by due date with unset dates last
    pub fn reminders_where<P>(&self, predicate: P) -> Result<Vec<ReminderRecord>, RepositoryError>
    where
        P: Fn(&ReminderRecord) -> bool,
    {
        let store = self.reminders.lock()?;
        let mut reminders: Vec<ReminderRecord> = store.values().filter(|r| predicate(r)).cloned().collect();
        sort_by_due_date(&mut reminders);
        Ok(reminders)
    }

    /// Apply a change to a stored reminder and return the updated record
    pub fn update_reminder<F>(&self, id: &str, apply: F) -> Result<ReminderRecord, RepositoryError>
    where
        F: FnOnce(&mut ReminderRecord),
    {
        let mut store = self.reminders.lock()?;
        let reminder = store
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("reminder {}", id)))?;
        apply(reminder);
        Ok(reminder.clone())
    }
}

/// Order reminders by `next_due` ascending, unset last, then by creation time
pub fn sort_by_due_date(reminders: &mut [ReminderRecord]) {
    reminders.sort_by(|a, b| match (&a.next_due, &b.next_due) {
        (Some(x), Some(y)) => x.cmp(y).then_with(|| a.created_at.cmp(&b.created_at)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.created_at.cmp(&b.created_at),
    });
}
