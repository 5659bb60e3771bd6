use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::{CreateReminderRecord, ReminderRecord};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for reminders
#[async_trait]
pub trait ReminderRepositoryTrait {
    /// Create a new reminder
    async fn create(&self, request: CreateReminderRecord) -> Result<ReminderRecord, RepositoryError>;

    /// Get a reminder by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<ReminderRecord>, RepositoryError>;

    /// All reminders of a user, `next_due` ascending with unset dates last
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ReminderRecord>, RepositoryError>;

    /// Set `next_due` and `last_check` of a reminder
    async fn update_schedule(
        &self,
        id: Uuid,
        next_due: Option<String>,
        last_check: Option<String>,
    ) -> Result<ReminderRecord, RepositoryError>;

    /// Record the date a notification was sent
    async fn mark_notified(&self, id: Uuid, at: String) -> Result<(), RepositoryError>;

    /// Reminders of all users with `next_due` in `[start, end]`, inclusive
    async fn list_due_between(&self, start: String, end: String) -> Result<Vec<ReminderRecord>, RepositoryError>;
}

/// Repository for reminders, backed by SQLite when a pool is given and by
/// process memory otherwise.
#[derive(Debug, Clone, Default)]
pub struct ReminderRepository {
    pool: Option<DatabasePool>,
    storage: InMemoryStorage,
}

impl ReminderRepository {
    /// Create a new repository over an optional database pool
    pub fn new(pool: Option<DatabasePool>) -> Self {
        Self {
            pool,
            storage: InMemoryStorage::new(),
        }
    }

    /// Create a repository that keeps reminders in memory
    pub fn in_memory() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl ReminderRepositoryTrait for ReminderRepository {
    async fn create(&self, request: CreateReminderRecord) -> Result<ReminderRecord, RepositoryError> {
        let reminder = ReminderRecord {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            test_name: request.test_name,
            frequency: request.frequency,
            info_link: request.info_link,
            next_due: request.next_due,
            last_check: request.last_check,
            last_notified: None,
            created_at: Utc::now().to_rfc3339(),
        };

        match &self.pool {
            Some(pool) => DatabaseStorage::insert_reminder(pool, &reminder)?,
            None => {
                debug!("Storing reminder in memory: {}", reminder.id);
                self.storage.insert_reminder(&reminder)?;
            }
        }

        info!("Created reminder {} for user {}", reminder.id, reminder.user_id);
        Ok(reminder)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<ReminderRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::reminder_by_id(pool, &id.to_string()),
            None => self.storage.reminder_by_id(&id.to_string()),
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ReminderRecord>, RepositoryError> {
        let user_id = user_id.to_string();
        match &self.pool {
            Some(pool) => DatabaseStorage::reminders_for_user(pool, &user_id),
            None => self.storage.reminders_where(|r| r.user_id == user_id),
        }
    }

    async fn update_schedule(
        &self,
        id: Uuid,
        next_due: Option<String>,
        last_check: Option<String>,
    ) -> Result<ReminderRecord, RepositoryError> {
        let id = id.to_string();
        match &self.pool {
            Some(pool) => {
                if DatabaseStorage::update_schedule(pool, &id, next_due.as_deref(), last_check.as_deref())? == 0 {
                    return Err(RepositoryError::NotFound(format!("reminder {}", id)));
                }
                DatabaseStorage::reminder_by_id(pool, &id)?
                    .ok_or_else(|| RepositoryError::NotFound(format!("reminder {}", id)))
            }
            None => self.storage.update_reminder(&id, |reminder| {
                reminder.next_due = next_due;
                reminder.last_check = last_check;
            }),
        }
    }

    async fn mark_notified(&self, id: Uuid, at: String) -> Result<(), RepositoryError> {
        let id = id.to_string();
        match &self.pool {
            Some(pool) => {
                if DatabaseStorage::mark_notified(pool, &id, &at)? == 0 {
                    return Err(RepositoryError::NotFound(format!("reminder {}", id)));
                }
                Ok(())
            }
            None => self
                .storage
                .update_reminder(&id, |reminder| reminder.last_notified = Some(at))
                .map(|_| ()),
        }
    }

    async fn list_due_between(&self, start: String, end: String) -> Result<Vec<ReminderRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::reminders_due_between(pool, &start, &end),
            None => self.storage.reminders_where(|r| {
                r.next_due
                    .as_deref()
                    .map(|due| due >= start.as_str() && due <= end.as_str())
                    .unwrap_or(false)
            }),
        }
    }
}

/// Mock reminder repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::repository::in_memory::sort_by_due_date;

    /// Mock implementation of ReminderRepository for testing
    #[derive(Default)]
    pub struct MockReminderRepository {
        reminders: Mutex<Vec<ReminderRecord>>,
        notified: Mutex<Vec<String>>,
    }

    impl MockReminderRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined reminders
        pub fn with_reminders(reminders: Vec<ReminderRecord>) -> Self {
            Self {
                reminders: Mutex::new(reminders),
                notified: Mutex::new(Vec::new()),
            }
        }

        /// IDs passed to `mark_notified`, in call order
        pub fn notified_ids(&self) -> Vec<String> {
            self.notified.lock().map(|ids| ids.clone()).unwrap_or_default()
        }
    }

    /// Build a reminder record for a user
    pub fn sample_reminder(user_id: &str, test_name: &str, frequency: &str, next_due: Option<&str>) -> ReminderRecord {
        ReminderRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            test_name: test_name.to_string(),
            frequency: frequency.to_string(),
            info_link: None,
            next_due: next_due.map(str::to_string),
            last_check: None,
            last_notified: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[async_trait]
    impl ReminderRepositoryTrait for MockReminderRepository {
        async fn create(&self, request: CreateReminderRecord) -> Result<ReminderRecord, RepositoryError> {
            let mut reminder = sample_reminder(
                &request.user_id,
                &request.test_name,
                &request.frequency,
                request.next_due.as_deref(),
            );
            reminder.info_link = request.info_link;
            reminder.last_check = request.last_check;
            self.reminders.lock()?.push(reminder.clone());
            Ok(reminder)
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Option<ReminderRecord>, RepositoryError> {
            let reminders = self.reminders.lock()?;
            Ok(reminders.iter().find(|r| r.id == id.to_string()).cloned())
        }

        async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ReminderRecord>, RepositoryError> {
            let reminders = self.reminders.lock()?;
            let mut result: Vec<ReminderRecord> = reminders
                .iter()
                .filter(|r| r.user_id == user_id.to_string())
                .cloned()
                .collect();
            sort_by_due_date(&mut result);
            Ok(result)
        }

        async fn update_schedule(
            &self,
            id: Uuid,
            next_due: Option<String>,
            last_check: Option<String>,
        ) -> Result<ReminderRecord, RepositoryError> {
            let mut reminders = self.reminders.lock()?;
            let reminder = reminders
                .iter_mut()
                .find(|r| r.id == id.to_string())
                .ok_or_else(|| RepositoryError::NotFound(format!("reminder {}", id)))?;
            reminder.next_due = next_due;
            reminder.last_check = last_check;
            Ok(reminder.clone())
        }

        async fn mark_notified(&self, id: Uuid, at: String) -> Result<(), RepositoryError> {
            let mut reminders = self.reminders.lock()?;
            let reminder = reminders
                .iter_mut()
                .find(|r| r.id == id.to_string())
                .ok_or_else(|| RepositoryError::NotFound(format!("reminder {}", id)))?;
            reminder.last_notified = Some(at);
            self.notified.lock()?.push(id.to_string());
            Ok(())
        }

        async fn list_due_between(&self, start: String, end: String) -> Result<Vec<ReminderRecord>, RepositoryError> {
            let reminders = self.reminders.lock()?;
            let mut result: Vec<ReminderRecord> = reminders
                .iter()
                .filter(|r| {
                    r.next_due
                        .as_deref()
                        .map(|due| due >= start.as_str() && due <= end.as_str())
                        .unwrap_or(false)
                })
                .cloned()
                .collect();
            sort_by_due_date(&mut result);
            Ok(result)
        }
    }

}
