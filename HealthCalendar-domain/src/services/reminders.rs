use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use health_calendar_data::repository::{ReminderRepositoryTrait, RepositoryError};

use crate::entities::conversions;
use crate::entities::reminder::{CreateReminderRequest, Reminder};
use crate::services::scheduler::{next_due_date, reschedule_after_completion};
use crate::services::validation_message;

/// Default look-ahead for reminder notifications, in days
pub const DEFAULT_REMINDER_WINDOW_DAYS: i64 = 7;

/// Largest accepted look-ahead for reminder notifications, in days
pub const MAX_REMINDER_WINDOW_DAYS: i64 = 366;

/// Reminder service errors
#[derive(Debug, Error)]
pub enum ReminderServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Reminder not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// Stored data could not be read
    #[error("Data error: {0}")]
    DataError(String),
}

/// Trait for reminder service operations
#[async_trait]
pub trait ReminderServiceTrait {
    /// Create a reminder for a user
    async fn create_reminder(
        &self,
        user_id: Uuid,
        request: CreateReminderRequest,
        today: NaiveDate,
    ) -> Result<Reminder, ReminderServiceError>;

    /// All reminders of a user, soonest first with unscheduled ones last
    async fn list_reminders(&self, user_id: Uuid) -> Result<Vec<Reminder>, ReminderServiceError>;

    /// Record a completed check and move the due date forward
    async fn mark_completed(
        &self,
        user_id: Uuid,
        reminder_id: Uuid,
        today: NaiveDate,
    ) -> Result<Reminder, ReminderServiceError>;

    /// Reminders due within `window_days` of `today` that were not notified
    /// during the same window
    async fn due_for_notification(
        &self,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<Vec<Reminder>, ReminderServiceError>;

    /// Record that a notification went out for a reminder
    async fn record_notified(&self, reminder_id: Uuid, today: NaiveDate) -> Result<(), ReminderServiceError>;
}

/// Reminder service for domain logic
pub struct ReminderService<R: ReminderRepositoryTrait> {
    repository: R,
}

impl<R: ReminderRepositoryTrait> ReminderService<R> {
    /// Create a new reminder service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> ReminderServiceError {
        match err {
            RepositoryError::NotFound(msg) => ReminderServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => ReminderServiceError::ValidationError(msg),
            _ => ReminderServiceError::RepositoryError(err.to_string()),
        }
    }
}

#[async_trait]
impl<R: ReminderRepositoryTrait + Send + Sync> ReminderServiceTrait for ReminderService<R> {
    async fn create_reminder(
        &self,
        user_id: Uuid,
        request: CreateReminderRequest,
        today: NaiveDate,
    ) -> Result<Reminder, ReminderServiceError> {
        request
            .validate()
            .map_err(|e| ReminderServiceError::ValidationError(validation_message(&e)))?;

        if request.test_name.trim().is_empty() || request.frequency.trim().is_empty() {
            return Err(ReminderServiceError::ValidationError(
                "Test name and frequency cannot be blank".to_string(),
            ));
        }

        if let Some(last_check) = request.last_check {
            if last_check > today {
                return Err(ReminderServiceError::ValidationError(
                    "Last check cannot be in the future".to_string(),
                ));
            }
        }

        let next_due = match (request.next_due, request.last_check) {
            (Some(due), _) => Some(due),
            (None, Some(last_check)) => {
                let scheduled = next_due_date(last_check, &request.frequency);
                if scheduled.is_none() {
                    warn!(
                        "Unrecognized frequency {:?} for reminder {:?}, leaving due date unset",
                        request.frequency, request.test_name
                    );
                }
                scheduled
            }
            (None, None) => {
                warn!(
                    "No due date or last check for reminder {:?}, leaving due date unset",
                    request.test_name
                );
                None
            }
        };

        let record = conversions::convert_to_data_create_reminder(
            user_id,
            &request.test_name,
            &request.frequency,
            request.info_link.as_deref(),
            next_due,
            request.last_check,
        );

        let created = self
            .repository
            .create(record)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        conversions::convert_to_domain_reminder(created).map_err(ReminderServiceError::DataError)
    }

    async fn list_reminders(&self, user_id: Uuid) -> Result<Vec<Reminder>, ReminderServiceError> {
        let records = self
            .repository
            .list_for_user(user_id)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        records
            .into_iter()
            .map(conversions::convert_to_domain_reminder)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ReminderServiceError::DataError)
    }

    async fn mark_completed(
        &self,
        user_id: Uuid,
        reminder_id: Uuid,
        today: NaiveDate,
    ) -> Result<Reminder, ReminderServiceError> {
        let record = self
            .repository
            .get_by_id(reminder_id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .filter(|r| r.user_id == user_id.to_string())
            .ok_or_else(|| ReminderServiceError::NotFound(format!("Reminder with ID {} not found", reminder_id)))?;

        let next_due = reschedule_after_completion(today, &record.frequency);

        let updated = self
            .repository
            .update_schedule(
                reminder_id,
                Some(conversions::format_stored_date(next_due)),
                Some(conversions::format_stored_date(today)),
            )
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!(
            "Reminder {} completed on {}, next due {}",
            reminder_id, today, next_due
        );
        conversions::convert_to_domain_reminder(updated).map_err(ReminderServiceError::DataError)
    }

    async fn due_for_notification(
        &self,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<Vec<Reminder>, ReminderServiceError> {
        if window_days < 0 {
            return Err(ReminderServiceError::ValidationError(
                "Reminder window cannot be negative".to_string(),
            ));
        }

        let window = Days::new(window_days as u64);
        let (Some(end), Some(quiet_since)) = (today.checked_add_days(window), today.checked_sub_days(window)) else {
            return Err(ReminderServiceError::ValidationError(format!(
                "Reminder window of {} days is out of range",
                window_days
            )));
        };

        let records = self
            .repository
            .list_due_between(
                conversions::format_stored_date(today),
                conversions::format_stored_date(end),
            )
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let mut due = Vec::with_capacity(records.len());
        for record in records {
            let reminder =
                conversions::convert_to_domain_reminder(record).map_err(ReminderServiceError::DataError)?;
            let recently_notified = reminder
                .last_notified
                .map_or(false, |notified| notified >= quiet_since);
            if !recently_notified {
                due.push(reminder);
            }
        }
        Ok(due)
    }

    async fn record_notified(&self, reminder_id: Uuid, today: NaiveDate) -> Result<(), ReminderServiceError> {
        self.repository
            .mark_notified(reminder_id, conversions::format_stored_date(today))
            .await
            .map_err(|e| self.map_repo_error(e))
    }
}

/// Create a reminder service over the given reminder repository
pub fn create_reminder_service(
    repository: health_calendar_data::repository::ReminderRepository,
) -> impl ReminderServiceTrait + Send + Sync {
    ReminderService::new(repository)
}
