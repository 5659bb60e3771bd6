//! Reminder notifications.
//!
//! Delivery is behind [`ReminderNotifier`]; [`LogNotifier`] writes the
//! composed message to the log. [`ReminderDispatcher`] runs one pass over
//! the reminders that are due.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{error, info};

#[cfg(test)]
use mockall::automock;

use crate::entities::reminder::Reminder;
use crate::entities::user::User;
use crate::services::reminders::{ReminderServiceError, ReminderServiceTrait};
use crate::services::users::UserServiceTrait;

/// Subject line of reminder messages
pub const REMINDER_SUBJECT: &str = "Upcoming Health Checkup Reminder";

/// Notification errors
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The message could not be delivered
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Looking up the reminders or their owners failed
    #[error("Reminder lookup failed: {0}")]
    Lookup(String),
}

impl From<ReminderServiceError> for NotifyError {
    fn from(error: ReminderServiceError) -> Self {
        NotifyError::Lookup(error.to_string())
    }
}

/// A composed reminder message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Compose the reminder message for a user
pub fn compose_reminder_message(user: &User, reminder: &Reminder, today: NaiveDate) -> ReminderMessage {
    let mut body = format!("Dear {},\n\n", user.username);
    body.push_str("This is a reminder that you have an upcoming health checkup:\n\n");
    body.push_str(&format!("Checkup: {}\n", reminder.test_name));

    if let Some(due) = reminder.next_due {
        body.push_str(&format!("Due Date: {}\n", due));
        body.push_str(&format!("Days until due: {}\n", (due - today).num_days().max(0)));
    }
    body.push('\n');

    if let Some(link) = reminder.info_link.as_deref().filter(|l| !l.is_empty()) {
        body.push_str(&format!("Additional Information:\n{}\n\n", link));
    }

    body.push_str("Please schedule your appointment soon to maintain your health routine.\n\n");
    body.push_str("Best regards,\nHealth Calendar Team");

    ReminderMessage {
        to: user.email.clone(),
        subject: REMINDER_SUBJECT.to_string(),
        body,
    }
}

/// Delivers reminder messages
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReminderNotifier {
    async fn send(&self, message: &ReminderMessage) -> Result<(), NotifyError>;
}

/// Notifier that writes messages to the log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl ReminderNotifier for LogNotifier {
    async fn send(&self, message: &ReminderMessage) -> Result<(), NotifyError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "Reminder message:\n{}",
            message.body
        );
        Ok(())
    }
}

/// Outcome of one notification pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
}

/// Sends notifications for due reminders and stamps them as notified
pub struct ReminderDispatcher {
    reminders: Arc<dyn ReminderServiceTrait + Send + Sync>,
    users: Arc<dyn UserServiceTrait + Send + Sync>,
    notifier: Arc<dyn ReminderNotifier + Send + Sync>,
    window_days: i64,
}

impl ReminderDispatcher {
    pub fn new(
        reminders: Arc<dyn ReminderServiceTrait + Send + Sync>,
        users: Arc<dyn UserServiceTrait + Send + Sync>,
        notifier: Arc<dyn ReminderNotifier + Send + Sync>,
        window_days: i64,
    ) -> Self {
        Self {
            reminders,
            users,
            notifier,
            window_days,
        }
    }

    /// Notify every reminder due within the window.
    ///
    /// A failure for one reminder is logged and counted; the pass continues.
    pub async fn run_once(&self, today: NaiveDate) -> Result<DispatchSummary, NotifyError> {
        let due = self.reminders.due_for_notification(today, self.window_days).await?;
        info!("{} reminders due within {} days of {}", due.len(), self.window_days, today);

        let mut summary = DispatchSummary::default();
        for reminder in due {
            match self.notify_one(&reminder, today).await {
                Ok(to) => {
                    info!("Reminder sent to {} for {}", to, reminder.test_name);
                    summary.sent += 1;
                }
                Err(e) => {
                    error!("Failed to send reminder {}: {}", reminder.id, e);
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }

    async fn notify_one(&self, reminder: &Reminder, today: NaiveDate) -> Result<String, NotifyError> {
        let user = self
            .users
            .get_user(reminder.user_id)
            .await
            .map_err(|e| NotifyError::Lookup(e.to_string()))?;

        let message = compose_reminder_message(&user, reminder, today);
        self.notifier.send(&message).await?;
        self.reminders.record_notified(reminder.id, today).await?;
        Ok(message.to)
    }
}
