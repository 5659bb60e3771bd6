use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// User-owned scheduled screening or check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_name: String,
    /// Free-text recurrence label
    pub frequency: String,
    pub info_link: Option<String>,
    /// Unset when the frequency could not be scheduled
    pub next_due: Option<NaiveDate>,
    pub last_check: Option<NaiveDate>,
    pub last_notified: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    /// Days from `today` until the reminder is due. Negative when overdue.
    pub fn days_until_due(&self, today: NaiveDate) -> Option<i64> {
        self.next_due.map(|due| (due - today).num_days())
    }
}

/// Request payload for creating a reminder, usually from an accepted
/// guideline recommendation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateReminderRequest {
    #[validate(length(min = 1, max = 100, message = "Test name must be between 1 and 100 characters"))]
    pub test_name: String,

    #[validate(length(min = 1, max = 50, message = "Frequency must be between 1 and 50 characters"))]
    pub frequency: String,

    #[validate(url(message = "Info link must be a valid URL"))]
    pub info_link: Option<String>,

    /// Explicit due date. Takes precedence over scheduling from `last_check`.
    pub next_due: Option<NaiveDate>,

    /// Date the check was last done
    pub last_check: Option<NaiveDate>,
}
