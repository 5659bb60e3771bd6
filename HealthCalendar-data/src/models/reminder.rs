use serde::{Deserialize, Serialize};

/// Storage model for a scheduled reminder.
///
/// Dates are stored as `YYYY-MM-DD` strings so they sort lexically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderRecord {
    /// Unique identifier for the reminder
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// Name of the screening or check
    pub test_name: String,

    /// Free-text recurrence label, e.g. "every 2 years"
    pub frequency: String,

    /// Optional link to reference information
    pub info_link: Option<String>,

    /// Next due date
    pub next_due: Option<String>,

    /// Date the check was last completed
    pub last_check: Option<String>,

    /// Date the last reminder notification was sent
    pub last_notified: Option<String>,

    /// RFC 3339 creation timestamp
    pub created_at: String,
}

/// Input data for creating a reminder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReminderRecord {
    pub user_id: String,
    pub test_name: String,
    pub frequency: String,
    pub info_link: Option<String>,
    pub next_due: Option<String>,
    pub last_check: Option<String>,
}
