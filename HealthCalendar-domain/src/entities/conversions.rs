use chrono::{DateTime, NaiveDate, Utc};
use health_calendar_data::models::{
    CreateReminderRecord, ProfileUpdateRecord, ReminderRecord, UserRecord,
};
use tracing::warn;
use uuid::Uuid;

use crate::entities::health_profile::HealthProfile;
use crate::entities::reminder::Reminder;
use crate::entities::user::{UpdateProfileRequest, User};

// Conversion functions between domain entities and data models.
// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Date format used by the reminder store
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Helper function to safely parse a string ID to UUID
///
/// When an invalid UUID is provided, it returns a descriptive error message.
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {}", id))
}

/// Parse a stored `YYYY-MM-DD` date
pub fn parse_stored_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| format!("Invalid date format: {}", value))
}

/// Format a date the way the reminder store expects
pub fn format_stored_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("Invalid timestamp format: {}", value))
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    value.map(parse_stored_date).transpose()
}

/// Convert from data model to domain entity for a reminder
pub fn convert_to_domain_reminder(record: ReminderRecord) -> Result<Reminder, String> {
    Ok(Reminder {
        id: parse_string_to_uuid(&record.id)?,
        user_id: parse_string_to_uuid(&record.user_id)?,
        test_name: record.test_name,
        frequency: record.frequency,
        info_link: record.info_link,
        next_due: parse_optional_date(record.next_due.as_deref())?,
        last_check: parse_optional_date(record.last_check.as_deref())?,
        last_notified: parse_optional_date(record.last_notified.as_deref())?,
        created_at: parse_timestamp(&record.created_at)?,
    })
}

/// Convert to the data model used to create a reminder
pub fn convert_to_data_create_reminder(
    user_id: Uuid,
    test_name: &str,
    frequency: &str,
    info_link: Option<&str>,
    next_due: Option<NaiveDate>,
    last_check: Option<NaiveDate>,
) -> CreateReminderRecord {
    CreateReminderRecord {
        user_id: user_id.to_string(),
        test_name: test_name.trim().to_string(),
        frequency: frequency.trim().to_string(),
        info_link: info_link.map(str::to_string),
        next_due: next_due.map(format_stored_date),
        last_check: last_check.map(format_stored_date),
    }
}

/// Convert from data model to domain entity for a user.
///
/// A stored health profile that no longer matches the current shape is
/// dropped with a warning rather than failing the whole lookup.
pub fn convert_to_domain_user(record: UserRecord) -> Result<User, String> {
    let health_profile = match record.health_data {
        Some(value) => match serde_json::from_value::<HealthProfile>(value) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("Ignoring unreadable health data for user {}: {}", record.id, e);
                None
            }
        },
        None => None,
    };

    let sex = match record.sex.as_deref() {
        Some(raw) => raw.parse().ok(),
        None => None,
    };

    Ok(User {
        id: parse_string_to_uuid(&record.id)?,
        username: record.username,
        email: record.email,
        password_hash: record.password_hash,
        created_at: parse_timestamp(&record.created_at)?,
        age: record.age,
        sex,
        location: record.location,
        conditions: record.conditions,
        health_profile,
        last_health_update: record
            .last_health_update
            .as_deref()
            .map(parse_timestamp)
            .transpose()?,
    })
}

/// Convert a profile update to the data model
pub fn convert_to_data_profile_update(request: &UpdateProfileRequest) -> ProfileUpdateRecord {
    ProfileUpdateRecord {
        age: request.age,
        sex: request.sex.map(|s| s.to_string()),
        location: request.location.clone(),
        conditions: request.conditions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::guideline::Sex;

    fn reminder_record() -> ReminderRecord {
        ReminderRecord {
            id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            user_id: "123e4567-e89b-12d3-a456-426614174001".to_string(),
            test_name: "Mammogram".to_string(),
            frequency: "every 2 years".to_string(),
            info_link: Some("https://example.org".to_string()),
            next_due: Some("2026-01-15".to_string()),
            last_check: Some("2024-01-15".to_string()),
            last_notified: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_convert_to_domain_reminder() {
        let reminder = convert_to_domain_reminder(reminder_record()).unwrap();
        assert_eq!(reminder.test_name, "Mammogram");
        assert_eq!(reminder.next_due, NaiveDate::from_ymd_opt(2026, 1, 15));
        assert_eq!(reminder.last_check, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(reminder.last_notified, None);
    }

    #[test]
    fn test_convert_to_domain_reminder_rejects_bad_dates() {
        let mut record = reminder_record();
        record.next_due = Some("15/01/2026".to_string());
        assert!(convert_to_domain_reminder(record).is_err());
    }

    #[test]
    fn test_convert_to_data_create_reminder_formats_dates() {
        let record = convert_to_data_create_reminder(
            Uuid::nil(),
            " Colonoscopy ",
            "every 5 years",
            None,
            NaiveDate::from_ymd_opt(2024, 3, 1),
            None,
        );
        assert_eq!(record.test_name, "Colonoscopy");
        assert_eq!(record.next_due.as_deref(), Some("2024-03-01"));
        assert_eq!(record.last_check, None);
    }

    #[test]
    fn test_convert_to_domain_user_tolerates_bad_health_data() {
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            username: "dana".to_string(),
            email: "dana@example.com".to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now().to_rfc3339(),
            age: Some(41),
            sex: Some("female".to_string()),
            location: None,
            conditions: None,
            health_data: Some(serde_json::json!({"lifestyle": "not an object"})),
            last_health_update: None,
        };

        let user = convert_to_domain_user(record).unwrap();
        assert_eq!(user.sex, Some(Sex::Female));
        assert!(user.health_profile.is_none());
        assert_eq!(user.demographics().map(|d| d.age), Some(41));
    }
}
