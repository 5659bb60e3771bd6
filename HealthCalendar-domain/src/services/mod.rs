// Domain services
// Pure computations (risk, scheduler, insights, calendar, guideline filter)
// and the repository-backed services built on them.

pub mod calendar;
pub mod guidelines;
pub mod insights;
pub mod notifications;
pub mod profile;
pub mod reminders;
pub mod risk_assessment;
pub mod scheduler;
pub mod users;

// Re-export service traits and factory functions
pub use calendar::{build_month, CalendarError};
pub use guidelines::{applicable_guidelines, GuidelineCatalog, GuidelineError, GuidelineUpdater};
pub use notifications::{LogNotifier, ReminderDispatcher, ReminderNotifier};
pub use profile::{create_profile_service, evaluate_profile, ProfileServiceError, ProfileServiceTrait};
pub use reminders::{create_reminder_service, ReminderServiceError, ReminderServiceTrait};
pub use risk_assessment::assess;
pub use scheduler::next_due_date;
pub use users::{create_user_service, UserServiceError, UserServiceTrait};

/// Flatten validator errors into "field: message" pairs joined by "; ".
///
/// Fields are sorted so the message is stable.
pub fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect::<Vec<String>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "Name too short"))]
        name: String,
        #[validate(range(max = 10))]
        count: u32,
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let errors = Sample {
            name: "ab".to_string(),
            count: 11,
        }
        .validate()
        .unwrap_err();

        assert_eq!(validation_message(&errors), "count: Invalid count; name: Name too short");
    }
}
