//! Due-date calculation for recurring reminders.
//!
//! Two approximations are offered. [`next_due_date`] advances on the
//! calendar for the fixed vocabulary of labels. [`completion_offset_days`]
//! maps any label to a fixed number of days by substring. Marking a
//! reminder completed uses the calendar when it can and the day offset
//! otherwise, see [`reschedule_after_completion`].

use chrono::{Days, Months, NaiveDate};

use crate::entities::frequency::{CompletionInterval, Frequency};

/// Next due date on the calendar, `None` for labels outside the vocabulary.
///
/// Month and year steps clamp to the last day of a shorter month, so
/// Jan 31 + 1 month is Feb 29 in 2024 and Feb 29 + 1 year is Feb 28.
pub fn next_due_date(last_check: NaiveDate, label: &str) -> Option<NaiveDate> {
    advance(last_check, &Frequency::parse(label))
}

/// Advance a date by one period of a parsed frequency
pub fn advance(date: NaiveDate, frequency: &Frequency) -> Option<NaiveDate> {
    match frequency {
        Frequency::Daily => date.checked_add_days(Days::new(1)),
        Frequency::Weekly => date.checked_add_days(Days::new(7)),
        Frequency::Monthly => date.checked_add_months(Months::new(1)),
        Frequency::Yearly => date.checked_add_months(Months::new(12)),
        Frequency::EveryTwoYears => date.checked_add_months(Months::new(24)),
        Frequency::EveryThreeYears => date.checked_add_months(Months::new(36)),
        Frequency::EveryFiveYears => date.checked_add_months(Months::new(60)),
        Frequency::Unrecognized(_) => None,
    }
}

/// Fixed day offset for a label, 365 when nothing matches
pub fn completion_offset_days(label: &str) -> i64 {
    CompletionInterval::classify(label).days()
}

/// Due date after a check done on `completed_on`.
///
/// Recognized labels follow the calendar, anything else falls back to the
/// fixed day offset so a completed reminder always gets a new due date.
/// A "monthly" completion therefore moves by one calendar month, not the
/// 30 days [`completion_offset_days`] reports for it.
pub fn reschedule_after_completion(completed_on: NaiveDate, label: &str) -> NaiveDate {
    next_due_date(completed_on, label).unwrap_or_else(|| {
        completed_on + chrono::Duration::days(completion_offset_days(label))
    })
}
