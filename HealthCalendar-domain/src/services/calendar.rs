//! Month view of a user's reminders.

use chrono::{Datelike, Months, NaiveDate};
use thiserror::Error;

use crate::entities::calendar::{CalendarDay, CalendarMonth, MonthRef};
use crate::entities::reminder::Reminder;

/// Calendar errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Build the Sunday-first month grid for `year`/`month`.
///
/// Every day cell carries the reminders whose `next_due` falls on it.
pub fn build_month(year: i32, month: u32, reminders: &[Reminder]) -> Result<CalendarMonth, CalendarError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidMonth { year, month })?;
    let next_first = first
        .checked_add_months(Months::new(1))
        .ok_or(CalendarError::InvalidMonth { year, month })?;
    let previous_first = first
        .checked_sub_months(Months::new(1))
        .ok_or(CalendarError::InvalidMonth { year, month })?;

    let mut weeks = Vec::new();
    let mut week: Vec<Option<CalendarDay>> = vec![None; first.weekday().num_days_from_sunday() as usize];

    let mut date = first;
    while date < next_first {
        week.push(Some(CalendarDay {
            date,
            day: date.day(),
            reminders: reminders
                .iter()
                .filter(|r| r.next_due == Some(date))
                .cloned()
                .collect(),
        }));

        if week.len() == 7 {
            weeks.push(std::mem::take(&mut week));
        }

        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    if !week.is_empty() {
        week.resize(7, None);
        weeks.push(week);
    }

    Ok(CalendarMonth {
        year,
        month,
        title: first.format("%B %Y").to_string(),
        weeks,
        previous: month_ref(previous_first),
        next: month_ref(next_first),
    })
}

fn month_ref(date: NaiveDate) -> MonthRef {
    MonthRef {
        year: date.year(),
        month: date.month(),
    }
}
