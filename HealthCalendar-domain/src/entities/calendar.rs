use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::reminder::Reminder;

/// Year and month pair used for navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

/// One day cell of the month grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    /// Reminders due on this day
    pub reminders: Vec<Reminder>,
}

/// Month grid with Sunday-first weeks.
///
/// Each week has exactly seven cells; `None` pads days outside the month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    /// e.g. "January 2024"
    pub title: String,
    pub weeks: Vec<Vec<Option<CalendarDay>>>,
    pub previous: MonthRef,
    pub next: MonthRef,
}
