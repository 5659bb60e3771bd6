// Storage models
pub mod user;
pub mod reminder;

pub use user::{CreateUserRecord, ProfileUpdateRecord, UserRecord};
pub use reminder::{CreateReminderRecord, ReminderRecord};
