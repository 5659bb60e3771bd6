pub mod assessment;
pub mod auth;
pub mod calendar;
pub mod guidelines;
pub mod health;
pub mod profile;
pub mod reminders;
pub mod schedule;

// Re-export handlers for easier imports
pub use health::health_check;
