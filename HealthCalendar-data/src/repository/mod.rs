// Repository module structure
pub mod errors;
mod in_memory;
mod reminder;
mod storage;
mod user;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use reminder::{ReminderRepository, ReminderRepositoryTrait};
pub use user::{UserRepository, UserRepositoryTrait};

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    pub use super::reminder::tests::{sample_reminder, MockReminderRepository};
    pub use super::user::tests::{sample_user, MockUserRepository};
}
