// Health Calendar Domain
// Business logic for the Health Calendar application: risk assessment,
// recurrence scheduling and guideline filtering, plus the services built on them

// Services that implement business logic
pub mod services;

// Authentication
pub mod auth;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the database module from the data crate for convenience
pub use health_calendar_data::database;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
