// Public entities for the Health Calendar API
// Domain entities are serialized directly; this module holds the API-only shapes

// Common entities for error handling
pub mod common;

pub use common::ErrorResponse;
