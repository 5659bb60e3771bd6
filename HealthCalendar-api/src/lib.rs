// Health Calendar API lib.rs
//
// HTTP surface of the Health Calendar application: configuration, shared
// state, routes and handlers, and OpenAPI documentation.

// Public modules
pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;
pub mod telemetry;
