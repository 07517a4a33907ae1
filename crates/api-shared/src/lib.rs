//! # API Shared
//!
//! Shared request and response types for the staffing APIs.
//!
//! Contains:
//! - JSON DTOs with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//!
//! The DTOs carry plain strings and booleans; `api-rest` converts them to and from the
//! validated `staffing-core` types.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
