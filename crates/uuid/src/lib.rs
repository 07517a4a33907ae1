//! Opaque document identifiers.
//!
//! Records created in the staffing store receive a store-assigned key. To keep keys safe for
//! every backend (including one-file-per-document storage), keys use a *canonical* UUID
//! representation: **32 lowercase hexadecimal characters** (no hyphens).
//!
//! This crate provides [`DocumentId`], a small wrapper that *guarantees* the canonical format
//! once constructed.
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! Notes:
//! - This is the same value you would get from `Uuid::new_v4().simple().to_string()`.
//! - Externally supplied identifiers must already be canonical. Use [`DocumentId::parse`] to
//!   validate an input string.

mod id;

pub use id::DocumentId;

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
