//! Implementation of the canonical document identifier.

use crate::{UuidError, UuidResult};
use std::fmt;
use uuid::Uuid;

/// Canonical document key (32 lowercase hex characters, no hyphens).
///
/// Once constructed, the contained UUID is guaranteed to render in canonical form.
///
/// # Construction
/// - [`DocumentId::new`] generates a fresh random key (for newly created documents).
/// - [`DocumentId::parse`] validates an externally supplied key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(Uuid);

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentId {
    /// Generates a new random identifier (RFC 4122 version 4).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses a key that must already be in canonical form.
    ///
    /// Hyphenated or uppercase forms are rejected rather than normalised.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "document id must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(e.to_string()))
    }

    /// Returns true if `input` is in canonical form.
    ///
    /// Purely syntactic: exactly 32 bytes of `0-9` / `a-f`.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_canonical_id() {
        let id = DocumentId::new();
        let canonical = id.to_string();

        assert_eq!(canonical.len(), 32);
        assert!(DocumentId::is_canonical(&canonical));
    }

    #[test]
    fn test_new_ids_are_distinct() {
        assert_ne!(DocumentId::new(), DocumentId::new());
    }

    #[test]
    fn test_parse_valid_canonical_id() {
        let canonical = "550e8400e29b41d4a716446655440000";
        let id = DocumentId::parse(canonical).expect("canonical id should parse");

        assert_eq!(id.to_string(), canonical);
    }

    #[test]
    fn test_parse_rejects_hyphenated_id() {
        let err = DocumentId::parse("550e8400-e29b-41d4-a716-446655440000")
            .expect_err("hyphenated form should be rejected");

        assert!(matches!(err, UuidError::InvalidInput(msg) if msg.contains("32 lowercase hex")));
    }

    #[test]
    fn test_parse_rejects_uppercase_and_wrong_length() {
        assert!(DocumentId::parse("550E8400E29B41D4A716446655440000").is_err());
        assert!(DocumentId::parse("550e8400e29b41d4a71644665544000").is_err());
        assert!(DocumentId::parse("550e8400e29b41d4a7164466554400000").is_err());
        assert!(DocumentId::parse("").is_err());
    }
}
