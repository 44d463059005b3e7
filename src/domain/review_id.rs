//! Type-safe review identifier.
//!
//! [`ReviewId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that review
//! identifiers cannot be confused with user or place identifiers, which are
//! plain strings chosen by the caller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier for a review.
///
/// Generated once when the review is created and never reused, even after the
/// review is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(uuid::Uuid);

impl ReviewId {
    /// Creates a new random `ReviewId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `ReviewId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Parses a client-supplied token. Returns `None` for anything that is not
    /// a well-formed id; such a token can never name a stored review.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        token.parse().ok()
    }
}

impl Default for ReviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReviewId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

impl From<uuid::Uuid> for ReviewId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ReviewId> for uuid::Uuid {
    fn from(id: ReviewId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        let a = ReviewId::new();
        let b = ReviewId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_parses_back() {
        let id = ReviewId::new();
        let Some(parsed) = ReviewId::parse(&id.to_string()) else {
            panic!("display output should parse");
        };
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(ReviewId::parse("not-a-review").is_none());
        assert!(ReviewId::parse("").is_none());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ReviewId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{id}\""));
    }
}
