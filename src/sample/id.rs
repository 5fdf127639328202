//! Canonical sample identifiers
//!
//! Identifiers arrive from callers as opaque strings and must be normalized
//! to the store's canonical form before they can appear in a match stage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifier string that could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sample ID '{input}': {reason}")]
pub struct InvalidSampleId {
    /// Caller-supplied text
    pub input: String,
    /// Parser diagnostic
    pub reason: String,
}

/// Canonical identifier of a sample.
///
/// Stored under `_id` as a lowercase hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleId(Uuid);

impl SampleId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Normalize caller-supplied text into a canonical identifier.
    ///
    /// Accepts hyphenated, simple, braced and URN UUID spellings in any
    /// case; surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Result<Self, InvalidSampleId> {
        Uuid::parse_str(input.trim())
            .map(Self)
            .map_err(|e| InvalidSampleId {
                input: input.to_string(),
                reason: e.to_string(),
            })
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Canonical string form as stored in documents
    pub fn to_canonical(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl Default for SampleId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for SampleId {
    type Err = InvalidSampleId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    #[test]
    fn test_parse_canonical() {
        let id = SampleId::parse(ID).unwrap();
        assert_eq!(id.to_canonical(), ID);
        assert_eq!(id.to_string(), ID);
    }

    #[test]
    fn test_parse_normalizes_spelling() {
        let canonical = SampleId::parse(ID).unwrap();

        let upper = SampleId::parse(&ID.to_uppercase()).unwrap();
        let simple = SampleId::parse(&ID.replace('-', "")).unwrap();
        let braced = SampleId::parse(&format!("{{{}}}", ID)).unwrap();
        let padded = SampleId::parse(&format!("  {}\n", ID)).unwrap();

        assert_eq!(upper, canonical);
        assert_eq!(simple, canonical);
        assert_eq!(braced, canonical);
        assert_eq!(padded, canonical);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let err = SampleId::parse("not-an-id").unwrap_err();
        assert_eq!(err.input, "not-an-id");
        assert!(err.to_string().contains("not-an-id"));

        assert!(SampleId::parse("").is_err());
        assert!(SampleId::parse("5f3c2a1b9d8e7f6a5b4c3d2e").is_err());
    }

    #[test]
    fn test_serde_is_canonical_string() {
        let id = SampleId::parse(&ID.to_uppercase()).unwrap();
        let value = serde_json::to_value(id).unwrap();
        assert_eq!(value, serde_json::json!(ID));

        let back: SampleId = serde_json::from_value(value).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_fresh_ids_differ() {
        assert_ne!(SampleId::new(), SampleId::new());
    }
}
