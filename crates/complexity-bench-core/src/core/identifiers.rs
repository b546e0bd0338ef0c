// crates/complexity-bench-core/src/core/identifiers.rs
// ============================================================================
// Module: Complexity Bench Identifiers
// Description: Opaque string identifiers for tests and fingerprints.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers serialize as plain strings. Test ids are dotted names such as
//! `misc.sort.int_random` chosen by benchmark authors; fingerprints are hex
//! digests produced by [`crate::core::fingerprint`]. Neither wrapper validates
//! its content; validation happens at config boundaries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashDigest;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Logical test identifier, unique within a run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(String);

impl TestId {
    /// Creates a new test identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TestId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TestId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Hex fingerprint persisted alongside results for cache comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Creates a fingerprint from an already-rendered hex string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the fingerprint as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<HashDigest> for Fingerprint {
    fn from(value: HashDigest) -> Self {
        Self(value.value)
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
