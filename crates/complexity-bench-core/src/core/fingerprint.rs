// crates/complexity-bench-core/src/core/fingerprint.rs
// ============================================================================
// Module: Fingerprints
// Description: Source, test, and profile fingerprints for cache validity.
// Purpose: Scope cache invalidation to exactly the tests a change can affect.
// Dependencies: crate::core::{hashing, record, spec}, serde
// ============================================================================

//! ## Overview
//! Three fingerprints drive reuse decisions:
//! - [`source_hash`] digests, in config order, the pair
//!   `(content digest, declared-config digest)` of every contributing source.
//! - [`test_hash`] digests a test declaration with `source_files` and
//!   `source_hash` injected, computed once per run before execution.
//! - [`profile_hash`] digests the active build profile.
//!
//! Fingerprints are test scoped: editing one source only moves the
//! fingerprints of tests that source can emit samples for.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::hashing::hash_source_bytes;
use crate::core::identifiers::Fingerprint;
use crate::core::identifiers::TestId;
use crate::core::record::Profile;
use crate::core::spec::TestDefinition;
use crate::core::spec::TestSpec;

// ============================================================================
// SECTION: Source Fingerprints
// ============================================================================

/// Content and configuration digests of one contributing source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFingerprint {
    /// Digest of the file bytes with carriage returns removed.
    pub content: HashDigest,
    /// Digest of the source's declared config object.
    pub config: HashDigest,
}

impl SourceFingerprint {
    /// Fingerprints source bytes together with their declared config object.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when the declaration cannot be canonicalized.
    pub fn compute(bytes: &[u8], declared: &Value) -> Result<Self, HashError> {
        Ok(Self {
            content: hash_source_bytes(DEFAULT_HASH_ALGORITHM, bytes),
            config: hash_canonical_json(DEFAULT_HASH_ALGORITHM, declared)?,
        })
    }
}

impl Serialize for SourceFingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.content.value.as_str(), self.config.value.as_str()].serialize(serializer)
    }
}

/// Digests the ordered source fingerprints contributing to one test.
///
/// # Errors
///
/// Returns [`HashError`] when canonicalization fails.
pub fn source_hash(entries: &[SourceFingerprint]) -> Result<Fingerprint, HashError> {
    Ok(hash_canonical_json(DEFAULT_HASH_ALGORITHM, entries)?.into())
}

// ============================================================================
// SECTION: Test Fingerprints
// ============================================================================

/// Hashed view of a test: declared fields plus injected source identity.
#[derive(Serialize)]
struct HashedTest<'a> {
    /// Declared fields, flattened to the top level.
    #[serde(flatten)]
    spec: &'a TestSpec,
    /// Contributing source display paths.
    source_files: &'a [String],
    /// Digest over contributing sources.
    source_hash: &'a Fingerprint,
}

/// Digests a test declaration with its source identity injected.
///
/// # Errors
///
/// Returns [`HashError`] when canonicalization fails.
pub fn test_hash(
    spec: &TestSpec,
    source_files: &[String],
    source_hash: &Fingerprint,
) -> Result<Fingerprint, HashError> {
    let hashed = HashedTest {
        spec,
        source_files,
        source_hash,
    };
    Ok(hash_canonical_json(DEFAULT_HASH_ALGORITHM, &hashed)?.into())
}

/// Digests the declared fields of a build profile.
///
/// # Errors
///
/// Returns [`HashError`] when canonicalization fails.
pub fn profile_hash(profile: &Profile) -> Result<Fingerprint, HashError> {
    Ok(hash_canonical_json(DEFAULT_HASH_ALGORITHM, profile)?.into())
}

// ============================================================================
// SECTION: Definitions
// ============================================================================

impl TestDefinition {
    /// Derives a run-scoped definition from a declaration and its sources.
    ///
    /// `sources` pairs each contributing display path with its fingerprint,
    /// in config order.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when canonicalization fails.
    pub fn derive(
        id: TestId,
        spec: TestSpec,
        sources: &[(String, SourceFingerprint)],
    ) -> Result<Self, HashError> {
        let source_files: Vec<String> = sources.iter().map(|(path, _)| path.clone()).collect();
        let fingerprints: Vec<SourceFingerprint> =
            sources.iter().map(|(_, fingerprint)| fingerprint.clone()).collect();
        let source_hash = source_hash(&fingerprints)?;
        let test_hash = test_hash(&spec, &source_files, &source_hash)?;
        Ok(Self {
            id,
            spec,
            source_files,
            source_hash,
            test_hash,
        })
    }
}
