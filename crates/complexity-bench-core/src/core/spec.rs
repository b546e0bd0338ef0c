// crates/complexity-bench-core/src/core/spec.rs
// ============================================================================
// Module: Test Specifications
// Description: Declared benchmark tests and their run-scoped derivations.
// Purpose: Define the declaration shape that fingerprints and results copy.
// Dependencies: crate::core::{complexity, identifiers}, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`TestSpec`] is exactly what a config unit declares for one test id.
//! Unknown keys are kept in [`TestSpec::extra`] so they participate in the
//! test fingerprint and survive into the persisted record. A
//! [`TestDefinition`] adds the run-scoped derivations: contributing source
//! files, the source fingerprint, and the test fingerprint.
//!
//! ## Invariants
//! - `template` names both [`FIELD_SIZE`] and [`FIELD_TIME`] exactly once.
//! - `practical_lower_bound <= practical_upper_bound`, both finite.
//! - `extra` never shadows a key written by the result record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::complexity::ComplexityClass;
use crate::core::identifiers::Fingerprint;
use crate::core::identifiers::TestId;

// ============================================================================
// SECTION: Field Names
// ============================================================================

/// Template field carrying the problem size.
pub const FIELD_SIZE: &str = "n";
/// Template field carrying the elapsed time in nanoseconds.
pub const FIELD_TIME: &str = "time_ns";
/// Optional template field carrying the in-program repeat count.
pub const FIELD_MICRO_REPEATS: &str = "micro_repeats";

/// Keys owned by [`crate::core::record::ResultRecord`].
const RESERVED_KEYS: &[&str] = &["stats", "max_c", "test_hash", "source_files", "source_hash"];

// ============================================================================
// SECTION: Kinds and Policies
// ============================================================================

/// Result-shape kind of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// One timing line per run, positional fields named by the template.
    Simple,
}

impl TestKind {
    /// Returns the stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
        }
    }
}

/// Outlier removal policy applied per size group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierPolicy {
    /// Remove the largest value while it exceeds `median + 3 * stddev` of the
    /// other retained values.
    #[default]
    Sigma,
    /// Same loop, with the candidate included in its own reference set.
    SigmaInclusive,
    /// Drop one minimum and one maximum when more than two values exist.
    TrimExtremes,
}

// ============================================================================
// SECTION: Test Specification
// ============================================================================

/// Declared test as written in a config unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSpec {
    /// Result-shape kind.
    #[serde(rename = "type")]
    pub kind: TestKind,
    /// Ordered field names decoding one output line.
    pub template: Vec<String>,
    /// Declared growth rate used for normalization.
    pub complexity: ComplexityClass,
    /// Smallest size counted toward `max_c`.
    pub practical_lower_bound: f64,
    /// Largest size counted toward `max_c`.
    pub practical_upper_bound: f64,
    /// Optional cap on removed outliers per size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_outlier: Option<usize>,
    /// Optional outlier policy; [`OutlierPolicy::Sigma`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlier_policy: Option<OutlierPolicy>,
    /// Additional declared keys, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TestSpec {
    /// Returns the effective outlier policy.
    #[must_use]
    pub fn effective_outlier_policy(&self) -> OutlierPolicy {
        self.outlier_policy.unwrap_or_default()
    }

    /// Returns true when `n` lies inside the practical range.
    #[must_use]
    pub fn in_practical_range(&self, n: u64) -> bool {
        #[allow(clippy::cast_precision_loss, reason = "Bounds are compared approximately.")]
        let size = n as f64;
        self.practical_lower_bound <= size && size <= self.practical_upper_bound
    }

    /// Validates the declaration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError`] when validation fails.
    pub fn validate(&self) -> Result<(), SpecError> {
        let mut seen = BTreeSet::new();
        for field in &self.template {
            if field.trim().is_empty() {
                return Err(SpecError::EmptyField);
            }
            if !seen.insert(field.as_str()) {
                return Err(SpecError::DuplicateField(field.clone()));
            }
        }
        for required in [FIELD_SIZE, FIELD_TIME] {
            if !seen.contains(required) {
                return Err(SpecError::MissingField(required.to_string()));
            }
        }
        if !self.practical_lower_bound.is_finite() || !self.practical_upper_bound.is_finite() {
            return Err(SpecError::NonFiniteBound);
        }
        if self.practical_lower_bound > self.practical_upper_bound {
            return Err(SpecError::InvertedBounds {
                lower: self.practical_lower_bound,
                upper: self.practical_upper_bound,
            });
        }
        if let Some(key) = self.extra.keys().find(|key| RESERVED_KEYS.contains(&key.as_str())) {
            return Err(SpecError::ReservedKey(key.clone()));
        }
        Ok(())
    }
}

/// Validation errors for test declarations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    /// A required template field is absent.
    #[error("template is missing required field `{0}`")]
    MissingField(String),
    /// A template field appears more than once.
    #[error("template field `{0}` appears more than once")]
    DuplicateField(String),
    /// A template field name is blank.
    #[error("template contains an empty field name")]
    EmptyField,
    /// A practical bound is NaN or infinite.
    #[error("practical bounds must be finite")]
    NonFiniteBound,
    /// The practical range is empty.
    #[error("practical_lower_bound {lower} exceeds practical_upper_bound {upper}")]
    InvertedBounds {
        /// Declared lower bound.
        lower: f64,
        /// Declared upper bound.
        upper: f64,
    },
    /// A declared key collides with a result record key.
    #[error("test declares reserved key `{0}`")]
    ReservedKey(String),
}

// ============================================================================
// SECTION: Test Definitions
// ============================================================================

/// Run-scoped test with its derived fingerprints.
///
/// Rebuilt every invocation; never persisted directly.
#[derive(Debug, Clone, PartialEq)]
pub struct TestDefinition {
    /// Test identifier.
    pub id: TestId,
    /// Declared fields.
    pub spec: TestSpec,
    /// Display paths of every source that can emit samples for this test.
    pub source_files: Vec<String>,
    /// Fingerprint over the contributing sources.
    pub source_hash: Fingerprint,
    /// Fingerprint over the declaration plus `source_files` and `source_hash`.
    pub test_hash: Fingerprint,
}

/// Test definitions keyed by id.
pub type TestCatalog = BTreeMap<TestId, TestDefinition>;
