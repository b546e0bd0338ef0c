// crates/complexity-bench-core/src/core/record.rs
// ============================================================================
// Module: Persisted Records
// Description: Aggregated statistics, result records, and the result store.
// Purpose: Define the snapshot written at the end of a run and read back as cache.
// Dependencies: crate::core::{complexity, identifiers, spec}, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ResultStore`] is the only persisted artifact. It holds the active
//! [`Profile`], an [`EnvironmentSnapshot`], and one [`ResultRecord`] per test
//! id in sorted order. Records are either produced fresh by aggregation or
//! moved by value from the previous store; nothing mutates them afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::Fingerprint;
use crate::core::identifiers::TestId;
use crate::core::spec::TestDefinition;
use crate::core::spec::TestSpec;

// ============================================================================
// SECTION: Profile
// ============================================================================

/// Named build configuration under which a sweep executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Human-readable profile name.
    pub name: String,
    /// Build command with `{output}`, `{source_path}`, and `{defines}` placeholders.
    #[serde(alias = "build_command_template")]
    pub build_command: String,
    /// Additional declared keys, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// ============================================================================
// SECTION: Environment
// ============================================================================

/// Host description captured at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    /// Operating system family.
    #[serde(default)]
    pub platform: String,
    /// CPU architecture.
    #[serde(default)]
    pub arch: String,
    /// Version of the harness that produced the store.
    #[serde(default)]
    pub harness_version: String,
    /// RFC 3339 UTC timestamp of the write.
    #[serde(default)]
    pub timestamp: String,
    /// Time-stamp counter frequency in GHz, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tsc_freq: Option<f64>,
    /// Captured output of host probes keyed by probe name.
    #[serde(default)]
    pub probes: BTreeMap<String, String>,
}

// ============================================================================
// SECTION: Aggregated Statistics
// ============================================================================

/// Statistics for one `(test, n)` pair.
///
/// # Invariants
/// - `raw_values` is ascending and holds every per-operation sample.
/// - `outliers` is ascending and `samples + outliers.len() == raw_values.len()`.
/// - `*_c` fields are `None` when the complexity value at `n` is not a
///   positive finite number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedStat {
    /// Problem size.
    pub n: u64,
    /// Mean of retained values.
    pub mean: f64,
    /// Sample standard deviation of retained values.
    pub stddev: f64,
    /// Complexity-normalized mean.
    pub mean_c: Option<f64>,
    /// Complexity-normalized standard deviation.
    pub stddev_c: Option<f64>,
    /// Smallest retained value.
    pub min: f64,
    /// Largest retained value.
    pub max: f64,
    /// Complexity-normalized minimum.
    pub min_c: Option<f64>,
    /// Complexity-normalized maximum.
    pub max_c: Option<f64>,
    /// Number of retained values.
    pub samples: usize,
    /// Complexity value at `n` that the `*_c` fields divide by.
    pub complexity: Option<f64>,
    /// All per-operation values before trimming.
    pub raw_values: Vec<f64>,
    /// Values removed as outliers.
    #[serde(default)]
    pub outliers: Vec<f64>,
}

// ============================================================================
// SECTION: Result Records
// ============================================================================

/// Persisted result for one test id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Declared fields, flattened to the top level.
    #[serde(flatten)]
    pub spec: TestSpec,
    /// Contributing source display paths.
    pub source_files: Vec<String>,
    /// Digest over contributing sources.
    pub source_hash: Fingerprint,
    /// Per-size statistics in ascending size order.
    pub stats: Vec<AggregatedStat>,
    /// Worst normalized mean inside the practical range, or zero.
    pub max_c: f64,
    /// Test fingerprint the record was produced under.
    pub test_hash: Fingerprint,
}

impl ResultRecord {
    /// Assembles a fresh record for a definition.
    #[must_use]
    pub fn fresh(definition: &TestDefinition, stats: Vec<AggregatedStat>, max_c: f64) -> Self {
        Self {
            spec: definition.spec.clone(),
            source_files: definition.source_files.clone(),
            source_hash: definition.source_hash.clone(),
            stats,
            max_c,
            test_hash: definition.test_hash.clone(),
        }
    }
}

// ============================================================================
// SECTION: Result Store
// ============================================================================

/// Full persisted snapshot of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultStore {
    /// Profile the run executed under.
    pub profile: Profile,
    /// Host description.
    #[serde(default)]
    pub environment: EnvironmentSnapshot,
    /// Records keyed by test id.
    pub results: BTreeMap<TestId, ResultRecord>,
}
