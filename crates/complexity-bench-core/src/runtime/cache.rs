// crates/complexity-bench-core/src/runtime/cache.rs
// ============================================================================
// Module: Result Cache
// Description: Per-test reuse decisions against a previous result store.
// Purpose: Reuse unchanged measurements and skip sources with nothing to redo.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! A record from the previous store is reused iff the previous profile hashes
//! equal to the active profile, the id is still planned, and the record's
//! `test_hash` equals the freshly derived one. Reused records move out of the
//! previous store by value and are never re-aggregated.
//!
//! A source is skipped entirely iff every test it contributes to is a hit.
//! Skip decisions are made before any build and never change final output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::fingerprint::profile_hash;
use crate::core::hashing::HashError;
use crate::core::identifiers::TestId;
use crate::core::plan::BenchPlan;
use crate::core::plan::SourceUnit;
use crate::core::record::Profile;
use crate::core::record::ResultRecord;
use crate::core::record::ResultStore;
use crate::core::spec::TestDefinition;

// ============================================================================
// SECTION: Cache Plan
// ============================================================================

/// Reuse decisions for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachePlan {
    /// Records reused verbatim, keyed by test id.
    hits: BTreeMap<TestId, ResultRecord>,
    /// Whether a previous store was supplied.
    had_previous: bool,
    /// Whether the previous profile matched the active one.
    profile_matches: bool,
    /// Records in the previous store.
    previous_records: usize,
}

impl CachePlan {
    /// Computes reuse decisions.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when a profile cannot be fingerprinted.
    pub fn compute(
        previous: Option<ResultStore>,
        profile: &Profile,
        plan: &BenchPlan,
    ) -> Result<Self, HashError> {
        let Some(previous) = previous else {
            return Ok(Self::default());
        };
        let previous_records = previous.results.len();
        let profile_matches = profile_hash(&previous.profile)? == profile_hash(profile)?;
        let mut hits = BTreeMap::new();
        if profile_matches {
            for (id, record) in previous.results {
                if plan.tests.get(&id).is_some_and(|definition| is_reusable(&record, definition)) {
                    hits.insert(id, record);
                }
            }
        }
        Ok(Self {
            hits,
            had_previous: true,
            profile_matches,
            previous_records,
        })
    }

    /// Returns true when `id` reuses a previous record.
    #[must_use]
    pub fn is_hit(&self, id: &TestId) -> bool {
        self.hits.contains_key(id)
    }

    /// Returns true when every test of `source` is a hit.
    #[must_use]
    pub fn skips(&self, source: &SourceUnit) -> bool {
        source.tests.iter().all(|id| self.is_hit(id))
    }

    /// Returns the reused records.
    #[must_use]
    pub const fn hits(&self) -> &BTreeMap<TestId, ResultRecord> {
        &self.hits
    }

    /// Consumes the plan, returning reused records.
    #[must_use]
    pub fn into_hits(self) -> BTreeMap<TestId, ResultRecord> {
        self.hits
    }

    /// Returns true when a previous store was supplied.
    #[must_use]
    pub const fn had_previous(&self) -> bool {
        self.had_previous
    }

    /// Returns true when the previous profile matched.
    #[must_use]
    pub const fn profile_matches(&self) -> bool {
        self.profile_matches
    }

    /// Returns the record count of the previous store.
    #[must_use]
    pub const fn previous_records(&self) -> usize {
        self.previous_records
    }
}

/// Returns true when a previous record was produced under the same fingerprint.
#[must_use]
pub fn is_reusable(record: &ResultRecord, definition: &TestDefinition) -> bool {
    record.test_hash == definition.test_hash
}
