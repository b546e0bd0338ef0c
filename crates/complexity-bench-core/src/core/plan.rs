// crates/complexity-bench-core/src/core/plan.rs
// ============================================================================
// Module: Run Plan
// Description: Sources, size points, and test definitions for one run.
// Purpose: Carry the validated, fingerprinted inputs a session executes.
// Dependencies: crate::core::{identifiers, spec}
// ============================================================================

//! ## Overview
//! A [`BenchPlan`] is produced by config loading and consumed by the run
//! session. Sizes are an opaque ordered sequence of [`SizePoint`]s; the core
//! never decides which sizes exist.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::core::identifiers::TestId;
use crate::core::spec::TestCatalog;

// ============================================================================
// SECTION: Plan Types
// ============================================================================

/// One compile-and-run point of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizePoint {
    /// Problem size.
    pub n: u64,
    /// Preprocessor defines for this build.
    pub defines: BTreeMap<String, String>,
}

/// One source file with the sizes it is swept over.
///
/// # Invariants
/// - `tests` lists every test id the source can emit samples for.
/// - `sizes` is in ascending `n` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Resolved file path.
    pub path: PathBuf,
    /// Display path recorded in `source_files`.
    pub display: String,
    /// Runs per size point.
    pub repeats: u32,
    /// Tests this source contributes to.
    pub tests: Vec<TestId>,
    /// Size points in sweep order.
    pub sizes: Vec<SizePoint>,
}

/// Validated inputs for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchPlan {
    /// Sources in declaration order.
    pub sources: Vec<SourceUnit>,
    /// Test definitions keyed by id.
    pub tests: TestCatalog,
}

impl BenchPlan {
    /// Keeps only the tests accepted by `keep`, dropping sources left empty.
    pub fn retain_tests(&mut self, mut keep: impl FnMut(&TestId) -> bool) {
        self.tests.retain(|id, _| keep(id));
        let tests = &self.tests;
        for source in &mut self.sources {
            source.tests.retain(|id| tests.contains_key(id));
        }
        self.sources.retain(|source| !source.tests.is_empty());
    }
}
