// crates/complexity-bench-cli/src/synthetic.rs
// ============================================================================
// Module: Dry-Run Collaborators
// Description: Builder and runner that fabricate benchmark output.
// Purpose: Exercise discovery, caching, and aggregation without a toolchain.
// Dependencies: complexity-bench-core, rand
// ============================================================================

//! ## Overview
//! [`SyntheticBuilder`] compiles nothing and [`SyntheticRunner`] spawns
//! nothing. The runner prints one line per test of the source, with the
//! size in the `n` field and seeded uniform integers everywhere else, so two
//! dry runs over the same plan produce the same store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use complexity_bench_core::BuildArtifact;
use complexity_bench_core::BuildError;
use complexity_bench_core::PointRequest;
use complexity_bench_core::ProgramOutput;
use complexity_bench_core::ProgramRunner;
use complexity_bench_core::RunError;
use complexity_bench_core::SourceBuilder;
use complexity_bench_core::core::spec::FIELD_SIZE;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Seed used for every dry run.
pub const DRY_RUN_SEED: u64 = 42;
/// Smallest fabricated value.
const MIN_VALUE: u64 = 1_000;
/// Largest fabricated value.
const MAX_VALUE: u64 = 100_000;

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder that only describes what it would compile.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticBuilder;

impl SourceBuilder for SyntheticBuilder {
    fn build(&mut self, request: &PointRequest<'_>) -> Result<BuildArtifact, BuildError> {
        let defines: Vec<String> =
            request.point.defines.iter().map(|(key, value)| format!("-D{key}={value}")).collect();
        Ok(BuildArtifact {
            path: request.source.path.clone(),
            command: format!("dry-run {} {}", request.source.display, defines.join(" ")),
        })
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runner that fabricates output lines from a seeded generator.
#[derive(Debug)]
pub struct SyntheticRunner {
    /// Value generator.
    rng: StdRng,
}

impl SyntheticRunner {
    /// Creates a runner seeded with [`DRY_RUN_SEED`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DRY_RUN_SEED)
    }

    /// Creates a runner with an explicit seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SyntheticRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramRunner for SyntheticRunner {
    fn run(
        &mut self,
        _artifact: &BuildArtifact,
        request: &PointRequest<'_>,
    ) -> Result<ProgramOutput, RunError> {
        let mut stdout = String::new();
        for id in &request.source.tests {
            let Some(definition) = request.tests.get(id) else {
                continue;
            };
            let _ = write!(stdout, "{id}:\t");
            let values: Vec<String> = definition
                .spec
                .template
                .iter()
                .map(|field| {
                    if field == FIELD_SIZE {
                        request.point.n.to_string()
                    } else {
                        self.rng.gen_range(MIN_VALUE ..= MAX_VALUE).to_string()
                    }
                })
                .collect();
            stdout.push_str(&values.join(" "));
            stdout.push('\n');
        }
        Ok(ProgramOutput {
            stdout,
            stderr: String::new(),
        })
    }
}
