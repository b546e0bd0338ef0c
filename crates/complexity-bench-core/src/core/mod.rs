// crates/complexity-bench-core/src/core/mod.rs
// ============================================================================
// Module: Complexity Bench Core Types
// Description: Test declarations, fingerprints, samples, and persisted records.
// Purpose: Provide stable, serializable types shared by config, runtime, and CLI.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Core types describe what a run measures and what it persists. They carry
//! no I/O; the runtime and outer crates move them between disk and
//! collaborators.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod complexity;
pub mod fingerprint;
pub mod hashing;
pub mod identifiers;
pub mod plan;
pub mod record;
pub mod sample;
pub mod spec;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use complexity::ComplexityClass;
pub use complexity::UnknownComplexity;
pub use fingerprint::SourceFingerprint;
pub use fingerprint::profile_hash;
pub use fingerprint::source_hash;
pub use fingerprint::test_hash;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::Fingerprint;
pub use identifiers::TestId;
pub use plan::BenchPlan;
pub use plan::SizePoint;
pub use plan::SourceUnit;
pub use record::AggregatedStat;
pub use record::EnvironmentSnapshot;
pub use record::Profile;
pub use record::ResultRecord;
pub use record::ResultStore;
pub use sample::Sample;
pub use sample::SampleError;
pub use sample::split_output_line;
pub use spec::OutlierPolicy;
pub use spec::SpecError;
pub use spec::TestCatalog;
pub use spec::TestDefinition;
pub use spec::TestKind;
pub use spec::TestSpec;
