// crates/complexity-bench-core/src/lib.rs
// ============================================================================
// Module: Complexity Bench Core Library
// Description: Public API surface for the measurement-caching engine.
// Purpose: Expose core types, collaborator interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Complexity bench core decides which benchmark measurements can be reused
//! across runs and turns fresh timing samples into outlier-trimmed,
//! complexity-normalized statistics. Compilation and process handling stay
//! behind the [`SourceBuilder`] and [`ProgramRunner`] interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::BuildArtifact;
pub use interfaces::BuildError;
pub use interfaces::PointRequest;
pub use interfaces::ProgramOutput;
pub use interfaces::ProgramRunner;
pub use interfaces::RunError;
pub use interfaces::SourceBuilder;
pub use runtime::BenchSession;
pub use runtime::CachePlan;
pub use runtime::CancellationToken;
pub use runtime::RunEvent;
pub use runtime::RunEventSink;
pub use runtime::SessionError;
pub use runtime::SessionOptions;
pub use runtime::SessionOutcome;
pub use runtime::StoreError;
