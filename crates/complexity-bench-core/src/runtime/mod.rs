// crates/complexity-bench-core/src/runtime/mod.rs
// ============================================================================
// Module: Complexity Bench Runtime
// Description: Aggregation, caching, persistence, and the run session.
// Purpose: Execute a benchmark plan against collaborators and persist results.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules turn a validated [`crate::core::BenchPlan`] into a
//! [`crate::core::ResultStore`]. The session is strictly sequential; every
//! other module is a pure function of its inputs except the store writer.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod aggregate;
pub mod cache;
pub mod cancel;
pub mod events;
pub mod registry;
pub mod session;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use aggregate::Aggregation;
pub use aggregate::AggregationNote;
pub use aggregate::aggregate_samples;
pub use cache::CachePlan;
pub use cancel::CancellationToken;
pub use events::FanoutEventSink;
pub use events::FileEventSink;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use events::RunEvent;
pub use events::RunEventSink;
pub use events::StderrEventSink;
pub use registry::KindHandler;
pub use registry::KindRegistry;
pub use registry::KindRegistryError;
pub use registry::SimpleKind;
pub use session::BenchSession;
pub use session::SessionError;
pub use session::SessionOptions;
pub use session::SessionOutcome;
pub use store::StoreError;
pub use store::assemble_store;
pub use store::load_store;
pub use store::write_atomic;
pub use store::write_store;
