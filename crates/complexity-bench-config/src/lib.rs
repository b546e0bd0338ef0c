// crates/complexity-bench-config/src/lib.rs
// ============================================================================
// Module: Complexity Bench Config Library
// Description: Config-unit discovery, size ladders, and build profiles.
// Purpose: Turn on-disk benchmark declarations into a validated run plan.
// Dependencies: complexity-bench-core, regex, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `complexity-bench-config` reads config units (`*.json` files declaring
//! sources and tests), expands each source's size input into size points,
//! fingerprints sources, and produces a [`complexity_bench_core::BenchPlan`].
//! It also loads the ordered profile catalog. Every failure is a
//! [`ConfigError`] raised before anything is compiled.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod discovery;
pub mod error;
pub mod generator;
pub mod paths;
pub mod profiles;
pub mod unit;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use discovery::DiscoveredPlan;
pub use discovery::DiscoveryOptions;
pub use discovery::TestFilter;
pub use discovery::TestOverride;
pub use discovery::discover;
pub use error::ConfigError;
pub use generator::GeneratorParams;
pub use profiles::DEFAULT_PROFILES_NAME;
pub use profiles::PROFILES_ENV_VAR;
pub use profiles::ProfileCatalog;
pub use unit::InputSpec;
pub use unit::SourceEntry;
