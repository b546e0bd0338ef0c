// crates/complexity-bench-cli/src/lib.rs
// ============================================================================
// Module: Complexity Bench CLI Library
// Description: Collaborators and helpers behind the `complexity-bench` binary.
// Purpose: Keep toolchain, probe, and rendering logic testable outside main.
// Dependencies: complexity-bench-core, complexity-bench-config
// ============================================================================

//! ## Overview
//! The binary wires discovery, the result cache, and the run session to the
//! collaborators defined here: a shell-driven toolchain builder, a process
//! runner, a dry-run synthesizer, an environment probe, a results index, and
//! a console renderer for run events.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod console;
pub mod environment;
pub mod i18n;
pub mod index;
pub mod synthetic;
pub mod toolchain;
