// crates/complexity-bench-core/src/interfaces/mod.rs
// ============================================================================
// Module: Complexity Bench Interfaces
// Description: Collaborator contracts for compiling and running benchmarks.
// Purpose: Keep toolchains and process handling outside the measurement engine.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The run session never compiles or spawns anything itself. It asks a
//! [`SourceBuilder`] for an executable per size point and a
//! [`ProgramRunner`] for that executable's output. Both calls block until the
//! collaborator finishes; no timeout is imposed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

use crate::core::plan::SizePoint;
use crate::core::plan::SourceUnit;
use crate::core::sample::SampleError;
use crate::core::spec::TestCatalog;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// One build-and-run point handed to collaborators.
#[derive(Debug, Clone, Copy)]
pub struct PointRequest<'a> {
    /// Source being swept.
    pub source: &'a SourceUnit,
    /// Size point being built.
    pub point: &'a SizePoint,
    /// Definitions of every planned test.
    pub tests: &'a TestCatalog,
}

/// Executable produced for one size point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    /// Path to the executable.
    pub path: PathBuf,
    /// Rendered build command, kept for diagnostics.
    pub command: String,
}

/// Captured output of one program run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramOutput {
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

// ============================================================================
// SECTION: Source Builder
// ============================================================================

/// Build failures.
///
/// # Invariants
/// - Variants carry the rendered command so failures are reproducible by hand.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The build command exited unsuccessfully.
    #[error("build command failed ({status}): {command}\n{stderr}")]
    CommandFailed {
        /// Rendered command.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured compiler diagnostics.
        stderr: String,
    },
    /// The build command succeeded but produced no executable.
    #[error("build produced no artifact at {path}: {command}")]
    MissingArtifact {
        /// Rendered command.
        command: String,
        /// Expected artifact path.
        path: String,
    },
    /// Preparing the build failed.
    #[error("build io error: {0}")]
    Io(String),
}

/// Produces an executable for one size point of a source.
pub trait SourceBuilder {
    /// Builds the source for `request.point`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] when compilation fails or yields no artifact.
    fn build(&mut self, request: &PointRequest<'_>) -> Result<BuildArtifact, BuildError>;
}

// ============================================================================
// SECTION: Program Runner
// ============================================================================

/// Run failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The program could not be started or waited on.
    #[error("failed to run {program}: {message}")]
    Spawn {
        /// Program path.
        program: String,
        /// Spawn failure.
        message: String,
    },
    /// The program exited unsuccessfully.
    #[error("{program} exited with {status}\n{stderr}")]
    NonZeroExit {
        /// Program path.
        program: String,
        /// Exit status description.
        status: String,
        /// Captured diagnostics.
        stderr: String,
    },
    /// The program printed a line that does not match its test template.
    #[error("malformed output line `{line}`: {error}")]
    MalformedOutput {
        /// Offending line.
        line: String,
        /// Decoding failure.
        #[source]
        error: SampleError,
    },
}

/// Runs a built executable and captures its output.
pub trait ProgramRunner {
    /// Runs `artifact` once for `request.point`.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] when the program cannot start or exits non-zero.
    fn run(
        &mut self,
        artifact: &BuildArtifact,
        request: &PointRequest<'_>,
    ) -> Result<ProgramOutput, RunError>;
}
