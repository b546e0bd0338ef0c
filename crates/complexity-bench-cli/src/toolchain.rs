// crates/complexity-bench-cli/src/toolchain.rs
// ============================================================================
// Module: Toolchain Collaborators
// Description: Shell-driven source builder and blocking process runner.
// Purpose: Compile each size point with the active profile and run it.
// Dependencies: complexity-bench-core, tempfile
// ============================================================================

//! ## Overview
//! [`ToolchainBuilder`] copies the source into a private build directory,
//! inlines the prelude, renders the profile's build command, and runs it
//! through the platform shell. [`ProcessRunner`] spawns the artifact and
//! waits for it without a timeout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use complexity_bench_core::BuildArtifact;
use complexity_bench_core::BuildError;
use complexity_bench_core::PointRequest;
use complexity_bench_core::ProgramOutput;
use complexity_bench_core::ProgramRunner;
use complexity_bench_core::RunError;
use complexity_bench_core::SourceBuilder;
use tempfile::TempDir;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File stem of the copied source.
const SOURCE_STEM: &str = "source";
/// File stem of the built executable.
const OUTPUT_STEM: &str = "output";
/// Extension used when the source has none.
const DEFAULT_EXTENSION: &str = "cpp";

// ============================================================================
// SECTION: Prelude
// ============================================================================

/// Shared header inlined into every source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prelude {
    /// Include directive replaced by the content.
    directive: String,
    /// Header text.
    content: String,
}

impl Prelude {
    /// Reads a prelude; sources include it by file name.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
        Ok(Self::new(&name, content))
    }

    /// Creates a prelude included as `#include "<name>"`.
    #[must_use]
    pub fn new(name: &str, content: String) -> Self {
        Self {
            directive: format!("#include \"{name}\""),
            content,
        }
    }

    /// Replaces the include directive in `source`.
    #[must_use]
    pub fn inline(&self, source: &str) -> String {
        source.replace(&self.directive, &self.content)
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds size points with a profile's shell command.
#[derive(Debug)]
pub struct ToolchainBuilder {
    /// Private build directory, removed on drop.
    workdir: TempDir,
    /// Command template with `{output}`, `{source_path}`, `{defines}`.
    build_command: String,
    /// Optional shared header.
    prelude: Option<Prelude>,
    /// Defines applied to every point; point defines take precedence.
    session_defines: BTreeMap<String, String>,
}

impl ToolchainBuilder {
    /// Creates a builder with a fresh build directory.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] when the directory cannot be created.
    pub fn new(build_command: impl Into<String>) -> Result<Self, BuildError> {
        let workdir = tempfile::Builder::new()
            .prefix("complexity-bench-")
            .tempdir()
            .map_err(|err| BuildError::Io(err.to_string()))?;
        Ok(Self {
            workdir,
            build_command: build_command.into(),
            prelude: None,
            session_defines: BTreeMap::new(),
        })
    }

    /// Inlines `prelude` into every source.
    #[must_use]
    pub fn with_prelude(mut self, prelude: Option<Prelude>) -> Self {
        self.prelude = prelude;
        self
    }

    /// Adds defines applied to every build.
    #[must_use]
    pub fn with_session_defines(mut self, defines: BTreeMap<String, String>) -> Self {
        self.session_defines = defines;
        self
    }

    /// Returns the build directory.
    #[must_use]
    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// Renders the command for one build.
    fn render(&self, output: &Path, source: &Path, defines: &BTreeMap<String, String>) -> String {
        let mut merged = self.session_defines.clone();
        merged.extend(defines.iter().map(|(key, value)| (key.clone(), value.clone())));
        let flags: Vec<String> =
            merged.iter().map(|(key, value)| format!("-D{key}={value}")).collect();
        self.build_command
            .replace("{output}", &output.to_string_lossy())
            .replace("{source_path}", &source.to_string_lossy())
            .replace("{defines}", &flags.join(" "))
    }
}

impl SourceBuilder for ToolchainBuilder {
    fn build(&mut self, request: &PointRequest<'_>) -> Result<BuildArtifact, BuildError> {
        let text = fs::read_to_string(&request.source.path)
            .map_err(|err| BuildError::Io(format!("{}: {err}", request.source.path.display())))?;
        let text = match &self.prelude {
            Some(prelude) => prelude.inline(&text),
            None => text,
        };
        let extension = request
            .source
            .path
            .extension()
            .map_or_else(|| DEFAULT_EXTENSION.to_string(), |ext| ext.to_string_lossy().into_owned());
        let source_path = self.workdir.path().join(format!("{SOURCE_STEM}.{extension}"));
        let output_path: PathBuf =
            self.workdir.path().join(format!("{OUTPUT_STEM}{}", std::env::consts::EXE_SUFFIX));
        fs::write(&source_path, text).map_err(|err| BuildError::Io(err.to_string()))?;
        if output_path.exists() {
            fs::remove_file(&output_path).map_err(|err| BuildError::Io(err.to_string()))?;
        }

        let command = self.render(&output_path, &source_path, &request.point.defines);
        let output = shell(&command).map_err(|err| BuildError::Io(format!("{command}: {err}")))?;
        if !output.status.success() {
            return Err(BuildError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        if !output_path.exists() {
            return Err(BuildError::MissingArtifact {
                command,
                path: output_path.display().to_string(),
            });
        }
        Ok(BuildArtifact {
            path: output_path,
            command,
        })
    }
}

/// Runs `command` through the platform shell.
fn shell(command: &str) -> std::io::Result<Output> {
    if cfg!(windows) {
        Command::new("cmd").args(["/C", command]).output()
    } else {
        Command::new("sh").args(["-c", command]).output()
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Spawns artifacts and captures their output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProgramRunner for ProcessRunner {
    fn run(
        &mut self,
        artifact: &BuildArtifact,
        _request: &PointRequest<'_>,
    ) -> Result<ProgramOutput, RunError> {
        let program = artifact.path.display().to_string();
        let output = Command::new(&artifact.path).output().map_err(|err| RunError::Spawn {
            program: program.clone(),
            message: err.to_string(),
        })?;
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(RunError::NonZeroExit {
                program,
                status: output.status.to_string(),
                stderr,
            });
        }
        Ok(ProgramOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
