// crates/complexity-bench-config/src/discovery.rs
// ============================================================================
// Module: Config Discovery
// Description: Walks config units and assembles a fingerprinted run plan.
// Purpose: Produce the sources, sizes, and test definitions a session runs.
// Dependencies: complexity-bench-core, regex, serde_json
// ============================================================================

//! ## Overview
//! [`discover`] accepts a single unit file or a directory. Directories are
//! walked recursively in sorted order so the plan is deterministic. Every
//! source of a unit feeds every (filtered) test of that unit, so a test's
//! fingerprint covers exactly that unit's sources plus the optional prelude.
//!
//! Duplicate test ids across units are rejected unless overrides are
//! allowed, in which case the later unit wins and the earlier unit's
//! sources stop feeding the id.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use complexity_bench_core::BenchPlan;
use complexity_bench_core::SourceFingerprint;
use complexity_bench_core::SourceUnit;
use complexity_bench_core::TestDefinition;
use complexity_bench_core::TestId;
use regex::Regex;
use serde_json::json;

use crate::error::ConfigError;
use crate::paths::MAX_SOURCE_FILE_SIZE;
use crate::paths::read_bounded;
use crate::paths::read_config_text;
use crate::paths::validate_path;
use crate::unit::ConfigUnit;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Test id filter anchored at the start of the id.
#[derive(Debug, Clone)]
pub struct TestFilter {
    /// Compiled, start-anchored pattern.
    regex: Regex,
    /// Pattern as supplied.
    pattern: String,
}

impl TestFilter {
    /// Compiles `pattern` so it must match at the start of an id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(&format!("^(?:{pattern})"))
            .map_err(|err| ConfigError::Invalid(format!("test filter {pattern}: {err}")))?;
        Ok(Self {
            regex,
            pattern: pattern.to_string(),
        })
    }

    /// Returns true when `id` is kept.
    #[must_use]
    pub fn matches(&self, id: &str) -> bool {
        self.regex.is_match(id)
    }

    /// Returns the pattern as supplied.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Discovery options.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Let a later unit replace an earlier unit's test id.
    pub allow_overrides: bool,
    /// Keep only tests whose id matches.
    pub test_filter: Option<TestFilter>,
    /// Shared file inlined into every source; contributes to every fingerprint.
    pub prelude: Option<PathBuf>,
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// A test id replaced by a later unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOverride {
    /// Test identifier.
    pub test: TestId,
    /// Unit whose declaration was replaced.
    pub previous: String,
    /// Unit whose declaration wins.
    pub replacement: String,
}

/// Outcome of config discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoveredPlan {
    /// Validated plan.
    pub plan: BenchPlan,
    /// Config units read, in visit order.
    pub units: Vec<PathBuf>,
    /// Overrides applied, in visit order.
    pub overrides: Vec<TestOverride>,
}

// ============================================================================
// SECTION: Discovery
// ============================================================================

/// Discovers config units under `root` and builds the run plan.
///
/// # Errors
///
/// Returns [`ConfigError`] when a unit or a source cannot be read, parsed,
/// or validated, or when a duplicate test id is not allowed.
pub fn discover(root: &Path, options: &DiscoveryOptions) -> Result<DiscoveredPlan, ConfigError> {
    let prelude = options.prelude.as_deref().map(fingerprint_prelude).transpose()?;
    let mut discovered = DiscoveredPlan {
        units: unit_paths(root)?,
        ..DiscoveredPlan::default()
    };
    let mut owners: BTreeMap<TestId, String> = BTreeMap::new();

    for unit_path in discovered.units.clone() {
        let label = unit_path.to_string_lossy().into_owned();
        let unit = ConfigUnit::parse(&read_config_text(&unit_path)?, &unit_path)?;
        let unit_dir = unit_path.parent().unwrap_or_else(|| Path::new(""));

        let test_ids: Vec<TestId> = unit
            .tests
            .keys()
            .filter(|id| {
                options.test_filter.as_ref().is_none_or(|filter| filter.matches(id.as_str()))
            })
            .cloned()
            .collect();

        for id in &test_ids {
            let Some(previous) = owners.insert(id.clone(), label.clone()) else {
                continue;
            };
            if !options.allow_overrides {
                return Err(ConfigError::Invalid(format!(
                    "duplicate test id {id} in {label} (already declared in {previous})"
                )));
            }
            for source in &mut discovered.plan.sources {
                source.tests.retain(|existing| existing != id);
            }
            discovered.overrides.push(TestOverride {
                test: id.clone(),
                previous,
                replacement: label.clone(),
            });
        }

        let mut contributing: Vec<(String, SourceFingerprint)> = Vec::new();
        for (entry, raw) in &unit.sources {
            let path = unit_dir.join(&entry.path);
            let display = path.to_string_lossy().into_owned();
            let bytes = read_bounded(&path, MAX_SOURCE_FILE_SIZE)
                .map_err(|err| err.context(&label))?;
            let fingerprint = SourceFingerprint::compute(&bytes, raw)
                .map_err(|err| ConfigError::Invalid(format!("{label}: {display}: {err}")))?;
            let sizes = entry.input.points().map_err(|err| err.context(&label))?;
            contributing.push((display.clone(), fingerprint));
            discovered.plan.sources.push(SourceUnit {
                path,
                display,
                repeats: entry.repeats,
                tests: test_ids.clone(),
                sizes,
            });
        }
        if let Some(prelude) = &prelude {
            contributing.push(prelude.clone());
        }

        for id in test_ids {
            let Some(spec) = unit.tests.get(&id).cloned() else {
                continue;
            };
            let definition = TestDefinition::derive(id.clone(), spec, &contributing)
                .map_err(|err| ConfigError::Invalid(format!("{label}: test {id}: {err}")))?;
            discovered.plan.tests.insert(id, definition);
        }
    }

    discovered.plan.sources.retain(|source| !source.tests.is_empty());
    Ok(discovered)
}

/// Lists config unit files under `root` in sorted visit order.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when `root` or a directory cannot be read.
pub fn unit_paths(root: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    validate_path(root)?;
    let metadata =
        fs::metadata(root).map_err(|err| ConfigError::Io(format!("{}: {err}", root.display())))?;
    if metadata.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    let mut found = Vec::new();
    walk(root, &mut found)?;
    Ok(found)
}

/// Appends `*.json` files below `dir`, visiting entries in sorted order.
///
/// Symlinked directories are not descended into.
fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), ConfigError> {
    let io_error = |err: std::io::Error| ConfigError::Io(format!("{}: {err}", dir.display()));
    let mut entries: Vec<(PathBuf, fs::FileType)> = fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.and_then(|entry| Ok((entry.path(), entry.file_type()?))))
        .collect::<Result<_, _>>()
        .map_err(io_error)?;
    entries.sort_by(|left, right| left.0.cmp(&right.0));
    for (path, file_type) in entries {
        if file_type.is_dir() {
            walk(&path, found)?;
        } else if path.extension().is_some_and(|extension| extension == "json") && path.is_file() {
            validate_path(&path)?;
            found.push(path);
        }
    }
    Ok(())
}

/// Fingerprints the prelude as a contributing entry.
fn fingerprint_prelude(path: &Path) -> Result<(String, SourceFingerprint), ConfigError> {
    let display = path.to_string_lossy().into_owned();
    let bytes = read_bounded(path, MAX_SOURCE_FILE_SIZE)?;
    let fingerprint = SourceFingerprint::compute(&bytes, &json!({"prelude": display}))
        .map_err(|err| ConfigError::Invalid(format!("prelude {display}: {err}")))?;
    Ok((display, fingerprint))
}
