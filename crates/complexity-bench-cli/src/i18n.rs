// crates/complexity-bench-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for future localization support.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The complexity bench CLI stores user-facing strings in a small catalog so
//! run diagnostics read consistently. All runtime output should be routed
//! through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself to avoid panics.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries loaded into the message bundle.
const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "complexity-bench {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    (
        "config.validate.ok",
        "Config valid: {units} config units, {sources} source files, {tests} tests.",
    ),
    ("profiles.load_failed", "Failed to load profiles: {error}"),
    ("store.load_failed", "Failed to read result store: {error}"),
    ("store.write_failed", "Failed to write result store: {error}"),
    ("store.missing", "No result store at {path}."),
    ("store.summary.profile", "Profile: {name}"),
    ("store.summary.entry", "{test}: {sizes} sizes, max_c={max_c}"),
    ("run.profile", "Using profile: {name}"),
    ("run.log_file_failed", "Failed to open log file {path}: {error}"),
    ("run.tsc_failed", "Failed to read TSC frequency from {path}: {error}"),
    ("run.builder_failed", "Failed to prepare build directory: {error}"),
    ("run.cancel_handler_failed", "Warning: failed to install Ctrl+C handler: {error}"),
    ("run.plan_loaded", "Found {sources} source files and {tests} tests."),
    ("run.cache_loaded", "Loaded {records} existing test results from {path}"),
    (
        "run.cache_profile_changed",
        "Profile changed since {path} was written; no results are reused.",
    ),
    ("run.override", "Test {test} from {previous} overridden by {replacement}."),
    ("run.source_skipped", "Skipping {source}: every test is cached."),
    ("run.source_started", "Running {source} ({sizes} sizes x {repeats} repeats)"),
    ("run.build_finished", "{command}"),
    ("run.program_output", "{stdout}"),
    ("run.outliers_removed", "Removed {count} outliers from {test} n={n}"),
    ("run.outliers_raw", "  Raw values: {values}"),
    ("run.outliers_removed_values", "  Removed values: {values}"),
    (
        "run.precision_fallback",
        "Only one sample remains for {test} n={n}; stddev reported as 0.",
    ),
    ("run.test_reused", "Reusing cached result for {test}."),
    ("run.test_not_run", "Warning: Test {test} defined but not run."),
    ("run.source_failed", "Source {source} failed: {error}"),
    ("run.interrupted", "Interrupted by user after {completed} completed sources."),
    ("run.store_written", "Wrote {results} results to {path}"),
    ("run.failed", "{count} source(s) failed; completed results were saved."),
    ("run_all.profile", "Profile {key}: writing {path}"),
    ("run_all.index_failed", "Failed to update results index {path}: {error}"),
    ("run_all.index_written", "Updated results index {path} ({entries} entries)"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the English catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Returns the static English catalog used by the CLI.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}

// ============================================================================
// SECTION: Tests
// ============================================================================
