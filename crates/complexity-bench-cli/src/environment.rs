// crates/complexity-bench-cli/src/environment.rs
// ============================================================================
// Module: Environment Snapshot
// Description: Host description recorded alongside every result store.
// Purpose: Capture platform, toolchain, and CPU details for later comparison.
// Dependencies: complexity-bench-core, time
// ============================================================================

//! ## Overview
//! The snapshot is informational: it never influences cache decisions. Probe
//! commands that fail are recorded as `Error: ...` strings instead of
//! failing the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use complexity_bench_core::EnvironmentSnapshot;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Probe key, program, and arguments.
pub const PROBES: &[(&str, &str, &[&str])] = &[
    ("compiler", "g++", &["-v"]),
    ("cacheinfo", "lscpu", &["-C"]),
    ("cpuinfo", "lscpu", &[]),
    ("meminfo", "free", &["-h"]),
];

/// Runs one probe command, preferring stdout and falling back to stderr.
#[must_use]
pub fn run_probe(program: &str, args: &[&str]) -> String {
    match Command::new(program).args(args).output() {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if stdout.trim().is_empty() {
                String::from_utf8_lossy(&output.stderr).into_owned()
            } else {
                stdout.into_owned()
            }
        }
        Err(err) => format!("Error: {err}"),
    }
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Captures the current environment.
///
/// Probes are skipped when `probe` is false.
#[must_use]
pub fn snapshot(tsc_freq: Option<f64>, probe: bool) -> EnvironmentSnapshot {
    let mut probes = BTreeMap::new();
    if probe {
        for (key, program, args) in PROBES {
            probes.insert((*key).to_string(), run_probe(program, args));
        }
    }
    EnvironmentSnapshot {
        platform: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        harness_version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: current_timestamp(),
        tsc_freq,
        probes,
    }
}

/// Returns the current UTC time as RFC 3339.
fn current_timestamp() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

// ============================================================================
// SECTION: TSC Frequency
// ============================================================================

/// Reads a TSC frequency in GHz; a missing file yields `None`.
///
/// # Errors
///
/// Returns a message when the file exists but is unreadable or not a
/// positive finite number.
pub fn read_tsc_freq(path: &Path) -> Result<Option<f64>, String> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.to_string()),
    };
    let trimmed = text.trim();
    let value: f64 =
        trimmed.parse().map_err(|_| format!("`{trimmed}` is not a frequency in GHz"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("`{trimmed}` is not a positive frequency"));
    }
    Ok(Some(value))
}

/// Formats a TSC frequency the way it is passed to the compiler.
#[must_use]
pub fn format_tsc_freq(value: f64) -> String {
    format!("{value:.10}")
}

// ============================================================================
// SECTION: Tests
// ============================================================================
