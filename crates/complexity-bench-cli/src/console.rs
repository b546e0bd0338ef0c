// crates/complexity-bench-cli/src/console.rs
// ============================================================================
// Module: Console Event Rendering
// Description: Renders run events to stderr as text or JSON lines.
// Purpose: Give operators readable progress while keeping a machine format.
// Dependencies: complexity-bench-core, clap
// ============================================================================

//! ## Overview
//! [`ConsoleSink`] is the stderr half of the CLI's event fan-out. Text mode
//! routes every event through the message catalog; JSON mode forwards to the
//! core [`StderrEventSink`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use clap::ValueEnum;
use complexity_bench_core::RunEvent;
use complexity_bench_core::RunEventSink;
use complexity_bench_core::runtime::StderrEventSink;

use crate::t;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Stderr log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Event sink writing to stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    /// Output format.
    format: LogFormat,
    /// Suppress echoed program output.
    quiet_output: bool,
}

impl ConsoleSink {
    /// Creates a console sink.
    #[must_use]
    pub const fn new(format: LogFormat, quiet_output: bool) -> Self {
        Self {
            format,
            quiet_output,
        }
    }
}

impl RunEventSink for ConsoleSink {
    fn record(&self, event: &RunEvent) {
        if self.quiet_output && matches!(event, RunEvent::ProgramOutput { .. }) {
            return;
        }
        match self.format {
            LogFormat::Json => StderrEventSink.record(event),
            LogFormat::Text => {
                let mut stderr = std::io::stderr().lock();
                for line in render_event(event) {
                    let _ = writeln!(stderr, "{line}");
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders an event as catalog lines.
#[must_use]
pub fn render_event(event: &RunEvent) -> Vec<String> {
    match event {
        RunEvent::PlanLoaded {
            sources,
            tests,
        } => vec![t!("run.plan_loaded", sources = sources, tests = tests)],
        RunEvent::CacheLoaded {
            path,
            records,
            profile_matches,
        } => {
            let mut lines = vec![t!("run.cache_loaded", records = records, path = path)];
            if !profile_matches {
                lines.push(t!("run.cache_profile_changed", path = path));
            }
            lines
        }
        RunEvent::DuplicateTestOverridden {
            test,
            previous,
            replacement,
        } => vec![t!(
            "run.override",
            test = test,
            previous = previous,
            replacement = replacement
        )],
        RunEvent::SourceSkipped {
            source,
        } => vec![t!("run.source_skipped", source = source)],
        RunEvent::SourceStarted {
            source,
            sizes,
            repeats,
        } => vec![t!("run.source_started", source = source, sizes = sizes, repeats = repeats)],
        RunEvent::BuildFinished {
            command, ..
        } => vec![t!("run.build_finished", command = command)],
        RunEvent::ProgramOutput {
            stdout, ..
        } => vec![t!("run.program_output", stdout = stdout.trim_end())],
        RunEvent::OutliersRemoved {
            test,
            n,
            removed,
            raw,
        } => vec![
            t!("run.outliers_removed", count = removed.len(), test = test, n = n),
            t!("run.outliers_raw", values = format_values(raw)),
            t!("run.outliers_removed_values", values = format_values(removed)),
        ],
        RunEvent::PrecisionFallback {
            test,
            n,
        } => vec![t!("run.precision_fallback", test = test, n = n)],
        RunEvent::TestReused {
            test,
        } => vec![t!("run.test_reused", test = test)],
        RunEvent::TestNotRun {
            test,
        } => vec![t!("run.test_not_run", test = test)],
        RunEvent::SourceFailed {
            source,
            error,
        } => vec![t!("run.source_failed", source = source, error = error)],
        RunEvent::Interrupted {
            completed_sources,
        } => vec![t!("run.interrupted", completed = completed_sources)],
        RunEvent::StoreWritten {
            path,
            results,
        } => vec![t!("run.store_written", results = results, path = path)],
    }
}

/// Formats values as a bracketed list.
fn format_values(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use complexity_bench_core::TestId;

    use super::*;

    #[test]
    fn outlier_events_list_removed_and_raw_values() {
        let lines = render_event(&RunEvent::OutliersRemoved {
            test: TestId::new("misc.sort"),
            n: 64,
            removed: vec![900.0],
            raw: vec![10.0, 11.5, 900.0],
        });
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Removed 1 outliers from misc.sort n=64");
        assert_eq!(lines[1], "  Raw values: [10, 11.5, 900]");
        assert_eq!(lines[2], "  Removed values: [900]");
    }

    #[test]
    fn profile_change_adds_a_warning_line() {
        let lines = render_event(&RunEvent::CacheLoaded {
            path: "results.json".to_string(),
            records: 3,
            profile_matches: false,
        });
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("Profile changed"));
    }
}
