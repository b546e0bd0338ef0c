// crates/complexity-bench-core/src/runtime/events.rs
// ============================================================================
// Module: Run Events
// Description: Structured diagnostics emitted while planning and running.
// Purpose: Surface warnings and progress without coupling the engine to output.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! The engine reports everything observable through a [`RunEventSink`]:
//! progress, reuse decisions, trimmed outliers, and the recoverable warnings
//! (tests that produced no samples, single-sample precision fallbacks).
//! Sinks decide where events go; JSON-lines sinks for stderr and files, a
//! no-op sink, and an in-memory sink for tests ship here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::identifiers::TestId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Observable run event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Configuration was loaded and validated.
    PlanLoaded {
        /// Planned sources.
        sources: usize,
        /// Planned tests.
        tests: usize,
    },
    /// A previous result store was read.
    CacheLoaded {
        /// Store path.
        path: String,
        /// Records in the previous store.
        records: usize,
        /// Whether the previous profile matches the active one.
        profile_matches: bool,
    },
    /// Two config units declared the same test id and the later one won.
    DuplicateTestOverridden {
        /// Test identifier.
        test: TestId,
        /// Unit whose declaration was replaced.
        previous: String,
        /// Unit whose declaration wins.
        replacement: String,
    },
    /// Every test of a source was a cache hit, so it was not built.
    SourceSkipped {
        /// Source display path.
        source: String,
    },
    /// A source sweep started.
    SourceStarted {
        /// Source display path.
        source: String,
        /// Size points to build.
        sizes: usize,
        /// Runs per size point.
        repeats: u32,
    },
    /// A size point was built.
    BuildFinished {
        /// Source display path.
        source: String,
        /// Problem size.
        n: u64,
        /// Rendered build command.
        command: String,
    },
    /// A program run finished and printed output.
    ProgramOutput {
        /// Source display path.
        source: String,
        /// Problem size.
        n: u64,
        /// Captured standard output.
        stdout: String,
    },
    /// Outliers were removed from a size group.
    OutliersRemoved {
        /// Test identifier.
        test: TestId,
        /// Problem size.
        n: u64,
        /// Removed values, ascending.
        removed: Vec<f64>,
        /// All values at the size, ascending.
        raw: Vec<f64>,
    },
    /// Only one value remained at a size; the deviation is reported as zero.
    PrecisionFallback {
        /// Test identifier.
        test: TestId,
        /// Problem size.
        n: u64,
    },
    /// A prior record was reused unchanged.
    TestReused {
        /// Test identifier.
        test: TestId,
    },
    /// A test produced no samples and had no reusable record.
    TestNotRun {
        /// Test identifier.
        test: TestId,
    },
    /// A source failed to build or run.
    SourceFailed {
        /// Source display path.
        source: String,
        /// Failure description.
        error: String,
    },
    /// The run stopped early on an interrupt.
    Interrupted {
        /// Sources that completed before the interrupt.
        completed_sources: usize,
    },
    /// The result store was written.
    StoreWritten {
        /// Store path.
        path: String,
        /// Records written.
        results: usize,
    },
}

/// Timestamped envelope written by JSON-lines sinks.
#[derive(Serialize)]
struct EventLine<'a> {
    /// Milliseconds since the Unix epoch.
    timestamp_ms: u128,
    /// Event payload.
    #[serde(flatten)]
    event: &'a RunEvent,
}

impl<'a> EventLine<'a> {
    /// Stamps an event with the current time.
    fn now(event: &'a RunEvent) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis());
        Self {
            timestamp_ms,
            event,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Destination for run events.
pub trait RunEventSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &RunEvent);
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl RunEventSink for StderrEventSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(payload) = serde_json::to_string(&EventLine::now(event)) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RunEventSink for FileEventSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(payload) = serde_json::to_string(&EventLine::now(event))
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op sink.
pub struct NoopEventSink;

impl RunEventSink for NoopEventSink {
    fn record(&self, _event: &RunEvent) {}
}

/// Sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryEventSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<RunEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl RunEventSink for MemoryEventSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Sink that forwards to several sinks in order.
#[derive(Default)]
pub struct FanoutEventSink {
    /// Downstream sinks.
    sinks: Vec<Box<dyn RunEventSink>>,
}

impl FanoutEventSink {
    /// Creates an empty fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a downstream sink.
    #[must_use]
    pub fn with(mut self, sink: impl RunEventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl RunEventSink for FanoutEventSink {
    fn record(&self, event: &RunEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}
