// crates/complexity-bench-core/src/runtime/session.rs
// ============================================================================
// Module: Run Session
// Description: Sequential build, run, collect, and aggregate loop.
// Purpose: Produce fresh and reused records for one invocation.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! A [`BenchSession`] walks sources in declaration order and their size
//! points in sweep order, one build and one run at a time. Samples of a
//! source count only once the whole source completes; a failure or an
//! interrupt drops the in-flight source's samples and keeps everything
//! collected before it. Aggregation runs once at the end over the samples of
//! completed sources.
//!
//! Invariants:
//! - Cache hits are never rebuilt from fresh samples.
//! - Nothing runs after cancellation is observed.
//! - Tests with neither samples nor a hit are reported and left out.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::identifiers::TestId;
use crate::core::plan::BenchPlan;
use crate::core::plan::SourceUnit;
use crate::core::record::ResultRecord;
use crate::core::sample::Sample;
use crate::core::sample::split_output_line;
use crate::interfaces::BuildError;
use crate::interfaces::PointRequest;
use crate::interfaces::ProgramRunner;
use crate::interfaces::RunError;
use crate::interfaces::SourceBuilder;
use crate::runtime::aggregate::AggregationNote;
use crate::runtime::cache::CachePlan;
use crate::runtime::cancel::CancellationToken;
use crate::runtime::events::RunEvent;
use crate::runtime::events::RunEventSink;
use crate::runtime::registry::KindRegistry;
use crate::runtime::registry::KindRegistryError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure that stopped a source.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A size point failed to build.
    #[error("build failed for {source_path} at n={n}: {error}")]
    Build {
        /// Source display path.
        source_path: String,
        /// Problem size.
        n: u64,
        /// Builder failure.
        #[source]
        error: BuildError,
    },
    /// A program run failed.
    #[error("run failed for {source_path} at n={n}: {error}")]
    Run {
        /// Source display path.
        source_path: String,
        /// Problem size.
        n: u64,
        /// Runner failure.
        #[source]
        error: RunError,
    },
    /// A test kind has no handler.
    #[error(transparent)]
    Kind(#[from] KindRegistryError),
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result of a session run.
#[derive(Debug, Default)]
pub struct SessionOutcome {
    /// Records reused from the previous store.
    pub reused: BTreeMap<TestId, ResultRecord>,
    /// Records aggregated from fresh samples.
    pub fresh: BTreeMap<TestId, ResultRecord>,
    /// Tests left out for lack of samples.
    pub not_run: BTreeSet<TestId>,
    /// Sources that ran to completion.
    pub completed_sources: usize,
    /// Sources skipped because every test was a hit.
    pub skipped_sources: usize,
    /// True when the run stopped on cancellation.
    pub interrupted: bool,
    /// Source failures in the order they happened.
    pub failures: Vec<SessionError>,
}

/// Why a source sweep stopped early.
enum SweepStop {
    /// Cancellation was observed.
    Interrupted,
    /// A collaborator failed.
    Failed(SessionError),
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Session options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Abandon only the failing source and continue with the next one.
    pub keep_going: bool,
}

/// Single-threaded measurement session.
pub struct BenchSession<'a, B, R> {
    /// Validated plan.
    plan: &'a BenchPlan,
    /// Reuse decisions.
    cache: CachePlan,
    /// Build collaborator.
    builder: B,
    /// Run collaborator.
    runner: R,
    /// Kind handlers.
    registry: KindRegistry,
    /// Event destination.
    sink: &'a dyn RunEventSink,
    /// Interrupt flag.
    cancel: CancellationToken,
    /// Session options.
    options: SessionOptions,
}

impl<'a, B, R> BenchSession<'a, B, R>
where
    B: SourceBuilder,
    R: ProgramRunner,
{
    /// Creates a session with built-in kind handlers and a fresh token.
    #[must_use]
    pub fn new(
        plan: &'a BenchPlan,
        cache: CachePlan,
        builder: B,
        runner: R,
        sink: &'a dyn RunEventSink,
    ) -> Self {
        Self {
            plan,
            cache,
            builder,
            runner,
            registry: KindRegistry::with_builtin(),
            sink,
            cancel: CancellationToken::new(),
            options: SessionOptions::default(),
        }
    }

    /// Uses `cancel` as the interrupt flag.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Replaces the kind registry.
    #[must_use]
    pub fn with_registry(mut self, registry: KindRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets session options.
    #[must_use]
    pub const fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs every planned source and aggregates the collected samples.
    #[must_use]
    pub fn run(mut self) -> SessionOutcome {
        let plan = self.plan;
        let mut outcome = SessionOutcome::default();
        for id in self.cache.hits().keys() {
            self.sink.record(&RunEvent::TestReused {
                test: id.clone(),
            });
        }

        let mut samples: BTreeMap<TestId, Vec<Sample>> = BTreeMap::new();
        for source in &plan.sources {
            if self.cache.skips(source) {
                outcome.skipped_sources += 1;
                self.sink.record(&RunEvent::SourceSkipped {
                    source: source.display.clone(),
                });
                continue;
            }
            if self.cancel.is_cancelled() {
                outcome.interrupted = true;
                break;
            }
            self.sink.record(&RunEvent::SourceStarted {
                source: source.display.clone(),
                sizes: source.sizes.len(),
                repeats: source.repeats,
            });
            match self.sweep(source) {
                Ok(collected) => {
                    outcome.completed_sources += 1;
                    for (id, values) in collected {
                        samples.entry(id).or_default().extend(values);
                    }
                }
                Err(SweepStop::Interrupted) => {
                    outcome.interrupted = true;
                    break;
                }
                Err(SweepStop::Failed(error)) => {
                    self.sink.record(&RunEvent::SourceFailed {
                        source: source.display.clone(),
                        error: error.to_string(),
                    });
                    outcome.failures.push(error);
                    if !self.options.keep_going {
                        break;
                    }
                }
            }
        }
        if outcome.interrupted {
            self.sink.record(&RunEvent::Interrupted {
                completed_sources: outcome.completed_sources,
            });
        }

        self.aggregate(samples, &mut outcome);
        outcome.reused = self.cache.into_hits();
        outcome
    }

    /// Builds and runs every size point of one source.
    fn sweep(
        &mut self,
        source: &'a SourceUnit,
    ) -> Result<BTreeMap<TestId, Vec<Sample>>, SweepStop> {
        let plan = self.plan;
        let mut collected: BTreeMap<TestId, Vec<Sample>> = BTreeMap::new();
        for point in &source.sizes {
            if self.cancel.is_cancelled() {
                return Err(SweepStop::Interrupted);
            }
            let request = PointRequest {
                source,
                point,
                tests: &plan.tests,
            };
            let artifact = self.builder.build(&request).map_err(|error| {
                self.stop(SessionError::Build {
                    source_path: source.display.clone(),
                    n: point.n,
                    error,
                })
            })?;
            self.sink.record(&RunEvent::BuildFinished {
                source: source.display.clone(),
                n: point.n,
                command: artifact.command.clone(),
            });
            for _ in 0 .. source.repeats {
                if self.cancel.is_cancelled() {
                    return Err(SweepStop::Interrupted);
                }
                let run_error = |error| SessionError::Run {
                    source_path: source.display.clone(),
                    n: point.n,
                    error,
                };
                let output = self
                    .runner
                    .run(&artifact, &request)
                    .map_err(|error| self.stop(run_error(error)))?;
                if !output.stdout.is_empty() {
                    self.sink.record(&RunEvent::ProgramOutput {
                        source: source.display.clone(),
                        n: point.n,
                        stdout: output.stdout.clone(),
                    });
                }
                self.collect(source, &output.stdout, &mut collected)
                    .map_err(|error| match error {
                        CollectError::Run(error) => self.stop(run_error(error)),
                        CollectError::Kind(error) => SweepStop::Failed(error.into()),
                    })?;
            }
        }
        Ok(collected)
    }

    /// Decodes the lines of one run that belong to the source's pending tests.
    fn collect(
        &self,
        source: &SourceUnit,
        stdout: &str,
        collected: &mut BTreeMap<TestId, Vec<Sample>>,
    ) -> Result<(), CollectError> {
        for line in stdout.lines() {
            let Some((id, values)) = split_output_line(line) else {
                continue;
            };
            let id = TestId::new(id);
            if !source.tests.contains(&id) || self.cache.is_hit(&id) {
                continue;
            }
            let Some(definition) = self.plan.tests.get(&id) else {
                continue;
            };
            let handler = self.registry.handler(definition.spec.kind).map_err(CollectError::Kind)?;
            let sample = handler.decode(&definition.spec, values).map_err(|error| {
                CollectError::Run(RunError::MalformedOutput {
                    line: line.to_string(),
                    error,
                })
            })?;
            collected.entry(id).or_default().push(sample);
        }
        Ok(())
    }

    /// Aggregates collected samples into fresh records.
    fn aggregate(
        &self,
        mut samples: BTreeMap<TestId, Vec<Sample>>,
        outcome: &mut SessionOutcome,
    ) {
        for (id, definition) in &self.plan.tests {
            if self.cache.is_hit(id) {
                continue;
            }
            let values = samples.remove(id).unwrap_or_default();
            if values.is_empty() {
                self.sink.record(&RunEvent::TestNotRun {
                    test: id.clone(),
                });
                outcome.not_run.insert(id.clone());
                continue;
            }
            let handler = match self.registry.handler(definition.spec.kind) {
                Ok(handler) => handler,
                Err(error) => {
                    outcome.failures.push(error.into());
                    outcome.not_run.insert(id.clone());
                    continue;
                }
            };
            let aggregation = handler.aggregate(&definition.spec, &values);
            for note in aggregation.notes {
                self.sink.record(&note_event(id, note));
            }
            outcome.fresh.insert(
                id.clone(),
                ResultRecord::fresh(definition, aggregation.stats, aggregation.max_c),
            );
        }
    }

    /// Classifies a collaborator failure, treating it as an interrupt when one is pending.
    fn stop(&self, error: SessionError) -> SweepStop {
        if self.cancel.is_cancelled() {
            SweepStop::Interrupted
        } else {
            SweepStop::Failed(error)
        }
    }
}

/// Failure while decoding one run's output.
enum CollectError {
    /// A line did not decode.
    Run(RunError),
    /// A test kind has no handler.
    Kind(KindRegistryError),
}

/// Converts an aggregation diagnostic into an event.
fn note_event(id: &TestId, note: AggregationNote) -> RunEvent {
    match note {
        AggregationNote::OutliersRemoved {
            n,
            removed,
            raw,
        } => RunEvent::OutliersRemoved {
            test: id.clone(),
            n,
            removed,
            raw,
        },
        AggregationNote::PrecisionFallback {
            n,
        } => RunEvent::PrecisionFallback {
            test: id.clone(),
            n,
        },
    }
}
