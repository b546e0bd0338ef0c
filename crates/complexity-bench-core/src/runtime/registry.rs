// crates/complexity-bench-core/src/runtime/registry.rs
// ============================================================================
// Module: Test Kind Registry
// Description: Handler table dispatching on a test's result-shape kind.
// Purpose: Route line decoding and aggregation through a registered handler.
// Dependencies: crate::core, crate::runtime::aggregate
// ============================================================================

//! ## Overview
//! Every [`TestKind`] maps to one [`KindHandler`]. The registry ships with the
//! `simple` handler and accepts further registrations, so a new result shape
//! only needs a variant and a handler.
//!
//! Invariants:
//! - Each kind has at most one handler.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::sample::Sample;
use crate::core::sample::SampleError;
use crate::core::spec::TestKind;
use crate::core::spec::TestSpec;
use crate::runtime::aggregate::Aggregation;
use crate::runtime::aggregate::aggregate_samples;

// ============================================================================
// SECTION: Handler Contract
// ============================================================================

/// Decoding and aggregation for one result-shape kind.
pub trait KindHandler: Send + Sync {
    /// Decodes the value text of one output line.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError`] when the line does not match the template.
    fn decode(&self, spec: &TestSpec, values: &str) -> Result<Sample, SampleError>;

    /// Aggregates all samples collected for one test.
    fn aggregate(&self, spec: &TestSpec, samples: &[Sample]) -> Aggregation;
}

/// Handler for [`TestKind::Simple`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleKind;

impl KindHandler for SimpleKind {
    fn decode(&self, spec: &TestSpec, values: &str) -> Result<Sample, SampleError> {
        Sample::decode(&spec.template, values)
    }

    fn aggregate(&self, spec: &TestSpec, samples: &[Sample]) -> Aggregation {
        aggregate_samples(spec, samples)
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KindRegistryError {
    /// A handler is already registered for the kind.
    #[error("test kind already registered: {0}")]
    Duplicate(&'static str),
    /// No handler is registered for the kind.
    #[error("no handler registered for test kind: {0}")]
    Missing(&'static str),
}

/// Handler table keyed by test kind.
pub struct KindRegistry {
    /// Handlers keyed by kind.
    handlers: BTreeMap<TestKind, Box<dyn KindHandler>>,
}

impl KindRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Creates a registry with the built-in handlers.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut handlers: BTreeMap<TestKind, Box<dyn KindHandler>> = BTreeMap::new();
        handlers.insert(TestKind::Simple, Box::new(SimpleKind));
        Self {
            handlers,
        }
    }

    /// Registers a handler for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`KindRegistryError::Duplicate`] when the kind is taken.
    pub fn register(
        &mut self,
        kind: TestKind,
        handler: impl KindHandler + 'static,
    ) -> Result<(), KindRegistryError> {
        if self.handlers.contains_key(&kind) {
            return Err(KindRegistryError::Duplicate(kind.as_str()));
        }
        self.handlers.insert(kind, Box::new(handler));
        Ok(())
    }

    /// Returns the handler for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`KindRegistryError::Missing`] when nothing is registered.
    pub fn handler(&self, kind: TestKind) -> Result<&dyn KindHandler, KindRegistryError> {
        self.handlers
            .get(&kind)
            .map(|handler| handler.as_ref())
            .ok_or(KindRegistryError::Missing(kind.as_str()))
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
