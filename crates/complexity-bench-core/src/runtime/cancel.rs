// crates/complexity-bench-core/src/runtime/cancel.rs
// ============================================================================
// Module: Cooperative Cancellation
// Description: Shared interrupt flag checked between build and run steps.
// Purpose: Stop issuing new work on interrupt while keeping completed results.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`CancellationToken`] is cloned into the interrupt handler and the run
//! session. The session polls it before every build and every run; in-flight
//! collaborator calls are never aborted from here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

// ============================================================================
// SECTION: Token
// ============================================================================

/// Cloneable interrupt flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    /// Set once cancellation is requested.
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
