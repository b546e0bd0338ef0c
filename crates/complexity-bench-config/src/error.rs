// crates/complexity-bench-config/src/error.rs
// ============================================================================
// Module: Config Errors
// Description: Error type for config loading and validation.
// Purpose: Fail closed before any compilation when inputs are unusable.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! All config failures share one three-way error: the file could not be
//! read, could not be parsed, or parsed into something invalid.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// JSON parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Prefixes the message with `context`, keeping the variant.
    #[must_use]
    pub fn context(self, context: impl fmt::Display) -> Self {
        match self {
            Self::Io(message) => Self::Io(format!("{context}: {message}")),
            Self::Parse(message) => Self::Parse(format!("{context}: {message}")),
            Self::Invalid(message) => Self::Invalid(format!("{context}: {message}")),
        }
    }
}
