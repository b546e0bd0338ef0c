// crates/complexity-bench-core/src/core/complexity.rs
// ============================================================================
// Module: Complexity Classes
// Description: Closed enumeration of asymptotic growth tags.
// Purpose: Map a declared complexity tag to a numeric normalizer of n.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A complexity class only normalizes measured time; it never verifies the
//! algorithm under test. The canonical spelling is the spaced form
//! (`O(n log n)`), and the compact legacy spellings (`O(nlogn)`,
//! `O(sqrt(n))`) are accepted on input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Complexity Class
// ============================================================================

/// Declared asymptotic growth rate of a benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComplexityClass {
    /// Constant cost.
    #[serde(rename = "O(1)")]
    Constant,
    /// Logarithmic cost.
    #[serde(rename = "O(log n)", alias = "O(logn)")]
    Logarithmic,
    /// Square-root cost.
    #[serde(rename = "O(sqrt n)", alias = "O(sqrt(n))")]
    SquareRoot,
    /// Square root divided by logarithm.
    #[serde(rename = "O(sqrt n / log n)", alias = "O(sqrt(n)/logn)")]
    SquareRootOverLog,
    /// Linear cost.
    #[serde(rename = "O(n)")]
    Linear,
    /// Linearithmic cost.
    #[serde(rename = "O(n log n)", alias = "O(nlogn)")]
    Linearithmic,
    /// Quadratic cost.
    #[serde(rename = "O(n^2)")]
    Quadratic,
    /// Cubic cost.
    #[serde(rename = "O(n^3)")]
    Cubic,
}

/// Canonical and accepted spellings for every class.
const SPELLINGS: &[(ComplexityClass, &str, &[&str])] = &[
    (ComplexityClass::Constant, "O(1)", &[]),
    (ComplexityClass::Logarithmic, "O(log n)", &["O(logn)"]),
    (ComplexityClass::SquareRoot, "O(sqrt n)", &["O(sqrt(n))"]),
    (ComplexityClass::SquareRootOverLog, "O(sqrt n / log n)", &["O(sqrt(n)/logn)"]),
    (ComplexityClass::Linear, "O(n)", &[]),
    (ComplexityClass::Linearithmic, "O(n log n)", &["O(nlogn)"]),
    (ComplexityClass::Quadratic, "O(n^2)", &[]),
    (ComplexityClass::Cubic, "O(n^3)", &[]),
];

impl ComplexityClass {
    /// Every class in ascending growth order.
    pub const ALL: [Self; 8] = [
        Self::Constant,
        Self::Logarithmic,
        Self::SquareRootOverLog,
        Self::SquareRoot,
        Self::Linear,
        Self::Linearithmic,
        Self::Quadratic,
        Self::Cubic,
    ];

    /// Returns the canonical spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Constant => "O(1)",
            Self::Logarithmic => "O(log n)",
            Self::SquareRoot => "O(sqrt n)",
            Self::SquareRootOverLog => "O(sqrt n / log n)",
            Self::Linear => "O(n)",
            Self::Linearithmic => "O(n log n)",
            Self::Quadratic => "O(n^2)",
            Self::Cubic => "O(n^3)",
        }
    }

    /// Evaluates the growth function at size `n`.
    ///
    /// The result may be zero or non-finite for degenerate sizes (`log2(1)`
    /// is zero); see [`Self::normalizer`].
    #[must_use]
    pub fn evaluate(self, n: u64) -> f64 {
        let x = u64_to_f64(n);
        match self {
            Self::Constant => 1.0,
            Self::Logarithmic => x.log2(),
            Self::SquareRoot => x.sqrt(),
            Self::SquareRootOverLog => x.sqrt() / x.log2(),
            Self::Linear => x,
            Self::Linearithmic => x * x.log2(),
            Self::Quadratic => x * x,
            Self::Cubic => x * x * x,
        }
    }

    /// Returns the growth value at `n` when it can divide a measurement.
    ///
    /// Only positive finite values qualify.
    #[must_use]
    pub fn normalizer(self, n: u64) -> Option<f64> {
        let value = self.evaluate(n);
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

impl fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognized complexity tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown complexity: {0}")]
pub struct UnknownComplexity(pub String);

impl FromStr for ComplexityClass {
    type Err = UnknownComplexity;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        SPELLINGS
            .iter()
            .find(|(_, canonical, aliases)| *canonical == trimmed || aliases.contains(&trimmed))
            .map(|(class, _, _)| *class)
            .ok_or_else(|| UnknownComplexity(trimmed.to_string()))
    }
}

/// Converts a size to floating point for growth evaluation.
#[allow(clippy::cast_precision_loss, reason = "Sizes above 2^53 only need approximate growth.")]
const fn u64_to_f64(n: u64) -> f64 {
    n as f64
}

// ============================================================================
// SECTION: Tests
// ============================================================================
