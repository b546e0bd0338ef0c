// crates/complexity-bench-config/src/generator.rs
// ============================================================================
// Module: Size Ladder Generator
// Description: Expands generator params into ordered size points.
// Purpose: Pick sweep sizes and per-size micro repeat counts for a source.
// Dependencies: complexity-bench-core, serde
// ============================================================================

//! ## Overview
//! The generator walks a fixed candidate ladder, either powers of two alone
//! or powers of two merged with human-friendly decimal sizes, and keeps the
//! sizes within `[lower_bound, upper_bound]`. Each point defines
//! `BENCHMARK_N`; with `micro_repeats` it also defines
//! `BENCHMARK_MICRO_REPEATS`, sized so one run lasts about `min_runtime`
//! nanoseconds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use complexity_bench_core::ComplexityClass;
use complexity_bench_core::SizePoint;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Define carrying the problem size.
pub const DEFINE_SIZE: &str = "BENCHMARK_N";
/// Define carrying the per-run repeat count.
pub const DEFINE_MICRO_REPEATS: &str = "BENCHMARK_MICRO_REPEATS";

/// Decimal sizes merged with the powers of two unless `power_of_two` is set.
const DECIMAL_LADDER: &[u64] = &[
    3,
    6,
    10,
    20,
    40,
    50,
    100,
    200,
    350,
    700,
    1_000,
    1_500,
    3_000,
    5_000,
    10_000,
    20_000,
    50_000,
    100_000,
    200_000,
    400_000,
    700_000,
    1_000_000,
    1_500_000,
    3_000_000,
    5_000_000,
    10_000_000,
    20_000_000,
    50_000_000,
    100_000_000,
    200_000_000,
    400_000_000,
    700_000_000,
    1_000_000_000,
    1_500_000_000,
    3_000_000_000,
    6_000_000_000,
    13_000_000_000,
    25_000_000_000,
    50_000_000_000,
    100_000_000_000,
    200_000_000_000,
    400_000_000_000,
    800_000_000_000,
    1_500_000_000_000,
    3_000_000_000_000,
    6_000_000_000_000,
    12_000_000_000_000,
    25_000_000_000_000,
    50_000_000_000_000,
    100_000_000_000_000,
    200_000_000_000_000,
    400_000_000_000_000,
    800_000_000_000_000,
    1_500_000_000_000_000,
    3_000_000_000_000_000,
    7_000_000_000_000_000,
    13_000_000_000_000_000,
    25_000_000_000_000_000,
    50_000_000_000_000_000,
    100_000_000_000_000_000,
    200_000_000_000_000_000,
    400_000_000_000_000_000,
    800_000_000_000_000_000,
    1_800_000_000_000_000_000,
    3_000_000_000_000_000_000,
    7_000_000_000_000_000_000,
];

// ============================================================================
// SECTION: Params
// ============================================================================

/// Parameters of a `generator` input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorParams {
    /// Smallest size kept.
    pub lower_bound: f64,
    /// Largest size kept.
    pub upper_bound: f64,
    /// Use only powers of two.
    pub power_of_two: bool,
    /// Define `BENCHMARK_MICRO_REPEATS` per point.
    pub micro_repeats: bool,
    /// Expected nanoseconds per unit of growth.
    pub estimated_constant: f64,
    /// Growth rate used to size repeat counts.
    pub complexity: ComplexityClass,
    /// Upper clamp for repeat counts.
    pub max_repeats: u64,
    /// Target nanoseconds of work per run.
    pub min_runtime: f64,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            lower_bound: 1.0,
            upper_bound: 1e8,
            power_of_two: false,
            micro_repeats: false,
            estimated_constant: 1.0,
            complexity: ComplexityClass::Linear,
            max_repeats: 1_000_000,
            min_runtime: 10_000_000.0,
        }
    }
}

impl GeneratorParams {
    /// Validates bounds and repeat sizing inputs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.lower_bound.is_finite() || !self.upper_bound.is_finite() {
            return Err(ConfigError::Invalid("generator bounds must be finite".to_string()));
        }
        if self.lower_bound > self.upper_bound {
            return Err(ConfigError::Invalid(format!(
                "generator lower_bound {} exceeds upper_bound {}",
                self.lower_bound, self.upper_bound
            )));
        }
        if self.micro_repeats {
            if !(self.estimated_constant.is_finite() && self.estimated_constant > 0.0) {
                return Err(ConfigError::Invalid(
                    "generator estimated_constant must be positive".to_string(),
                ));
            }
            if !(self.min_runtime.is_finite() && self.min_runtime > 0.0) {
                return Err(ConfigError::Invalid(
                    "generator min_runtime must be positive".to_string(),
                ));
            }
            if self.max_repeats == 0 {
                return Err(ConfigError::Invalid("generator max_repeats must be >= 1".to_string()));
            }
        }
        Ok(())
    }

    /// Returns the size points in ascending order.
    #[must_use]
    pub fn points(&self) -> Vec<SizePoint> {
        candidate_sizes(self.power_of_two)
            .into_iter()
            .filter(|n| {
                let size = to_f64(*n);
                self.lower_bound <= size && size <= self.upper_bound
            })
            .map(|n| {
                let mut defines = BTreeMap::from([(DEFINE_SIZE.to_string(), n.to_string())]);
                if self.micro_repeats {
                    defines
                        .insert(DEFINE_MICRO_REPEATS.to_string(), self.repeats_for(n).to_string());
                }
                SizePoint {
                    n,
                    defines,
                }
            })
            .collect()
    }

    /// Returns the micro repeat count for size `n`.
    ///
    /// The count is `ceil(min_runtime / complexity(n) / estimated_constant)`
    /// clamped to `[1, max_repeats]`; degenerate growth values use
    /// `max_repeats`.
    #[must_use]
    pub fn repeats_for(&self, n: u64) -> u64 {
        let max = self.max_repeats.max(1);
        let Some(growth) = self.complexity.normalizer(n) else {
            return max;
        };
        let raw = (self.min_runtime / growth / self.estimated_constant).ceil();
        if raw.is_nan() {
            return max;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "The value is clamped to [1, max_repeats] before conversion."
        )]
        let repeats = raw.clamp(1.0, to_f64(max)) as u64;
        repeats.clamp(1, max)
    }
}

// ============================================================================
// SECTION: Ladders
// ============================================================================

/// Returns the sorted, deduplicated candidate sizes.
#[must_use]
pub fn candidate_sizes(power_of_two: bool) -> Vec<u64> {
    let mut sizes: Vec<u64> = (0 .. 64).map(|exponent| 1_u64 << exponent).collect();
    if !power_of_two {
        sizes.extend_from_slice(DECIMAL_LADDER);
    }
    sizes.sort_unstable();
    sizes.dedup();
    sizes
}

/// Builds points for an explicit size list.
#[must_use]
pub fn explicit_points(values: &[u64]) -> Vec<SizePoint> {
    let mut sizes = values.to_vec();
    sizes.sort_unstable();
    sizes.dedup();
    sizes
        .into_iter()
        .map(|n| SizePoint {
            n,
            defines: BTreeMap::from([(DEFINE_SIZE.to_string(), n.to_string())]),
        })
        .collect()
}

/// Converts a size to floating point for bound comparisons.
#[allow(clippy::cast_precision_loss, reason = "Bounds are compared approximately.")]
const fn to_f64(n: u64) -> f64 {
    n as f64
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_ladder_is_strictly_ascending() {
        assert!(DECIMAL_LADDER.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn merged_ladder_starts_with_small_friendly_sizes() {
        let sizes = candidate_sizes(false);
        assert_eq!(&sizes[.. 10], &[1, 2, 3, 4, 6, 8, 10, 16, 20, 32]);
        assert_eq!(sizes.last(), Some(&(1_u64 << 63)));
    }
}
