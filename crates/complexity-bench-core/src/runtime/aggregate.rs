// crates/complexity-bench-core/src/runtime/aggregate.rs
// ============================================================================
// Module: Sample Aggregator
// Description: Outlier trimming and complexity normalization per size.
// Purpose: Turn noisy per-size samples into a stable cost curve and constant.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! For every size `n` of a test, per-operation times are sorted, trimmed by
//! the test's [`OutlierPolicy`], summarized, and divided by the complexity
//! value at `n`. The practical constant `max_c` is the largest normalized mean
//! among sizes inside the practical range.
//!
//! Aggregation is pure: diagnostics come back as [`AggregationNote`]s for the
//! caller to report.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::record::AggregatedStat;
use crate::core::sample::Sample;
use crate::core::spec::OutlierPolicy;
use crate::core::spec::TestSpec;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Deviation multiplier for the sigma policies.
pub const SIGMA_MULTIPLIER: f64 = 3.0;

/// Other values needed before the candidate is left out of its own bound.
pub const MIN_EXCLUSIVE_REFERENCE: usize = 5;

/// Divisor of the sample count in the default outlier budget.
const BUDGET_DIVISOR: usize = 6;

// ============================================================================
// SECTION: Aggregation Output
// ============================================================================

/// Diagnostic produced while aggregating.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationNote {
    /// At least one value was removed at a size.
    OutliersRemoved {
        /// Size group.
        n: u64,
        /// Removed values, ascending.
        removed: Vec<f64>,
        /// Every value at the size, ascending.
        raw: Vec<f64>,
    },
    /// A single value remained, so the standard deviation fell back to zero.
    PrecisionFallback {
        /// Size group.
        n: u64,
    },
}

/// Aggregated statistics for one test.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Per-size statistics in ascending size order.
    pub stats: Vec<AggregatedStat>,
    /// Practical constant.
    pub max_c: f64,
    /// Diagnostics in size order.
    pub notes: Vec<AggregationNote>,
}

/// Retained and removed values of one size group.
#[derive(Debug, Clone, PartialEq)]
pub struct Trimmed {
    /// Values kept, ascending.
    pub retained: Vec<f64>,
    /// Values removed, ascending.
    pub outliers: Vec<f64>,
}

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Aggregates every sample of one test.
///
/// Sizes with no samples produce no entry.
#[must_use]
pub fn aggregate_samples(spec: &TestSpec, samples: &[Sample]) -> Aggregation {
    let mut groups: BTreeMap<u64, Vec<f64>> = BTreeMap::new();
    for sample in samples {
        groups.entry(sample.n).or_default().push(sample.per_operation_ns());
    }
    let mut stats = Vec::with_capacity(groups.len());
    let mut notes = Vec::new();
    for (n, values) in groups {
        let (stat, size_notes) = aggregate_size(spec, n, values);
        stats.push(stat);
        notes.extend(size_notes);
    }
    let max_c = practical_constant(spec, &stats);
    Aggregation {
        stats,
        max_c,
        notes,
    }
}

/// Aggregates the values of one size group.
#[must_use]
pub fn aggregate_size(
    spec: &TestSpec,
    n: u64,
    mut values: Vec<f64>,
) -> (AggregatedStat, Vec<AggregationNote>) {
    values.sort_by(f64::total_cmp);
    let budget = outlier_budget(values.len(), spec.max_outlier);
    let trimmed = trim_outliers(&values, spec.effective_outlier_policy(), budget);
    let mut notes = Vec::new();
    if !trimmed.outliers.is_empty() {
        notes.push(AggregationNote::OutliersRemoved {
            n,
            removed: trimmed.outliers.clone(),
            raw: values.clone(),
        });
    }
    let retained = &trimmed.retained;
    let stddev = sample_stddev(retained).unwrap_or_else(|| {
        notes.push(AggregationNote::PrecisionFallback { n });
        0.0
    });
    let mean = mean(retained);
    let min = retained.first().copied().unwrap_or(0.0);
    let max = retained.last().copied().unwrap_or(0.0);
    let normalizer = spec.complexity.normalizer(n);
    let normalize = |value: f64| normalizer.map(|complexity| value / complexity);
    let stat = AggregatedStat {
        n,
        mean,
        stddev,
        mean_c: normalize(mean),
        stddev_c: normalize(stddev),
        min,
        max,
        min_c: normalize(min),
        max_c: normalize(max),
        samples: retained.len(),
        complexity: normalizer,
        raw_values: values,
        outliers: trimmed.outliers,
    };
    (stat, notes)
}

/// Returns the largest normalized mean inside the practical range, or zero.
#[must_use]
pub fn practical_constant(spec: &TestSpec, stats: &[AggregatedStat]) -> f64 {
    stats
        .iter()
        .filter(|stat| spec.in_practical_range(stat.n))
        .filter_map(|stat| stat.mean_c)
        .fold(None, |acc: Option<f64>, value| Some(acc.map_or(value, |best| best.max(value))))
        .unwrap_or(0.0)
}

// ============================================================================
// SECTION: Outlier Trimming
// ============================================================================

/// Returns the removal budget for a group of `count` values.
///
/// An explicit `max_outlier` wins; otherwise `max(1, round(count / 6))` with
/// ties rounded to even.
#[must_use]
pub const fn outlier_budget(count: usize, max_outlier: Option<usize>) -> usize {
    if let Some(limit) = max_outlier {
        return limit;
    }
    let quotient = count / BUDGET_DIVISOR;
    let remainder = count % BUDGET_DIVISOR;
    let round_up = remainder * 2 > BUDGET_DIVISOR
        || (remainder * 2 == BUDGET_DIVISOR && quotient % 2 == 1);
    let rounded = if round_up { quotient + 1 } else { quotient };
    if rounded == 0 { 1 } else { rounded }
}

/// Trims an ascending value set under `policy`.
#[must_use]
pub fn trim_outliers(sorted: &[f64], policy: OutlierPolicy, budget: usize) -> Trimmed {
    match policy {
        OutlierPolicy::Sigma => trim_sigma(sorted, budget, false),
        OutlierPolicy::SigmaInclusive => trim_sigma(sorted, budget, true),
        OutlierPolicy::TrimExtremes => trim_extremes(sorted),
    }
}

/// Removes the largest value while it exceeds `median + 3 * stddev`.
///
/// The reference set excludes the candidate unless `inclusive` is set or
/// fewer than [`MIN_EXCLUSIVE_REFERENCE`] other values remain. A reference
/// set with zero deviation never removes anything.
fn trim_sigma(sorted: &[f64], budget: usize, inclusive: bool) -> Trimmed {
    let mut retained = sorted.to_vec();
    let mut outliers = Vec::new();
    while outliers.len() < budget && retained.len() >= 2 {
        let Some((&candidate, others)) = retained.split_last() else {
            break;
        };
        let exclusive = !inclusive && others.len() >= MIN_EXCLUSIVE_REFERENCE;
        let reference = if exclusive { others } else { retained.as_slice() };
        let Some(stddev) = sample_stddev(reference).filter(|stddev| *stddev > 0.0) else {
            break;
        };
        if candidate <= median(reference) + SIGMA_MULTIPLIER * stddev {
            break;
        }
        retained.pop();
        outliers.push(candidate);
    }
    outliers.reverse();
    Trimmed {
        retained,
        outliers,
    }
}

/// Drops one minimum and one maximum when more than two values exist.
fn trim_extremes(sorted: &[f64]) -> Trimmed {
    match sorted {
        [first, middle @ .., last] if !middle.is_empty() => Trimmed {
            retained: middle.to_vec(),
            outliers: vec![*first, *last],
        },
        _ => Trimmed {
            retained: sorted.to_vec(),
            outliers: Vec::new(),
        },
    }
}

// ============================================================================
// SECTION: Statistics
// ============================================================================

/// Arithmetic mean; zero for an empty set.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / len_as_f64(values.len())
}

/// Sample standard deviation with divisor `len - 1`.
///
/// Returns `None` when fewer than two values exist.
#[must_use]
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values);
    let squares: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
    Some((squares / len_as_f64(values.len() - 1)).sqrt())
}

/// Upper median `sorted[len / 2]` of an ascending set; zero when empty.
#[must_use]
pub fn median(sorted: &[f64]) -> f64 {
    sorted.get(sorted.len() / 2).copied().unwrap_or(0.0)
}

/// Converts a count to floating point.
#[allow(clippy::cast_precision_loss, reason = "Sample counts stay far below 2^53.")]
const fn len_as_f64(len: usize) -> f64 {
    len as f64
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp, reason = "Exact values are constructed by the tests.")]

    use super::*;

    #[test]
    fn budget_rounds_half_to_even() {
        assert_eq!(outlier_budget(1, None), 1);
        assert_eq!(outlier_budget(6, None), 1);
        assert_eq!(outlier_budget(9, None), 2);
        assert_eq!(outlier_budget(15, None), 2);
        assert_eq!(outlier_budget(21, None), 4);
        assert_eq!(outlier_budget(10, Some(0)), 0);
    }

    #[test]
    fn inclusive_sigma_keeps_a_lone_spike_in_six() {
        let sorted = [98.0, 99.0, 100.0, 101.0, 102.0, 5000.0];
        let inclusive = trim_outliers(&sorted, OutlierPolicy::SigmaInclusive, 1);
        assert!(inclusive.outliers.is_empty());
        let sigma = trim_outliers(&sorted, OutlierPolicy::Sigma, 1);
        assert_eq!(sigma.outliers, vec![5000.0]);
    }

    #[test]
    fn small_sets_use_the_inclusive_bound() {
        let noisy = trim_outliers(&[100.0, 101.0, 106.0], OutlierPolicy::Sigma, 1);
        assert!(noisy.outliers.is_empty());
        let flat = trim_outliers(&[100.0, 100.0, 100.0, 101.0], OutlierPolicy::Sigma, 1);
        assert!(flat.outliers.is_empty());
    }

    #[test]
    fn zero_deviation_reference_removes_nothing() {
        let sorted = [7.0, 7.0, 7.0, 7.0, 7.0, 9.0];
        assert!(trim_outliers(&sorted, OutlierPolicy::Sigma, 1).outliers.is_empty());
    }

    #[test]
    fn trim_extremes_needs_three_values() {
        let short = trim_outliers(&[1.0, 2.0], OutlierPolicy::TrimExtremes, 1);
        assert_eq!(short.retained, vec![1.0, 2.0]);
        let trimmed = trim_outliers(&[1.0, 2.0, 3.0, 9.0], OutlierPolicy::TrimExtremes, 1);
        assert_eq!(trimmed.retained, vec![2.0, 3.0]);
        assert_eq!(trimmed.outliers, vec![1.0, 9.0]);
    }

    #[test]
    fn median_is_upper_middle() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 3.0);
        assert_eq!(median(&[]), 0.0);
        assert!(sample_stddev(&[5.0]).is_none());
    }
}
