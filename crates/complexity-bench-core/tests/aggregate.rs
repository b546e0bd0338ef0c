// crates/complexity-bench-core/tests/aggregate.rs
// ============================================================================
// Module: Sample Aggregator Tests
// Description: Verifies outlier trimming, normalization, and max_c selection.
// ============================================================================
//! ## Overview
//! Covers the worked trimming scenario, normalization edge cases, practical
//! range selection, and property tests for the removal budget and threshold.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::float_cmp,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use complexity_bench_core::ComplexityClass;
use complexity_bench_core::OutlierPolicy;
use complexity_bench_core::Sample;
use complexity_bench_core::TestSpec;
use complexity_bench_core::runtime::AggregationNote;
use complexity_bench_core::runtime::aggregate::MIN_EXCLUSIVE_REFERENCE;
use complexity_bench_core::runtime::aggregate::SIGMA_MULTIPLIER;
use complexity_bench_core::runtime::aggregate::aggregate_samples;
use complexity_bench_core::runtime::aggregate::median;
use complexity_bench_core::runtime::aggregate::outlier_budget;
use complexity_bench_core::runtime::aggregate::sample_stddev;
use complexity_bench_core::runtime::aggregate::trim_outliers;
use proptest::prelude::*;
use serde_json::json;

/// Builds a simple test declaration.
fn spec(complexity: &str, lower: u64, upper: u64) -> TestSpec {
    serde_json::from_value(json!({
        "type": "simple",
        "template": ["n", "time_ns"],
        "complexity": complexity,
        "practical_lower_bound": lower,
        "practical_upper_bound": upper,
    }))
    .expect("spec")
}

/// Builds samples at one size.
fn samples(n: u64, times: &[f64]) -> Vec<Sample> {
    times
        .iter()
        .map(|time_ns| Sample {
            n,
            time_ns: *time_ns,
            micro_repeats: None,
        })
        .collect()
}

/// A lone scheduling spike is removed and normalization uses n log n.
#[test]
fn sort_bench_scenario_trims_the_spike() {
    let spec = spec("O(n log n)", 100, 100_000);
    let aggregation =
        aggregate_samples(&spec, &samples(1000, &[100.0, 101.0, 99.0, 98.0, 5000.0, 102.0]));
    let stat = &aggregation.stats[0];
    assert_eq!(stat.complexity, Some(1000.0 * 1000_f64.log2()));
    assert_eq!(stat.outliers, vec![5000.0]);
    assert_eq!(stat.samples, 5);
    assert_eq!(stat.mean, 100.0);
    assert!(stat.stddev < 2.0);
    assert_eq!(stat.raw_values, vec![98.0, 99.0, 100.0, 101.0, 102.0, 5000.0]);
    let expected_c = 100.0 / (1000.0 * 1000_f64.log2());
    assert!((stat.mean_c.unwrap() - expected_c).abs() < 1e-12);
    assert_eq!(aggregation.max_c, stat.mean_c.unwrap());
    assert!(matches!(
        &aggregation.notes[0],
        AggregationNote::OutliersRemoved { n: 1000, removed, .. } if removed == &vec![5000.0]
    ));
}

/// Ordinary noise in a short run is not treated as an outlier.
#[test]
fn short_noisy_runs_keep_every_value() {
    let spec = spec("O(n)", 1, 100);
    let mut all = samples(10, &[100.0, 101.0, 106.0]);
    all.extend(samples(20, &[100.0, 100.0, 100.0, 101.0]));
    let aggregation = aggregate_samples(&spec, &all);
    assert!(aggregation.stats.iter().all(|stat| stat.outliers.is_empty()));
    assert_eq!(aggregation.stats[0].samples, 3);
    assert_eq!(aggregation.stats[1].mean, 100.25);
    assert!(aggregation.notes.is_empty());
}

/// Complexity values match their closed forms.
#[test]
fn complexity_values_follow_closed_forms() {
    for n in [1, 7, 1000] {
        assert_eq!(ComplexityClass::Constant.evaluate(n), 1.0);
    }
    assert_eq!(ComplexityClass::Linear.evaluate(12345), 12345.0);
    assert_eq!(ComplexityClass::Quadratic.evaluate(100), 10000.0);
    assert_eq!(ComplexityClass::Cubic.evaluate(10), 1000.0);
    assert_eq!(ComplexityClass::SquareRoot.evaluate(16), 4.0);
    assert_eq!(ComplexityClass::SquareRootOverLog.evaluate(16), 1.0);
}

/// Only sizes inside the practical range count toward max_c.
#[test]
fn max_c_ignores_sizes_outside_the_range() {
    let spec = spec("O(n)", 10, 100);
    let mut all = samples(1, &[500.0]);
    all.extend(samples(10, &[50.0]));
    all.extend(samples(100, &[300.0]));
    all.extend(samples(1000, &[9_000_000.0]));
    let aggregation = aggregate_samples(&spec, &all);
    assert_eq!(aggregation.stats.len(), 4);
    assert_eq!(aggregation.max_c, 5.0);
}

/// With no size in range the constant is zero.
#[test]
fn max_c_is_zero_without_sizes_in_range() {
    let spec = spec("O(n)", 10_000, 20_000);
    let aggregation = aggregate_samples(&spec, &samples(10, &[40.0, 41.0]));
    assert_eq!(aggregation.max_c, 0.0);
}

/// Repeat counts divide the elapsed time before aggregation.
#[test]
fn micro_repeats_yield_per_operation_cost() {
    let spec = spec("O(1)", 0, 10);
    let sample = Sample {
        n: 4,
        time_ns: 1_000.0,
        micro_repeats: Some(250.0),
    };
    let aggregation = aggregate_samples(&spec, &[sample]);
    assert_eq!(aggregation.stats[0].mean, 4.0);
}

/// A single retained value reports zero deviation and a precision note.
#[test]
fn single_sample_falls_back_to_zero_deviation() {
    let spec = spec("O(n)", 0, 10);
    let aggregation = aggregate_samples(&spec, &samples(8, &[64.0]));
    assert_eq!(aggregation.stats[0].stddev, 0.0);
    assert_eq!(aggregation.notes, vec![AggregationNote::PrecisionFallback { n: 8 }]);
}

/// log2(1) = 0 leaves normalized fields empty and out of max_c.
#[test]
fn degenerate_normalizer_is_excluded() {
    let spec = spec("O(log n)", 0, 10);
    let mut all = samples(1, &[10.0, 10.0]);
    all.extend(samples(4, &[8.0, 8.0]));
    let aggregation = aggregate_samples(&spec, &all);
    assert!(aggregation.stats[0].mean_c.is_none());
    assert!(aggregation.stats[0].stddev_c.is_none());
    assert_eq!(aggregation.max_c, 4.0);
}

/// Sizes without samples produce no entry.
#[test]
fn missing_sizes_are_absent() {
    let spec = spec("O(n)", 0, 10);
    let aggregation = aggregate_samples(&spec, &[]);
    assert!(aggregation.stats.is_empty());
    assert_eq!(aggregation.max_c, 0.0);
}

/// The declared budget caps removals.
#[test]
fn declared_zero_budget_keeps_everything() {
    let mut spec = spec("O(n)", 0, 10);
    spec.max_outlier = Some(0);
    let aggregation =
        aggregate_samples(&spec, &samples(2, &[1.0, 1.0, 1.0, 1.0, 1.0, 1_000_000.0]));
    assert!(aggregation.stats[0].outliers.is_empty());
    assert_eq!(aggregation.stats[0].samples, 6);
}

/// The fixed trim policy drops one value from each end.
#[test]
fn trim_extremes_policy_applies_per_test() {
    let mut spec = spec("O(n)", 0, 10);
    spec.outlier_policy = Some(OutlierPolicy::TrimExtremes);
    let aggregation = aggregate_samples(&spec, &samples(2, &[1.0, 5.0, 6.0, 7.0, 100.0]));
    assert_eq!(aggregation.stats[0].outliers, vec![1.0, 100.0]);
    assert_eq!(aggregation.stats[0].mean, 6.0);
}

proptest! {
    #[test]
    fn removals_respect_budget_and_threshold(
        mut values in prop::collection::vec(1.0f64 .. 1.0e6, 1 .. 40),
        inclusive in any::<bool>(),
    ) {
        values.sort_by(f64::total_cmp);
        let policy = if inclusive { OutlierPolicy::SigmaInclusive } else { OutlierPolicy::Sigma };
        let budget = outlier_budget(values.len(), None);
        let trimmed = trim_outliers(&values, policy, budget);

        prop_assert!(trimmed.outliers.len() <= budget);
        prop_assert_eq!(trimmed.retained.len() + trimmed.outliers.len(), values.len());

        let mut current = values.clone();
        for removed in trimmed.outliers.iter().rev() {
            let candidate = current.pop().unwrap();
            prop_assert_eq!(candidate, *removed);
            let reference: Vec<f64> = if inclusive || current.len() < MIN_EXCLUSIVE_REFERENCE {
                let mut with_candidate = current.clone();
                with_candidate.push(candidate);
                with_candidate
            } else {
                current.clone()
            };
            let stddev = sample_stddev(&reference).unwrap();
            prop_assert!(stddev > 0.0);
            prop_assert!(candidate > median(&reference) + SIGMA_MULTIPLIER * stddev);
        }
        prop_assert_eq!(current, trimmed.retained);
    }

    #[test]
    fn default_budget_is_at_least_one(count in 0usize .. 10_000) {
        let budget = outlier_budget(count, None);
        prop_assert!(budget >= 1);
        prop_assert!(budget <= count / 6 + 1);
    }

    #[test]
    fn max_c_is_the_largest_in_range_mean(
        means in prop::collection::btree_map(1u64 .. 2000, 1.0f64 .. 1.0e4, 1 .. 12),
    ) {
        let spec = spec("O(n)", 100, 1000);
        let all: Vec<Sample> = means
            .iter()
            .map(|(n, time_ns)| Sample { n: *n, time_ns: *time_ns, micro_repeats: None })
            .collect();
        let aggregation = aggregate_samples(&spec, &all);
        let expected = means
            .iter()
            .filter(|(n, _)| (100 ..= 1000).contains(*n))
            .map(|(n, time_ns)| time_ns / *n as f64)
            .fold(0.0, f64::max);
        prop_assert_eq!(aggregation.max_c, expected);
    }
}
