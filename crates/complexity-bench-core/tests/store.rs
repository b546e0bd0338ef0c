// crates/complexity-bench-core/tests/store.rs
// ============================================================================
// Module: Result Store Tests
// Description: Verifies canonical persistence and previous-store loading.
// ============================================================================
//! ## Overview
//! The persisted store must read back equal, re-serialize to identical bytes,
//! leave no temporary files behind, and keep declared extra keys.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::fs;

use complexity_bench_core::EnvironmentSnapshot;
use complexity_bench_core::Profile;
use complexity_bench_core::ResultRecord;
use complexity_bench_core::ResultStore;
use complexity_bench_core::Sample;
use complexity_bench_core::SourceFingerprint;
use complexity_bench_core::TestDefinition;
use complexity_bench_core::TestId;
use complexity_bench_core::TestSpec;
use complexity_bench_core::runtime::StoreError;
use complexity_bench_core::runtime::aggregate_samples;
use complexity_bench_core::runtime::assemble_store;
use complexity_bench_core::runtime::load_store;
use complexity_bench_core::runtime::write_store;
use serde_json::Value;
use serde_json::json;

/// Builds a record with aggregated statistics and an extra declared key.
fn record(id: &str, times: &[f64]) -> (TestId, ResultRecord) {
    let spec: TestSpec = serde_json::from_value(json!({
        "type": "simple",
        "template": ["n", "time_ns"],
        "complexity": "O(log n)",
        "practical_lower_bound": 1,
        "practical_upper_bound": 1e6,
        "owner": {"team": "perf"},
    }))
    .unwrap();
    let source = SourceFingerprint::compute(b"body", &json!({"path": "a.cpp"})).unwrap();
    let definition =
        TestDefinition::derive(TestId::new(id), spec, &[("a.cpp".to_string(), source)]).unwrap();
    let mut samples: Vec<Sample> = times
        .iter()
        .map(|time_ns| Sample {
            n: 1000,
            time_ns: *time_ns,
            micro_repeats: None,
        })
        .collect();
    samples.push(Sample {
        n: 1,
        time_ns: 3.3,
        micro_repeats: None,
    });
    let aggregation = aggregate_samples(&definition.spec, &samples);
    (definition.id.clone(), ResultRecord::fresh(&definition, aggregation.stats, aggregation.max_c))
}

/// Builds a store around the given records.
fn store(records: impl IntoIterator<Item = (TestId, ResultRecord)>) -> ResultStore {
    ResultStore {
        profile: Profile {
            name: "gcc".to_string(),
            build_command: "g++ -O2 -o {output} {source_path} {defines}".to_string(),
            extra: BTreeMap::new(),
        },
        environment: EnvironmentSnapshot {
            platform: "linux".to_string(),
            arch: "x86_64".to_string(),
            harness_version: "0.1.0".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            tsc_freq: Some(2.9),
            probes: BTreeMap::new(),
        },
        results: records.into_iter().collect(),
    }
}

/// Writing then loading yields the same store, and rewriting is byte stable.
#[test]
fn store_round_trips_byte_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    let original = store([record("b", &[0.1, 0.2, 0.30000000000000004]), record("a", &[7.0])]);
    write_store(&path, &original).unwrap();
    let first = fs::read(&path).unwrap();

    let loaded = load_store(&path).unwrap().unwrap();
    assert_eq!(loaded, original);
    write_store(&path, &loaded).unwrap();
    assert_eq!(fs::read(&path).unwrap(), first);
}

/// The file layout carries declared fields and null normalizers.
#[test]
fn persisted_layout_keeps_declared_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("results.json");
    write_store(&path, &store([record("a", &[5.0, 6.0])])).unwrap();
    let value: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    let entry = &value["results"]["a"];
    assert_eq!(entry["owner"], json!({"team": "perf"}));
    assert_eq!(entry["type"], json!("simple"));
    assert!(entry["test_hash"].is_string());
    assert_eq!(entry["stats"][0]["n"], json!(1));
    assert_eq!(entry["stats"][0]["mean_c"], Value::Null);
    assert_eq!(entry["stats"][0]["complexity"], Value::Null);
    assert_eq!(entry["stats"][1]["complexity"], json!(1000_f64.log2()));
    assert_eq!(entry["complexity"], json!("O(log n)"));
}

/// No temporary files remain after a write.
#[test]
fn atomic_write_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    write_store(&path, &store([])).unwrap();
    write_store(&path, &store([record("a", &[1.0])])).unwrap();
    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["results.json".to_string()]);
}

/// A missing file is an empty cache; a corrupt file is an error.
#[test]
fn missing_and_corrupt_stores() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_store(&dir.path().join("absent.json")).unwrap().is_none());
    let corrupt = dir.path().join("corrupt.json");
    fs::write(&corrupt, b"{\"profile\": 3").unwrap();
    assert!(matches!(load_store(&corrupt), Err(StoreError::Parse(_))));
}

/// Reused records replace fresh ones for the same id.
#[test]
fn reused_records_win_during_assembly() {
    let (id, reused) = record("a", &[1.0]);
    let (_, fresh) = record("a", &[2.0]);
    let (other_id, other) = record("b", &[3.0]);
    let assembled = assemble_store(
        store([]).profile,
        EnvironmentSnapshot::default(),
        BTreeMap::from([(id.clone(), reused.clone())]),
        BTreeMap::from([(id.clone(), fresh), (other_id.clone(), other)]),
    );
    assert_eq!(assembled.results[&id], reused);
    assert!(assembled.results.contains_key(&other_id));
}
