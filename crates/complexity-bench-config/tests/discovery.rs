// crates/complexity-bench-config/tests/discovery.rs
// ============================================================================
// Module: Config Discovery Tests
// Description: Verifies unit discovery, validation, filtering, and overrides.
// ============================================================================
//! ## Overview
//! Builds config trees in temporary directories and checks the resulting
//! plan: visit order, per-unit fingerprints, fail-closed validation, the
//! duplicate policy, prefix-anchored filtering, and prelude fingerprinting.

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

use std::fs;
use std::path::Path;

use complexity_bench_config::ConfigError;
use complexity_bench_config::DiscoveryOptions;
use complexity_bench_config::TestFilter;
use complexity_bench_config::discover;
use complexity_bench_core::TestId;
use serde_json::Value;
use serde_json::json;

/// Writes a unit declaring `tests` fed by one source file with `body`.
fn write_unit(dir: &Path, unit: &str, source: &str, body: &str, tests: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(source), body).unwrap();
    let declared: serde_json::Map<String, Value> = tests
        .iter()
        .map(|id| {
            (
                (*id).to_string(),
                json!({
                    "type": "simple",
                    "template": ["n", "time_ns"],
                    "complexity": "O(n)",
                    "practical_lower_bound": 10,
                    "practical_upper_bound": 1000,
                }),
            )
        })
        .collect();
    let config = json!({
        "sources": [{"path": source, "input": {"type": "sizes", "values": [100, 10]}, "repeats": 2}],
        "tests": declared,
    });
    fs::write(dir.join(unit), serde_json::to_vec_pretty(&config).unwrap()).unwrap();
}

/// Units are visited in sorted order and each source feeds its unit's tests.
#[test]
fn directory_walk_is_sorted_and_unit_scoped() {
    let root = tempfile::tempdir().unwrap();
    write_unit(&root.path().join("b"), "b.json", "b.cpp", "b", &["b.one"]);
    write_unit(&root.path().join("a"), "a.json", "a.cpp", "a", &["a.one", "a.two"]);
    fs::write(root.path().join("notes.txt"), "ignored").unwrap();

    let discovered = discover(root.path(), &DiscoveryOptions::default()).unwrap();
    let names: Vec<String> = discovered
        .units
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.json".to_string(), "b.json".to_string()]);

    let plan = &discovered.plan;
    assert_eq!(plan.sources.len(), 2);
    assert_eq!(plan.sources[0].tests, vec![TestId::new("a.one"), TestId::new("a.two")]);
    assert_eq!(plan.sources[0].repeats, 2);
    assert_eq!(plan.sources[0].sizes.iter().map(|point| point.n).collect::<Vec<_>>(), vec![10, 100]);
    assert_eq!(plan.sources[0].sizes[0].defines["BENCHMARK_N"], "10");

    let a_one = &plan.tests[&TestId::new("a.one")];
    let b_one = &plan.tests[&TestId::new("b.one")];
    assert_eq!(a_one.source_files, vec![plan.sources[0].display.clone()]);
    assert_ne!(a_one.source_hash, b_one.source_hash);
}

/// Editing one unit's source leaves the other unit's fingerprints alone.
#[test]
fn source_edits_only_move_their_own_tests() {
    let root = tempfile::tempdir().unwrap();
    write_unit(&root.path().join("a"), "a.json", "a.cpp", "one", &["a.one"]);
    write_unit(&root.path().join("b"), "b.json", "b.cpp", "two", &["b.one"]);
    let before = discover(root.path(), &DiscoveryOptions::default()).unwrap().plan;

    fs::write(root.path().join("a").join("a.cpp"), "one edited").unwrap();
    let after = discover(root.path(), &DiscoveryOptions::default()).unwrap().plan;

    let a = TestId::new("a.one");
    let b = TestId::new("b.one");
    assert_ne!(before.tests[&a].test_hash, after.tests[&a].test_hash);
    assert_eq!(before.tests[&b].test_hash, after.tests[&b].test_hash);
}

/// Duplicate ids fail by default and override with the later unit when allowed.
#[test]
fn duplicate_ids_follow_the_override_policy() {
    let root = tempfile::tempdir().unwrap();
    write_unit(&root.path().join("a"), "a.json", "a.cpp", "a", &["shared"]);
    write_unit(&root.path().join("b"), "b.json", "b.cpp", "b", &["shared"]);

    let error = discover(root.path(), &DiscoveryOptions::default()).unwrap_err();
    assert!(matches!(error, ConfigError::Invalid(message) if message.contains("duplicate test id shared")));

    let options = DiscoveryOptions {
        allow_overrides: true,
        ..DiscoveryOptions::default()
    };
    let discovered = discover(root.path(), &options).unwrap();
    assert_eq!(discovered.overrides.len(), 1);
    assert!(discovered.overrides[0].replacement.ends_with("b.json"));
    let plan = &discovered.plan;
    assert_eq!(plan.sources.len(), 1);
    assert!(plan.sources[0].display.ends_with("b.cpp"));
    assert_eq!(plan.tests[&TestId::new("shared")].source_files, vec![plan.sources[0].display.clone()]);
}

/// The filter matches at the start of the id only.
#[test]
fn test_filter_is_prefix_anchored() {
    let root = tempfile::tempdir().unwrap();
    write_unit(root.path(), "unit.json", "s.cpp", "s", &["misc.sort", "math.sort", "misc.strlen"]);
    let options = DiscoveryOptions {
        test_filter: Some(TestFilter::new("misc").unwrap()),
        ..DiscoveryOptions::default()
    };
    let plan = discover(root.path(), &options).unwrap().plan;
    let ids: Vec<&str> = plan.tests.keys().map(TestId::as_str).collect();
    assert_eq!(ids, vec!["misc.sort", "misc.strlen"]);
    assert_eq!(plan.sources[0].tests.len(), 2);

    let options = DiscoveryOptions {
        test_filter: Some(TestFilter::new("sort").unwrap()),
        ..DiscoveryOptions::default()
    };
    let plan = discover(root.path(), &options).unwrap().plan;
    assert!(plan.tests.is_empty());
    assert!(plan.sources.is_empty());
}

/// Invalid declarations and missing sources fail before anything runs.
#[test]
fn invalid_units_fail_closed() {
    let root = tempfile::tempdir().unwrap();
    let unit = root.path().join("unit.json");

    fs::write(&unit, r#"{"tests": {"t": {"type": "simple", "template": ["n"], "complexity": "O(n)", "practical_lower_bound": 1, "practical_upper_bound": 2}}}"#).unwrap();
    assert!(matches!(discover(&unit, &DiscoveryOptions::default()), Err(ConfigError::Invalid(_))));

    fs::write(&unit, r#"{"tests": {"t": {"type": "simple", "template": ["n", "time_ns"], "complexity": "O(n!)", "practical_lower_bound": 1, "practical_upper_bound": 2}}}"#).unwrap();
    assert!(matches!(discover(&unit, &DiscoveryOptions::default()), Err(ConfigError::Parse(_))));

    fs::write(&unit, r#"{"sources": [{"path": "absent.cpp", "input": {"type": "sizes", "values": [1]}}]}"#).unwrap();
    assert!(matches!(discover(&unit, &DiscoveryOptions::default()), Err(ConfigError::Io(_))));

    fs::write(root.path().join("s.cpp"), "s").unwrap();
    fs::write(&unit, r#"{"sources": [{"path": "s.cpp", "input": {"type": "sizes", "values": [1]}, "repeats": 0}]}"#).unwrap();
    assert!(matches!(discover(&unit, &DiscoveryOptions::default()), Err(ConfigError::Invalid(_))));

    fs::write(&unit, "{not json").unwrap();
    assert!(matches!(discover(&unit, &DiscoveryOptions::default()), Err(ConfigError::Parse(_))));
}

/// The prelude contributes to every fingerprint.
#[test]
fn prelude_changes_move_every_test_hash() {
    let root = tempfile::tempdir().unwrap();
    let units = root.path().join("units");
    write_unit(&units, "unit.json", "s.cpp", "#include \"utils.h\"\n", &["t"]);
    let prelude = root.path().join("utils.h");
    fs::write(&prelude, "#define X 1\n").unwrap();
    let options = DiscoveryOptions {
        prelude: Some(prelude.clone()),
        ..DiscoveryOptions::default()
    };
    let first = discover(&units, &options).unwrap().plan;
    fs::write(&prelude, "#define X 2\n").unwrap();
    let second = discover(&units, &options).unwrap().plan;
    let id = TestId::new("t");
    assert_ne!(first.tests[&id].test_hash, second.tests[&id].test_hash);
    assert_eq!(first.tests[&id].source_files.len(), 2);
}

/// A symlink pointing back up the tree is not followed.
#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_descended() {
    let root = tempfile::tempdir().unwrap();
    write_unit(&root.path().join("a"), "a.json", "a.cpp", "a", &["a.one"]);
    std::os::unix::fs::symlink(root.path(), root.path().join("a").join("loop")).unwrap();

    let discovered = discover(root.path(), &DiscoveryOptions::default()).unwrap();
    assert_eq!(discovered.units.len(), 1);
    assert_eq!(discovered.plan.tests.len(), 1);
}
