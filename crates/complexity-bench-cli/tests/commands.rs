// crates/complexity-bench-cli/tests/commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests driving the `complexity-bench` binary.
// Purpose: Ensure sweeps reuse cached records and utilities report correctly.
// Dependencies: complexity-bench-cli binary
// ============================================================================
//! ## Overview
//! Builds a small benchmark tree in a temporary directory and runs the
//! binary against it: dry runs and their reuse, multi-profile sweeps with the
//! results index, config validation, store summaries, and failure exits.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn complexity_bench_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_complexity-bench"))
}

/// Writes a benchmark tree with one source feeding `misc.sort` and `misc.scan`.
fn write_tree(root: &Path, build_command: &str, source_body: &str) {
    let benchmarks = root.join("benchmarks");
    fs::create_dir_all(&benchmarks).unwrap();
    fs::write(benchmarks.join("misc.sh"), source_body).unwrap();
    let test = |complexity: &str| {
        json!({
            "type": "simple",
            "template": ["n", "time_ns"],
            "complexity": complexity,
            "practical_lower_bound": 1,
            "practical_upper_bound": 1000,
        })
    };
    let unit = json!({
        "sources": [{"path": "misc.sh", "input": {"type": "sizes", "values": [10, 100]}, "repeats": 3}],
        "tests": {"misc.sort": test("O(n log n)"), "misc.scan": test("O(n)")},
    });
    fs::write(benchmarks.join("misc.json"), serde_json::to_vec_pretty(&unit).unwrap()).unwrap();
    let profiles = json!({
        "gcc O3": {"name": "GCC -O3", "build_command": build_command},
        "clang O2": {"name": "Clang -O2", "build_command": build_command},
    });
    fs::write(root.join("profiles.json"), serde_json::to_vec_pretty(&profiles).unwrap()).unwrap();
}

/// Runs the binary in `root` with `args`.
fn run_in(root: &Path, args: &[&str]) -> Output {
    Command::new(complexity_bench_bin())
        .current_dir(root)
        .env_remove("COMPLEXITY_BENCH_PROFILES")
        .args(args)
        .output()
        .expect("run complexity-bench")
}

fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

/// Dry-run tree with placeholder-only build commands.
fn dry_tree() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    write_tree(root.path(), "c++ -o {output} {source_path} {defines}", "unused");
    root
}

const DRY_RUN: &[&str] = &["run", "--dry-run", "--no-probe", "--quiet-output"];

// ============================================================================
// SECTION: Tests
// ============================================================================

/// A dry run writes every test, and a second run reuses them verbatim.
#[test]
fn dry_run_results_are_reused_on_the_next_run() {
    let root = dry_tree();
    let first = run_in(root.path(), DRY_RUN);
    assert!(first.status.success(), "stderr: {}", String::from_utf8_lossy(&first.stderr));
    let store = read_json(&root.path().join("results.json"));
    assert_eq!(store["profile"]["name"], "GCC -O3");
    let results = store["results"].clone();
    assert_eq!(results["misc.sort"]["stats"].as_array().unwrap().len(), 2);
    assert_eq!(results["misc.sort"]["source_files"][0], "benchmarks/misc.sh");

    let second = run_in(root.path(), DRY_RUN);
    assert!(second.status.success());
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(stderr.contains("Reusing cached result for misc.sort."), "stderr: {stderr}");
    assert!(stderr.contains("Skipping benchmarks/misc.sh"), "stderr: {stderr}");
    assert_eq!(read_json(&root.path().join("results.json"))["results"], results);
}

/// Changing the profile invalidates every cached record.
#[test]
fn profile_switch_reruns_everything() {
    let root = dry_tree();
    assert!(run_in(root.path(), DRY_RUN).status.success());
    let mut args = DRY_RUN.to_vec();
    args.extend(["--profile", "clang O2"]);
    let output = run_in(root.path(), &args);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Profile changed since results.json was written"), "stderr: {stderr}");
    assert!(!stderr.contains("Reusing cached result"));
    assert_eq!(read_json(&root.path().join("results.json"))["profile"]["name"], "Clang -O2");
}

/// `run-all` writes one store per profile and a sorted index.
#[test]
fn run_all_writes_stores_and_index() {
    let root = dry_tree();
    let output = run_in(
        root.path(),
        &["run-all", "--device", "pi5", "--dry-run", "--no-probe", "--quiet-output"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(root.path().join("results/pi5_gcc_O3.json").exists());
    assert!(root.path().join("results/pi5_clang_O2.json").exists());
    let index = read_json(&root.path().join("results_index.json"));
    let names: Vec<&str> =
        index.as_array().unwrap().iter().map(|entry| entry["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["pi5 clang O2", "pi5 gcc O3"]);

    assert!(run_in(root.path(), &["run-all", "--device", "pi5", "--dry-run", "--no-probe"])
        .status
        .success());
    assert_eq!(read_json(&root.path().join("results_index.json")).as_array().unwrap().len(), 2);
}

/// `config validate` reports counts without running anything.
#[test]
fn config_validate_reports_counts() {
    let root = dry_tree();
    let output = run_in(root.path(), &["config", "validate"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "Config valid: 1 config units, 1 source files, 2 tests.");
    assert!(!root.path().join("results.json").exists());
}

/// `store summary` lists the profile and each test.
#[test]
fn store_summary_lists_tests() {
    let root = dry_tree();
    assert!(run_in(root.path(), DRY_RUN).status.success());
    let output = run_in(root.path(), &["store", "summary", "results.json"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "Profile: GCC -O3");
    assert!(lines[1].starts_with("misc.scan: 2 sizes, max_c="));
    assert!(lines[2].starts_with("misc.sort: 2 sizes, max_c="));

    let missing = run_in(root.path(), &["store", "summary", "absent.json"]);
    assert!(!missing.status.success());
}

/// An unknown profile fails before anything runs and lists the choices.
#[test]
fn unknown_profile_fails_closed() {
    let root = dry_tree();
    let mut args = DRY_RUN.to_vec();
    args.extend(["--profile", "msvc"]);
    let output = run_in(root.path(), &args);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("gcc O3 (GCC -O3)"), "stderr: {stderr}");
    assert!(!root.path().join("results.json").exists());
}

/// JSON log lines go to the requested log file.
#[test]
fn log_file_receives_json_events() {
    let root = dry_tree();
    let mut args = DRY_RUN.to_vec();
    args.extend(["--log-format", "json", "--log-file", "events.jsonl"]);
    assert!(run_in(root.path(), &args).status.success());
    let log = fs::read_to_string(root.path().join("events.jsonl")).unwrap();
    let events: Vec<Value> = log.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(events.first().unwrap()["event"], "plan_loaded");
    assert_eq!(events.last().unwrap()["event"], "store_written");
}

/// A shell "toolchain" builds and runs real processes.
#[cfg(unix)]
#[test]
fn shell_toolchain_runs_programs() {
    let root = tempfile::tempdir().unwrap();
    write_tree(
        root.path(),
        "cp {source_path} {output} && chmod +x {output} # {defines}",
        "#!/bin/sh\necho \"misc.sort: 10 500\"\necho \"misc.scan: 10 40\"\n",
    );
    let output = run_in(root.path(), &["run", "--no-probe", "--quiet-output"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let store = read_json(&root.path().join("results.json"));
    let stats = store["results"]["misc.sort"]["stats"].as_array().unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0]["n"], 10);
    assert_eq!(stats[0]["mean"], 500.0);
    assert_eq!(stats[0]["samples"], 6);
}

/// A failing build exits non-zero but still writes the store.
#[cfg(unix)]
#[test]
fn failing_build_still_writes_store() {
    let root = tempfile::tempdir().unwrap();
    write_tree(root.path(), "false {output} {source_path}", "unused");
    let output = run_in(root.path(), &["run", "--no-probe"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("build command failed"), "stderr: {stderr}");
    let store = read_json(&root.path().join("results.json"));
    assert!(store["results"].as_object().unwrap().is_empty());
}

/// `--version` prints the package version.
#[test]
fn version_flag_prints_version() {
    let root = tempfile::tempdir().unwrap();
    let output = run_in(root.path(), &["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("complexity-bench {}", env!("CARGO_PKG_VERSION")));
}
