// crates/complexity-bench-cli/src/index.rs
// ============================================================================
// Module: Results Index
// Description: List of result stores produced by multi-profile sweeps.
// Purpose: Let report tooling find every device and profile combination.
// Dependencies: complexity-bench-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The index is a JSON array of `{name, path}` entries sorted by name. An
//! entry is replaced when a later sweep writes the same path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use complexity_bench_core::runtime::write_atomic;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Results index errors.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Reading or writing the index failed.
    #[error("results index io error: {0}")]
    Io(String),
    /// The index is not a list of entries.
    #[error("results index parse error: {0}")]
    Parse(String),
}

/// One result store listed in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// `<device> <profile key>`.
    pub name: String,
    /// Result store path as written.
    pub path: String,
}

/// Ordered list of result stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsIndex {
    /// Entries sorted by name.
    entries: Vec<IndexEntry>,
}

impl ResultsIndex {
    /// Loads an index; a missing file yields an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(IndexError::Io(format!("{}: {err}", path.display()))),
        };
        let entries = serde_json::from_slice(&bytes)
            .map_err(|err| IndexError::Parse(format!("{}: {err}", path.display())))?;
        Ok(Self {
            entries,
        })
    }

    /// Adds an entry, replacing any entry with the same path.
    pub fn upsert(&mut self, entry: IndexEntry) {
        self.entries.retain(|existing| existing.path != entry.path);
        self.entries.push(entry);
        self.entries.sort_by(|left, right| left.name.cmp(&right.name));
    }

    /// Returns the entries in name order.
    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Writes the index atomically.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Io`] when serialization or the write fails.
    pub fn write(&self, path: &Path) -> Result<(), IndexError> {
        let bytes =
            serde_json::to_vec(&self.entries).map_err(|err| IndexError::Io(err.to_string()))?;
        write_atomic(path, &bytes).map_err(|err| IndexError::Io(err.to_string()))
    }
}

/// Returns the result store file name for a device and profile key.
#[must_use]
pub fn output_file_name(device: &str, key: &str) -> String {
    format!("{device}_{}.json", key.replace(' ', "_"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::*;

    fn entry(name: &str, path: &str) -> IndexEntry {
        IndexEntry {
            name: name.to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn upsert_replaces_same_path_and_sorts_by_name() {
        let mut index = ResultsIndex::default();
        index.upsert(entry("laptop gcc O3", "results/laptop_gcc_O3.json"));
        index.upsert(entry("desk clang", "results/desk_clang.json"));
        index.upsert(entry("laptop gcc O3 (again)", "results/laptop_gcc_O3.json"));
        let names: Vec<&str> = index.entries().iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["desk clang", "laptop gcc O3 (again)"]);
    }

    #[test]
    fn missing_index_loads_empty_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results_index.json");
        let mut index = ResultsIndex::load(&path).unwrap();
        assert!(index.entries().is_empty());
        index.upsert(entry("a", "results/a.json"));
        index.write(&path).unwrap();
        assert_eq!(ResultsIndex::load(&path).unwrap(), index);
    }

    #[test]
    fn file_names_replace_spaces() {
        assert_eq!(output_file_name("pi5", "gcc O3 native"), "pi5_gcc_O3_native.json");
    }
}
