// crates/complexity-bench-core/src/runtime/store.rs
// ============================================================================
// Module: Result Store Persistence
// Description: Load the previous snapshot and write the next one atomically.
// Purpose: Keep the persisted store all-or-nothing and byte-stable across runs.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! The store is written as RFC 8785 canonical JSON through a temporary file
//! in the destination directory, synced, then renamed into place. A reader
//! therefore sees either the previous snapshot or the complete new one.
//! Canonical output also means a reused record serializes to the same bytes
//! it was read from.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use thiserror::Error;

use crate::core::hashing::HashError;
use crate::core::hashing::canonical_json_bytes;
use crate::core::identifiers::TestId;
use crate::core::record::EnvironmentSnapshot;
use crate::core::record::Profile;
use crate::core::record::ResultRecord;
use crate::core::record::ResultStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Attempts made to allocate a unique temporary file.
const TEMP_ATTEMPTS: usize = 16;

/// Counter distinguishing temporary files within one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Result store persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the file failed.
    #[error("result store io error: {0}")]
    Io(String),
    /// The previous store is not valid JSON of the expected shape.
    #[error("result store parse error: {0}")]
    Parse(String),
    /// Canonical serialization failed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

// ============================================================================
// SECTION: Load / Assemble / Write
// ============================================================================

/// Loads a previous store; a missing file yields `None`.
///
/// # Errors
///
/// Returns [`StoreError`] when the file exists but cannot be read or parsed.
pub fn load_store(path: &Path) -> Result<Option<ResultStore>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StoreError::Io(format!("{}: {err}", path.display()))),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|err| StoreError::Parse(format!("{}: {err}", path.display())))
}

/// Assembles the final snapshot from reused and fresh records.
///
/// Reused records are never combined with fresh ones for the same id.
#[must_use]
pub fn assemble_store(
    profile: Profile,
    environment: EnvironmentSnapshot,
    reused: BTreeMap<TestId, ResultRecord>,
    fresh: BTreeMap<TestId, ResultRecord>,
) -> ResultStore {
    let mut results = fresh;
    results.extend(reused);
    ResultStore {
        profile,
        environment,
        results,
    }
}

/// Writes a store as canonical JSON, atomically.
///
/// # Errors
///
/// Returns [`StoreError`] when serialization or the write fails.
pub fn write_store(path: &Path, store: &ResultStore) -> Result<(), StoreError> {
    let bytes = canonical_json_bytes(store)?;
    write_atomic(path, &bytes)
}

/// Writes bytes to `path` through a synced temporary file and a rename.
///
/// # Errors
///
/// Returns [`StoreError::Io`] when any filesystem step fails.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| StoreError::Io(err.to_string()))?;
    }
    let (temp_path, mut file) = create_temp_output(path)?;
    if let Err(err) = file.write_all(bytes) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::Io(err.to_string()));
    }
    if let Err(err) = file.sync_all() {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::Io(err.to_string()));
    }
    drop(file);
    persist_temp_output(&temp_path, path)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Creates a uniquely named temporary file next to `path`.
fn create_temp_output(path: &Path) -> Result<(PathBuf, fs::File), StoreError> {
    let parent = path.parent().filter(|parent| !parent.as_os_str().is_empty());
    let parent = parent.unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StoreError::Io("output path does not include a file name".to_string()))?;
    for _ in 0 .. TEMP_ATTEMPTS {
        let attempt = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_path = parent.join(format!(".{file_name}.tmp.{}.{attempt}", std::process::id()));
        match OpenOptions::new().write(true).create_new(true).open(&temp_path) {
            Ok(file) => return Ok((temp_path, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) => return Err(StoreError::Io(err.to_string())),
        }
    }
    Err(StoreError::Io("failed to allocate temporary output path".to_string()))
}

/// Moves the temporary file over the destination.
fn persist_temp_output(temp_path: &Path, path: &Path) -> Result<(), StoreError> {
    match fs::rename(temp_path, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            if path.exists() {
                fs::remove_file(path).map_err(|err| StoreError::Io(err.to_string()))?;
                fs::rename(temp_path, path).map_err(|err| StoreError::Io(err.to_string()))?;
                return Ok(());
            }
            let _ = fs::remove_file(temp_path);
            Err(StoreError::Io(err.to_string()))
        }
    }
}
