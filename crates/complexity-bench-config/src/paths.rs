// crates/complexity-bench-config/src/paths.rs
// ============================================================================
// Module: Config Paths and Limits
// Description: Path resolution and bounded reads for config inputs.
// Purpose: Enforce hard size and path limits on every file the config reads.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Config inputs are resolved from an explicit path, then an environment
//! override, then a default name. Every path is length checked and every
//! read is size bounded before its bytes are parsed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::error::ConfigError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a config unit or profiles file in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum size of a benchmark source or prelude file in bytes.
pub const MAX_SOURCE_FILE_SIZE: usize = 16 * 1024 * 1024;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves a config path from an explicit value, `env_var`, or `default`.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the environment value is too long.
pub fn resolve_path(
    explicit: Option<&Path>,
    env_var: &str,
    default: &str,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(env_var) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid(format!("{env_var} exceeds max path length")));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(default))
}

/// Validates a path against length limits.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the path or a component is too long.
pub fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("path exceeds max length: {text}")));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("path component too long in {text}")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

/// Reads a file after validating its path and checking it against `limit`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read and
/// [`ConfigError::Invalid`] when it exceeds `limit`.
pub fn read_bounded(path: &Path, limit: usize) -> Result<Vec<u8>, ConfigError> {
    validate_path(path)?;
    let io_error = |err: std::io::Error| ConfigError::Io(format!("{}: {err}", path.display()));
    let size = fs::metadata(path).map_err(io_error)?.len();
    if size > u64::try_from(limit).unwrap_or(u64::MAX) {
        return Err(ConfigError::Invalid(format!(
            "{} is {size} bytes (limit {limit})",
            path.display()
        )));
    }
    let bytes = fs::read(path).map_err(io_error)?;
    if bytes.len() > limit {
        return Err(ConfigError::Invalid(format!(
            "{} is {} bytes (limit {limit})",
            path.display(),
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Reads a UTF-8 config file within [`MAX_CONFIG_FILE_SIZE`].
///
/// # Errors
///
/// Returns [`ConfigError`] when reading fails or the file is not UTF-8.
pub fn read_config_text(path: &Path) -> Result<String, ConfigError> {
    let bytes = read_bounded(path, MAX_CONFIG_FILE_SIZE)?;
    String::from_utf8(bytes)
        .map_err(|_| ConfigError::Invalid(format!("{} must be utf-8", path.display())))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::*;

    #[test]
    fn explicit_path_wins_over_default() {
        let resolved =
            resolve_path(Some(Path::new("custom.json")), "COMPLEXITY_BENCH_UNSET_VAR", "d.json")
                .unwrap();
        assert_eq!(resolved, PathBuf::from("custom.json"));
        let fallback = resolve_path(None, "COMPLEXITY_BENCH_UNSET_VAR", "d.json").unwrap();
        assert_eq!(fallback, PathBuf::from("d.json"));
    }

    #[test]
    fn overlong_component_is_rejected() {
        let long = "x".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        let path = PathBuf::from("dir").join(long);
        assert!(matches!(validate_path(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn oversized_file_is_rejected_before_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.json");
        fs::write(&path, vec![b' '; 32]).unwrap();
        assert!(matches!(read_bounded(&path, 16), Err(ConfigError::Invalid(_))));
        assert_eq!(read_bounded(&path, 32).unwrap().len(), 32);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(read_config_text(&missing), Err(ConfigError::Io(_))));
    }
}
