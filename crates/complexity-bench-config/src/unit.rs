// crates/complexity-bench-config/src/unit.rs
// ============================================================================
// Module: Config Units
// Description: On-disk shape of one config unit and its source entries.
// Purpose: Parse a unit while keeping each declaration exactly as written.
// Dependencies: complexity-bench-core, serde, serde_json
// ============================================================================

//! ## Overview
//! A config unit is a JSON object `{sources?: [...], tests?: {...}}`.
//! Source and test declarations are kept as raw JSON next to their typed
//! form: the raw source object feeds the source config digest, and unknown
//! keys on either survive into fingerprints.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use complexity_bench_core::SizePoint;
use complexity_bench_core::TestId;
use complexity_bench_core::TestSpec;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::ConfigError;
use crate::generator::GeneratorParams;
use crate::generator::explicit_points;

// ============================================================================
// SECTION: Source Entries
// ============================================================================

/// Size input of a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputSpec {
    /// Sizes picked from the candidate ladder.
    Generator {
        /// Ladder parameters.
        #[serde(default)]
        params: GeneratorParams,
    },
    /// Explicit sizes.
    Sizes {
        /// Sizes to sweep.
        values: Vec<u64>,
    },
}

impl InputSpec {
    /// Expands the input into ascending size points.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the input cannot produce sizes.
    pub fn points(&self) -> Result<Vec<SizePoint>, ConfigError> {
        match self {
            Self::Generator {
                params,
            } => {
                params.validate()?;
                Ok(params.points())
            }
            Self::Sizes {
                values,
            } => {
                if values.is_empty() {
                    return Err(ConfigError::Invalid("sizes input declares no values".to_string()));
                }
                Ok(explicit_points(values))
            }
        }
    }
}

/// Declared source entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Source path relative to the unit's directory.
    pub path: String,
    /// Size input.
    pub input: InputSpec,
    /// Runs per size point.
    #[serde(default = "default_repeats")]
    pub repeats: u32,
    /// Additional declared keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Default runs per size point.
const fn default_repeats() -> u32 {
    1
}

impl SourceEntry {
    /// Validates the entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a field is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::Invalid("source path must be non-empty".to_string()));
        }
        if self.repeats == 0 {
            return Err(ConfigError::Invalid(format!("source {} repeats must be >= 1", self.path)));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Units
// ============================================================================

/// A parsed config unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigUnit {
    /// Source entries paired with their raw declarations, in order.
    pub sources: Vec<(SourceEntry, Value)>,
    /// Test declarations keyed by id.
    pub tests: BTreeMap<TestId, TestSpec>,
}

impl ConfigUnit {
    /// Parses and validates a unit from JSON text; `origin` labels errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or declarations and
    /// [`ConfigError::Invalid`] for values that fail validation.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let label = origin.display();
        let value: Value = serde_json::from_str(text)
            .map_err(|err| ConfigError::Parse(format!("{label}: {err}")))?;
        let Value::Object(mut object) = value else {
            return Err(ConfigError::Invalid(format!("{label}: config unit must be an object")));
        };

        let raw_sources = match object.remove("sources") {
            None => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ConfigError::Invalid(format!("{label}: sources must be an array")));
            }
        };
        let raw_tests = match object.remove("tests") {
            None => Map::new(),
            Some(Value::Object(items)) => items,
            Some(_) => {
                return Err(ConfigError::Invalid(format!("{label}: tests must be an object")));
            }
        };

        let mut sources = Vec::with_capacity(raw_sources.len());
        for raw in raw_sources {
            let entry: SourceEntry = serde_json::from_value(raw.clone())
                .map_err(|err| ConfigError::Parse(format!("{label}: source: {err}")))?;
            entry.validate().map_err(|err| err.context(&label))?;
            sources.push((entry, raw));
        }

        let mut tests = BTreeMap::new();
        for (id, raw) in raw_tests {
            if id.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{label}: test id must be non-empty")));
            }
            let spec: TestSpec = serde_json::from_value(raw)
                .map_err(|err| ConfigError::Parse(format!("{label}: test {id}: {err}")))?;
            spec.validate()
                .map_err(|err| ConfigError::Invalid(format!("{label}: test {id}: {err}")))?;
            tests.insert(TestId::new(id), spec);
        }

        Ok(Self {
            sources,
            tests,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
