// crates/complexity-bench-config/src/profiles.rs
// ============================================================================
// Module: Profile Catalog
// Description: Ordered catalog of named build profiles.
// Purpose: Select the profile a sweep runs under, or every profile in order.
// Dependencies: complexity-bench-core, serde, serde_json
// ============================================================================

//! ## Overview
//! `profiles.json` maps a key to a [`Profile`]. Keys keep their file order:
//! the first entry is the default and multi-profile runs follow the file.
//! The path resolves from an explicit value, then
//! [`PROFILES_ENV_VAR`], then [`DEFAULT_PROFILES_NAME`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use complexity_bench_core::Profile;
use serde::Deserialize;
use serde::Deserializer;
use serde::de::MapAccess;
use serde::de::Visitor;

use crate::error::ConfigError;
use crate::paths::read_config_text;
use crate::paths::resolve_path;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default profiles filename.
pub const DEFAULT_PROFILES_NAME: &str = "profiles.json";
/// Environment variable overriding the profiles path.
pub const PROFILES_ENV_VAR: &str = "COMPLEXITY_BENCH_PROFILES";

/// Placeholders every build command must carry.
const REQUIRED_PLACEHOLDERS: [&str; 2] = ["{output}", "{source_path}"];

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Profiles in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCatalog {
    /// Source file, when loaded from disk.
    path: Option<PathBuf>,
    /// Key and profile pairs in file order.
    entries: Vec<(String, Profile)>,
}

impl ProfileCatalog {
    /// Loads the catalog using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path, PROFILES_ENV_VAR, DEFAULT_PROFILES_NAME)?;
        let text = read_config_text(&resolved)?;
        let mut catalog = Self::from_json(&text).map_err(|err| err.context(resolved.display()))?;
        catalog.path = Some(resolved);
        Ok(catalog)
    }

    /// Parses and validates a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for empty, duplicate, or unusable entries.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let OrderedProfiles(entries) =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        if entries.is_empty() {
            return Err(ConfigError::Invalid("profiles file declares no profiles".to_string()));
        }
        let mut seen = BTreeSet::new();
        for (key, profile) in &entries {
            if !seen.insert(key.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate profile key {key}")));
            }
            validate_profile(key, profile)?;
        }
        Ok(Self {
            path: None,
            entries,
        })
    }

    /// Returns the profile for `key`, or the first profile when `key` is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing the available profiles when
    /// `key` is unknown.
    pub fn select(&self, key: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let found = match key {
            None => self.entries.first(),
            Some(key) => self.entries.iter().find(|(candidate, _)| candidate == key),
        };
        if let Some((key, profile)) = found {
            return Ok((key.as_str(), profile));
        }
        let available: Vec<String> = self
            .entries
            .iter()
            .map(|(key, profile)| format!("{key} ({})", profile.name))
            .collect();
        Err(ConfigError::Invalid(format!(
            "profile {} not found; available: {}",
            key.unwrap_or_default(),
            available.join(", ")
        )))
    }

    /// Iterates profiles in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Profile)> {
        self.entries.iter().map(|(key, profile)| (key.as_str(), profile))
    }

    /// Returns the number of profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the catalog holds no profiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the file the catalog was loaded from.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Validates one profile entry.
fn validate_profile(key: &str, profile: &Profile) -> Result<(), ConfigError> {
    if key.trim().is_empty() {
        return Err(ConfigError::Invalid("profile key must be non-empty".to_string()));
    }
    if profile.name.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("profile {key} name must be non-empty")));
    }
    for placeholder in REQUIRED_PLACEHOLDERS {
        if !profile.build_command.contains(placeholder) {
            return Err(ConfigError::Invalid(format!(
                "profile {key} build_command must contain {placeholder}"
            )));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Ordered Deserialization
// ============================================================================

/// Profile map deserialized in document order.
struct OrderedProfiles(Vec<(String, Profile)>);

impl<'de> Deserialize<'de> for OrderedProfiles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedProfilesVisitor)
    }
}

/// Visitor collecting map entries without reordering them.
struct OrderedProfilesVisitor;

impl<'de> Visitor<'de> for OrderedProfilesVisitor {
    type Value = OrderedProfiles;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of profile keys to profiles")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, profile)) = map.next_entry::<String, Profile>()? {
            entries.push((key, profile));
        }
        Ok(OrderedProfiles(entries))
    }
}
