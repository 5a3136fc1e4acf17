//! Unit-pattern documents: loading and base/override merge.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default pattern document.
const DEFAULT_PATTERNS: &str = include_str!("patterns_default.yaml");

/// One unit rule: a unit identifier, its display suffix and the patterns that
/// select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRule {
    pub unit: String,
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub matchers: Vec<String>,
}

impl UnitRule {
    pub fn new(unit: &str, suffix: &str, matchers: &[&str]) -> Self {
        Self {
            unit: unit.to_string(),
            suffix: suffix.to_string(),
            matchers: matchers.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Ordered list of unit rules. Earlier rules win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitsConfig {
    #[serde(default)]
    pub units: Vec<UnitRule>,
}

impl UnitsConfig {
    /// Parse a YAML pattern document.
    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Read and parse a pattern document from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::UnitsRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// The embedded default rules.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(DEFAULT_PATTERNS)
    }

    /// Merge `overrides` on top of `self`.
    ///
    /// Override rules come first, in their own order, and replace any base
    /// rule with the same unit identifier wholesale. Remaining base rules
    /// follow in base order.
    pub fn merge(&self, overrides: Option<&UnitsConfig>) -> UnitsConfig {
        let Some(overrides) = overrides else {
            return self.clone();
        };

        let replaced: HashSet<&str> = overrides.units.iter().map(|r| r.unit.as_str()).collect();
        let units = overrides
            .units
            .iter()
            .chain(self.units.iter().filter(|r| !replaced.contains(r.unit.as_str())))
            .cloned()
            .collect();

        UnitsConfig { units }
    }

    /// Built-in rules merged with an optional user file.
    pub fn load(user_file: Option<&Path>) -> Result<Self> {
        let base = Self::builtin()?;
        let user = user_file.map(Self::from_file).transpose()?;
        Ok(base.merge(user.as_ref()))
    }

    pub fn get(&self, unit: &str) -> Option<&UnitRule> {
        self.units.iter().find(|r| r.unit == unit)
    }
}
