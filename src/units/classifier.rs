//! Compiled first-match unit lookup.

use regex::Regex;

use super::config::UnitsConfig;
use super::format;
use crate::error::{Error, Result};

/// How a matched unit renders its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayUnit {
    Bytes,
    Kilobytes,
    Megabytes,
    /// Seconds.
    Duration,
    DurationMs,
    Percent,
    /// Unix seconds, shown as relative age.
    Timestamp,
    Count,
    /// A user unit with no dedicated formatter.
    Generic,
}

impl DisplayUnit {
    pub fn from_unit(unit: &str) -> Self {
        match unit {
            "bytes" => DisplayUnit::Bytes,
            "kilobytes" => DisplayUnit::Kilobytes,
            "megabytes" => DisplayUnit::Megabytes,
            "duration" => DisplayUnit::Duration,
            "duration_ms" => DisplayUnit::DurationMs,
            "percent" => DisplayUnit::Percent,
            "timestamp" => DisplayUnit::Timestamp,
            "count" => DisplayUnit::Count,
            _ => DisplayUnit::Generic,
        }
    }

    /// Render `v` in this unit.
    pub fn format(self, v: f64) -> String {
        match self {
            DisplayUnit::Bytes => format::format_bytes(v),
            DisplayUnit::Kilobytes => format::format_bytes(v * 1024.0),
            DisplayUnit::Megabytes => format::format_bytes(v * 1024.0 * 1024.0),
            DisplayUnit::Duration => format::format_duration(v),
            DisplayUnit::DurationMs => format::format_duration(v / 1000.0),
            DisplayUnit::Percent => format::format_percent(v),
            DisplayUnit::Timestamp => format::format_timestamp(v),
            DisplayUnit::Count => format::format_count(v),
            DisplayUnit::Generic => format::format_generic(v),
        }
    }
}

/// Result of classifying a metric name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitMatch {
    pub unit: String,
    pub suffix: String,
    pub kind: DisplayUnit,
}

#[derive(Debug)]
struct CompiledRule {
    unit: String,
    suffix: String,
    kind: DisplayUnit,
    pattern: Regex,
}

/// Immutable, ordered matcher list built from a [`UnitsConfig`].
///
/// Built once at startup and shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct UnitClassifier {
    rules: Vec<CompiledRule>,
}

impl UnitClassifier {
    /// Compile every pattern of every rule, keeping configuration order.
    ///
    /// The first pattern that fails to compile fails the whole set.
    pub fn compile(config: &UnitsConfig) -> Result<Self> {
        let mut rules = Vec::new();
        for rule in &config.units {
            let kind = DisplayUnit::from_unit(&rule.unit);
            for expr in &rule.matchers {
                let pattern = Regex::new(expr).map_err(|source| Error::Pattern {
                    unit: rule.unit.clone(),
                    pattern: expr.clone(),
                    source,
                })?;
                rules.push(CompiledRule {
                    unit: rule.unit.clone(),
                    suffix: rule.suffix.clone(),
                    kind,
                    pattern,
                });
            }
        }
        Ok(Self { rules })
    }

    /// Classifier over the built-in rules only.
    pub fn builtin() -> Result<Self> {
        Self::compile(&UnitsConfig::builtin()?)
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule whose pattern matches `name`.
    pub fn classify(&self, name: &str) -> Option<UnitMatch> {
        self.rules
            .iter()
            .find(|r| r.pattern.is_match(name))
            .map(|r| UnitMatch {
                unit: r.unit.clone(),
                suffix: r.suffix.clone(),
                kind: r.kind,
            })
    }

    /// Display kind for `name`; unmatched names are generic.
    pub fn kind(&self, name: &str) -> DisplayUnit {
        self.rules
            .iter()
            .find(|r| r.pattern.is_match(name))
            .map_or(DisplayUnit::Generic, |r| r.kind)
    }

    /// Suffix shown after a metric name, empty when unmatched.
    pub fn suffix(&self, name: &str) -> String {
        self.classify(name).map(|m| m.suffix).unwrap_or_default()
    }

    /// Format a raw value of metric `name`.
    pub fn format_value(&self, name: &str, v: f64) -> String {
        self.kind(name).format(v)
    }
}
