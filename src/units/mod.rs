//! Metric-name unit classification and value formatting.
//!
//! Unit rules come from an embedded YAML document, optionally merged with a
//! user file, and are compiled once into an immutable [`UnitClassifier`]:
//!
//! ```text
//! patterns_default.yaml ──┐
//!                         ├──▶ UnitsConfig::merge() ──▶ UnitClassifier::compile()
//! --patterns <file> ──────┘                                   │
//!                                                             ▼
//!                                         classify(name) ──▶ UnitMatch { unit, suffix, kind }
//! ```

pub mod classifier;
pub mod config;
pub mod format;

pub use classifier::{DisplayUnit, UnitClassifier, UnitMatch};
pub use self::config::{UnitRule, UnitsConfig};
