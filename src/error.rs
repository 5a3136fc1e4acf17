//! Error types for the madvisor library.

use std::path::PathBuf;

use thiserror::Error;

/// Shared `Result` alias for the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading configuration or scraping targets.
///
/// Parse-local problems inside a scrape body never show up here: malformed
/// sample lines are dropped where they are found.
#[derive(Debug, Error)]
pub enum Error {
    /// The unit-pattern document is not valid YAML for the expected shape.
    #[error("failed to parse unit patterns: {0}")]
    UnitsParse(#[from] serde_yaml::Error),

    /// A user-supplied unit-pattern file could not be read.
    #[error("failed to read unit patterns file {}: {source}", path.display())]
    UnitsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A unit pattern failed to compile.
    #[error("invalid pattern {pattern:?} for unit {unit:?}: {source}")]
    Pattern {
        unit: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Fetching a target's metrics body failed.
    #[error("scrape of {target} failed: {source}")]
    Transport {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A duration string could not be understood.
    #[error("invalid duration {0:?}")]
    Duration(String),

    /// Layered settings could not be loaded.
    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    /// Writing an export file failed.
    #[error("export to {} failed: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing an export document failed.
    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}
