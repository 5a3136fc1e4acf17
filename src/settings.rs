//! Layered runtime settings.
//!
//! Sources, lowest to highest precedence:
//!
//! ```text
//! built-in defaults ─▶ --config file ─▶ MADVISOR_* env ─▶ CLI flags
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::warn;

use crate::data::duration::parse_duration;
use crate::data::DEFAULT_RATE_WINDOW;
use crate::error::Result;

pub const DEFAULT_TARGETS: &str = "localhost:8080";
pub const DEFAULT_LOG_FILE: &str = "/tmp/madvisor-debug.log";

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Comma-separated `host:port` list.
    pub targets: String,
    pub rate_window: String,
    #[serde(default)]
    pub patterns: Option<PathBuf>,
    pub scrape_interval_ms: u64,
    pub refresh_interval_ms: u64,
    pub scrape_timeout_ms: u64,
    pub metrics_path: String,
    pub log_file: PathBuf,
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub targets: Option<String>,
    pub rate_window: Option<String>,
    pub patterns: Option<PathBuf>,
}

impl Settings {
    /// Build settings from every layer.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("targets", DEFAULT_TARGETS)?
            .set_default("rate_window", "5s")?
            .set_default("scrape_interval_ms", 1000_i64)?
            .set_default("refresh_interval_ms", 250_i64)?
            .set_default("scrape_timeout_ms", 2000_i64)?
            .set_default("metrics_path", crate::source::DEFAULT_METRICS_PATH)?
            .set_default("log_file", DEFAULT_LOG_FILE)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }

        let patterns = overrides
            .patterns
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());

        let settings = builder
            .add_source(Environment::with_prefix("MADVISOR"))
            .set_override_option("targets", overrides.targets.clone())?
            .set_override_option("rate_window", overrides.rate_window.clone())?
            .set_override_option("patterns", patterns)?
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn target_list(&self) -> Vec<String> {
        parse_targets(&self.targets)
    }

    /// The configured rate window, or the default when it does not parse.
    pub fn rate_window(&self) -> Duration {
        match parse_duration(&self.rate_window) {
            Ok(d) if !d.is_zero() => d,
            Ok(_) => {
                warn!(value = %self.rate_window, "ignoring zero rate window");
                DEFAULT_RATE_WINDOW
            }
            Err(e) => {
                warn!(value = %self.rate_window, error = %e, "ignoring rate window");
                DEFAULT_RATE_WINDOW
            }
        }
    }

    pub fn scrape_interval(&self) -> Duration {
        Duration::from_millis(self.scrape_interval_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_millis(self.scrape_timeout_ms)
    }
}

/// Split a comma-separated target list, trimming whitespace and dropping
/// empty items.
pub fn parse_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_targets() {
        assert_eq!(
            parse_targets(" a:1 , b:2,,c:3 "),
            vec!["a:1", "b:2", "c:3"]
        );
        assert_eq!(parse_targets("localhost:8080"), vec!["localhost:8080"]);
        assert!(parse_targets(" , ").is_empty());
    }

    #[test]
    fn test_defaults() {
        let s = Settings::load(None, &Overrides::default()).unwrap();
        assert_eq!(s.target_list(), vec!["localhost:8080"]);
        assert_eq!(s.rate_window(), Duration::from_secs(5));
        assert_eq!(s.patterns, None);
        assert_eq!(s.scrape_interval(), Duration::from_secs(1));
        assert_eq!(s.refresh_interval(), Duration::from_millis(250));
        assert_eq!(s.scrape_timeout(), Duration::from_secs(2));
        assert_eq!(s.metrics_path, "/metrics");
        assert_eq!(s.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_file_layer_then_cli_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "targets = \"a:1,b:2\"\nrate_window = \"30s\"\nscrape_interval_ms = 500"
        )
        .unwrap();

        let s = Settings::load(Some(file.path()), &Overrides::default()).unwrap();
        assert_eq!(s.target_list(), vec!["a:1", "b:2"]);
        assert_eq!(s.rate_window(), Duration::from_secs(30));
        assert_eq!(s.scrape_interval(), Duration::from_millis(500));

        let cli = Overrides {
            targets: Some("c:3".to_string()),
            rate_window: None,
            patterns: Some(PathBuf::from("/etc/units.yaml")),
        };
        let s = Settings::load(Some(file.path()), &cli).unwrap();
        assert_eq!(s.target_list(), vec!["c:3"]);
        assert_eq!(s.rate_window(), Duration::from_secs(30));
        assert_eq!(s.patterns, Some(PathBuf::from("/etc/units.yaml")));
    }

    #[test]
    fn test_invalid_rate_window_keeps_default() {
        let cli = Overrides {
            rate_window: Some("soon".to_string()),
            ..Default::default()
        };
        let s = Settings::load(None, &cli).unwrap();
        assert_eq!(s.rate_window(), DEFAULT_RATE_WINDOW);

        let cli = Overrides {
            rate_window: Some("0s".to_string()),
            ..Default::default()
        };
        let s = Settings::load(None, &cli).unwrap();
        assert_eq!(s.rate_window(), DEFAULT_RATE_WINDOW);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = Settings::load(
            Some(Path::new("/nonexistent/madvisor.toml")),
            &Overrides::default(),
        );
        assert!(result.is_err());
    }
}
