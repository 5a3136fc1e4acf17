//! JSON export of the current store contents.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::data::{Labels, MetricType, SeriesStore};
use crate::error::{Error, Result};

/// File written by the `e` key.
pub const DEFAULT_EXPORT_PATH: &str = "madvisor_export.json";

/// One exported series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedSeries {
    pub name: String,
    pub labels: Labels,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub help: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

/// Whole export document.
#[derive(Debug, Clone, Serialize)]
pub struct Export {
    pub rate_window_secs: f64,
    pub series_count: usize,
    /// Keyed by series identity.
    pub series: BTreeMap<String, ExportedSeries>,
}

impl Export {
    /// Capture everything currently in `store`.
    pub fn capture(store: &SeriesStore, window: Duration) -> Self {
        let series: BTreeMap<String, ExportedSeries> = store
            .snapshot()
            .into_iter()
            .map(|s| {
                let rate = s.should_rate().then(|| s.rate(window));
                let exported = ExportedSeries {
                    name: s.name.clone(),
                    labels: s.labels.clone(),
                    metric_type: s.metric_type,
                    help: s.help.clone(),
                    value: s.last(),
                    rate,
                };
                (s.key, exported)
            })
            .collect();

        Self {
            rate_window_secs: window.as_secs_f64(),
            series_count: series.len(),
            series,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the pretty-printed document to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let io_err = |source| Error::Export {
            path: path.to_path_buf(),
            source,
        };
        let mut file = std::fs::File::create(path).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        Ok(())
    }
}
