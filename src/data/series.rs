//! Series identity, metric type and per-series history.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use super::rate;
use super::ring::RingBuffer;

/// Label set of a series. A `BTreeMap` keeps keys sorted for free.
pub type Labels = BTreeMap<String, String>;

/// Declared type of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
    Summary,
    /// No `TYPE` annotation, or one this dashboard does not know.
    #[default]
    Unknown,
}

impl MetricType {
    /// Parse a `TYPE` annotation value.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "counter" => MetricType::Counter,
            "gauge" => MetricType::Gauge,
            "histogram" => MetricType::Histogram,
            "summary" => MetricType::Summary,
            _ => MetricType::Unknown,
        }
    }

    /// The type used for display and rate decisions; unknown is a gauge.
    pub fn effective(self) -> Self {
        match self {
            MetricType::Unknown => MetricType::Gauge,
            other => other,
        }
    }

    /// Short badge shown next to a metric name.
    pub fn badge(self) -> &'static str {
        match self.effective() {
            MetricType::Counter => "[C]",
            MetricType::Histogram => "[H]",
            MetricType::Summary => "[S]",
            _ => "[G]",
        }
    }

    pub fn is_known(self) -> bool {
        self != MetricType::Unknown
    }
}

/// Canonical key of a series: `name{k1=v1,k2=v2}` with keys sorted, or bare
/// `name` when there are no labels.
pub fn series_key(name: &str, labels: &Labels) -> String {
    if labels.is_empty() {
        return name.to_string();
    }
    let parts: Vec<String> = labels.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{}{{{}}}", name, parts.join(","))
}

/// One metric name plus one label combination, with its sample history.
#[derive(Debug, Clone)]
pub struct Series {
    pub key: String,
    pub name: String,
    pub labels: Labels,
    pub help: String,
    pub metric_type: MetricType,
    pub history: RingBuffer,
}

impl Series {
    /// Create an empty series with the default history capacity.
    pub fn new(name: &str, labels: Labels) -> Self {
        Self {
            key: series_key(name, &labels),
            name: name.to_string(),
            labels,
            help: String::new(),
            metric_type: MetricType::Unknown,
            history: RingBuffer::new(),
        }
    }

    /// Replace help/type with any non-empty metadata from the latest scrape.
    pub fn annotate(&mut self, help: &str, metric_type: MetricType) {
        if !help.is_empty() {
            self.help = help.to_string();
        }
        if metric_type.is_known() {
            self.metric_type = metric_type;
        }
    }

    /// Whether the series accumulates monotonically and is shown as a rate.
    ///
    /// Counters always are; histogram and summary families only for their
    /// `_count` and `_sum` children.
    pub fn should_rate(&self) -> bool {
        match self.metric_type.effective() {
            MetricType::Counter => true,
            MetricType::Histogram | MetricType::Summary => {
                self.name.ends_with("_count") || self.name.ends_with("_sum")
            }
            _ => false,
        }
    }

    /// Rate per second over the trailing `window`.
    pub fn rate(&self, window: Duration) -> f64 {
        rate::rate(&self.history, window)
    }

    /// Per-sample-pair rates across the whole history.
    pub fn rate_slice(&self) -> Vec<f64> {
        rate::rate_slice(&self.history)
    }

    pub fn last(&self) -> f64 {
        self.history.last()
    }

    /// Name with quoted labels, as used for chart legends.
    pub fn display_name(&self) -> String {
        if self.labels.is_empty() {
            return self.name.clone();
        }
        format!("{}{{{}}}", self.name, self.label_text(","))
    }

    /// Labels rendered as `k="v"` pairs joined by `sep`.
    pub fn label_text(&self, sep: &str) -> String {
        self.labels
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, v))
            .collect::<Vec<_>>()
            .join(sep)
    }
}
