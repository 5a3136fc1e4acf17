//! Line-oriented text exposition parser.
//!
//! Handles the subset of the format that metrics endpoints commonly emit:
//!
//! ```text
//! # HELP http_requests_total Total requests
//! # TYPE http_requests_total counter
//! http_requests_total{method="GET",code="200"} 1027
//! http_requests_total{method="POST",code="200"} 3
//! ```
//!
//! Malformed sample lines are dropped; nothing here fails.

use crate::data::{Labels, MetricType, SeriesStore};

const HELP_PREFIX: &str = "# HELP ";
const TYPE_PREFIX: &str = "# TYPE ";

/// One parsed sample line with any metadata that applies to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSample {
    pub name: String,
    pub labels: Labels,
    pub help: String,
    pub metric_type: MetricType,
    pub value: f64,
}

/// HELP/TYPE state carried from annotation lines to the samples below them.
#[derive(Debug, Default)]
struct Annotations {
    base: String,
    help: String,
    metric_type: MetricType,
}

impl Annotations {
    fn announce(&mut self, base: &str) {
        if self.base != base {
            self.base = base.to_string();
            self.help.clear();
            self.metric_type = MetricType::Unknown;
        }
    }

    /// Metadata only reaches samples named exactly like the announced base.
    fn applies_to(&self, name: &str) -> bool {
        !self.base.is_empty() && name == self.base
    }
}

/// Parse a whole scrape body.
pub fn parse(body: &str) -> Vec<ParsedSample> {
    let mut meta = Annotations::default();
    let mut samples = Vec::new();

    for line in body.lines() {
        if let Some(rest) = line.strip_prefix(HELP_PREFIX) {
            let (base, help) = split_annotation(rest);
            meta.announce(base);
            if let Some(help) = help {
                meta.help = help.to_string();
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix(TYPE_PREFIX) {
            let (base, ty) = split_annotation(rest);
            meta.announce(base);
            if let Some(ty) = ty {
                meta.metric_type = MetricType::parse(ty);
            }
            continue;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some(sample) = parse_sample(line, &meta) else {
            continue;
        };
        samples.push(sample);
    }

    samples
}

/// Parse `body` and record every sample in `store`. Returns the number of
/// samples recorded.
pub fn ingest(body: &str, store: &SeriesStore) -> usize {
    let samples = parse(body);
    let count = samples.len();
    for s in samples {
        store.update(&s.name, s.labels, &s.help, s.metric_type, s.value);
    }
    count
}

/// Split `name rest-of-line` at the first space.
fn split_annotation(rest: &str) -> (&str, Option<&str>) {
    match rest.split_once(' ') {
        Some((base, text)) => (base, Some(text)),
        None => (rest, None),
    }
}

fn parse_sample(line: &str, meta: &Annotations) -> Option<ParsedSample> {
    let (metric, value) = line.rsplit_once(' ')?;
    let value: f64 = value.parse().ok()?;
    let (name, labels) = parse_labels(metric);

    let (help, metric_type) = if meta.applies_to(name) {
        (meta.help.clone(), meta.metric_type)
    } else {
        (String::new(), MetricType::Unknown)
    };

    Some(ParsedSample {
        name: name.to_string(),
        labels,
        help,
        metric_type,
        value,
    })
}

/// Split `name{k="v",...}` into the bare name and its labels.
///
/// A label block without a closing brace yields no labels. Pairs without `=`
/// are skipped.
pub fn parse_labels(metric: &str) -> (&str, Labels) {
    let mut labels = Labels::new();
    let Some((name, rest)) = metric.split_once('{') else {
        return (metric, labels);
    };
    let Some((block, _)) = rest.split_once('}') else {
        return (name, labels);
    };

    for pair in block.split(',') {
        let Some((k, v)) = pair.trim().split_once('=') else {
            continue;
        };
        labels.insert(k.to_string(), v.trim_matches('"').to_string());
    }
    (name, labels)
}
