//! Concurrent series store shared by scrape tasks and the refresh task.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::RwLock;

use super::series::{series_key, Labels, MetricType, Series};

/// Summary of one metric family (all series sharing a name).
#[derive(Debug, Clone, PartialEq)]
pub struct Family {
    pub name: String,
    pub help: String,
    pub metric_type: MetricType,
    pub series_count: usize,
}

#[derive(Debug, Default)]
struct StoreInner {
    series: HashMap<String, Series>,
    /// Every known key, sorted.
    keys: Vec<String>,
    /// Distinct metric names, sorted.
    names: Vec<String>,
    /// Sorted keys per metric name.
    by_name: HashMap<String, Vec<String>>,
}

/// Maps series keys to their history.
///
/// A single lock covers the whole store. Series are created on first
/// observation and live for the rest of the process.
#[derive(Debug, Default)]
pub struct SeriesStore {
    inner: RwLock<StoreInner>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample observed now.
    pub fn update(
        &self,
        name: &str,
        labels: Labels,
        help: &str,
        metric_type: MetricType,
        value: f64,
    ) {
        self.update_at(name, labels, help, metric_type, value, Instant::now());
    }

    /// Record a sample observed at `at`, creating the series if unseen.
    pub fn update_at(
        &self,
        name: &str,
        labels: Labels,
        help: &str,
        metric_type: MetricType,
        value: f64,
        at: Instant,
    ) {
        let key = series_key(name, &labels);
        let mut inner = self.inner.write();

        if !inner.series.contains_key(&key) {
            insert_sorted(&mut inner.keys, &key);
            insert_sorted(&mut inner.names, name);
            let family = inner.by_name.entry(name.to_string()).or_default();
            insert_sorted(family, &key);
            inner.series.insert(key.clone(), Series::new(name, labels));
        }

        if let Some(series) = inner.series.get_mut(&key) {
            series.annotate(help, metric_type);
            series.history.push_at(value, at);
        }
    }

    /// Copy of every series in sorted-key order.
    pub fn snapshot(&self) -> Vec<Series> {
        let inner = self.inner.read();
        inner
            .keys
            .iter()
            .filter_map(|k| inner.series.get(k).cloned())
            .collect()
    }

    /// Sorted list of every series key.
    pub fn keys(&self) -> Vec<String> {
        self.inner.read().keys.clone()
    }

    /// Sorted, deduplicated metric names.
    pub fn names(&self) -> Vec<String> {
        self.inner.read().names.clone()
    }

    /// Copy of every series named `name`, in sorted-key order.
    pub fn series_for_name(&self, name: &str) -> Vec<Series> {
        let inner = self.inner.read();
        let Some(keys) = inner.by_name.get(name) else {
            return Vec::new();
        };
        keys.iter()
            .filter_map(|k| inner.series.get(k).cloned())
            .collect()
    }

    /// Point lookup by series key.
    pub fn get(&self, key: &str) -> Option<Series> {
        self.inner.read().series.get(key).cloned()
    }

    pub fn series_count(&self) -> usize {
        self.inner.read().series.len()
    }

    pub fn name_count(&self) -> usize {
        self.inner.read().names.len()
    }

    /// Number of series for `name`, without copying their histories.
    pub fn family_size(&self, name: &str) -> usize {
        self.inner.read().by_name.get(name).map_or(0, Vec::len)
    }

    /// Help, type and size of the family named `name`.
    ///
    /// Help and type come from the first series (in key order) that carries
    /// them.
    pub fn family(&self, name: &str) -> Option<Family> {
        let inner = self.inner.read();
        let keys = inner.by_name.get(name)?;
        let members: Vec<&Series> = keys.iter().filter_map(|k| inner.series.get(k)).collect();

        let help = members
            .iter()
            .find(|s| !s.help.is_empty())
            .map(|s| s.help.clone())
            .unwrap_or_default();
        let metric_type = members
            .iter()
            .map(|s| s.metric_type)
            .find(|t| t.is_known())
            .unwrap_or_default();

        Some(Family {
            name: name.to_string(),
            help,
            metric_type,
            series_count: members.len(),
        })
    }
}

fn insert_sorted(list: &mut Vec<String>, item: &str) {
    if let Err(pos) = list.binary_search_by(|probe| probe.as_str().cmp(item)) {
        list.insert(pos, item.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_update_creates_series_lazily() {
        let store = SeriesStore::new();
        assert_eq!(store.series_count(), 0);

        store.update("up", Labels::new(), "", MetricType::Gauge, 1.0);
        store.update("up", Labels::new(), "", MetricType::Gauge, 1.0);

        assert_eq!(store.series_count(), 1);
        let s = store.get("up").unwrap();
        assert_eq!(s.history.len(), 2);
        assert_eq!(s.metric_type, MetricType::Gauge);
    }

    #[test]
    fn test_keys_and_names_sorted() {
        let store = SeriesStore::new();
        store.update("zeta", Labels::new(), "", MetricType::Unknown, 1.0);
        store.update("alpha", labels(&[("b", "2")]), "", MetricType::Unknown, 1.0);
        store.update("alpha", labels(&[("a", "1")]), "", MetricType::Unknown, 1.0);
        store.update("mid", Labels::new(), "", MetricType::Unknown, 1.0);

        assert_eq!(store.keys(), vec!["alpha{a=1}", "alpha{b=2}", "mid", "zeta"]);
        assert_eq!(store.names(), vec!["alpha", "mid", "zeta"]);

        let snap: Vec<String> = store.snapshot().into_iter().map(|s| s.key).collect();
        assert_eq!(snap, store.keys());
    }

    #[test]
    fn test_series_for_name() {
        let store = SeriesStore::new();
        store.update("http", labels(&[("code", "500")]), "", MetricType::Counter, 1.0);
        store.update("http", labels(&[("code", "200")]), "", MetricType::Counter, 9.0);
        store.update("http_other", Labels::new(), "", MetricType::Counter, 3.0);

        let family = store.series_for_name("http");
        assert_eq!(family.len(), 2);
        assert_eq!(family[0].key, "http{code=200}");
        assert_eq!(family[1].key, "http{code=500}");
        assert!(store.series_for_name("missing").is_empty());
        assert_eq!(store.family_size("http"), 2);
        assert_eq!(store.family_size("missing"), 0);
    }

    #[test]
    fn test_get_unknown_key() {
        let store = SeriesStore::new();
        assert!(store.get("nothing{here=1}").is_none());
    }

    #[test]
    fn test_family_metadata() {
        let store = SeriesStore::new();
        store.update("rpc", labels(&[("m", "a")]), "", MetricType::Unknown, 1.0);
        store.update("rpc", labels(&[("m", "b")]), "RPC calls", MetricType::Counter, 1.0);

        let fam = store.family("rpc").unwrap();
        assert_eq!(fam.help, "RPC calls");
        assert_eq!(fam.metric_type, MetricType::Counter);
        assert_eq!(fam.series_count, 2);
        assert!(store.family("nope").is_none());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let store = SeriesStore::new();
        store.update("g", Labels::new(), "", MetricType::Gauge, 1.0);
        let snap = store.snapshot();
        store.update("g", Labels::new(), "", MetricType::Gauge, 2.0);

        assert_eq!(snap[0].history.len(), 1);
        assert_eq!(store.get("g").unwrap().history.len(), 2);
    }

    #[test]
    fn test_concurrent_updates() {
        let store = Arc::new(SeriesStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let worker = t.to_string();
                    for i in 0..50 {
                        let l = labels(&[("worker", worker.as_str())]);
                        store.update("work_total", l, "", MetricType::Counter, i as f64);
                        let _ = store.snapshot();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.series_count(), 8);
        assert_eq!(store.names(), vec!["work_total"]);
        for s in store.snapshot() {
            assert_eq!(s.history.len(), 50);
            assert_eq!(s.last(), 49.0);
        }
    }
}
