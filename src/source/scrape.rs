//! Periodic scraping of metrics endpoints into the series store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::exposition;
use crate::data::SeriesStore;
use crate::error::{Error, Result};

/// Default time between scrape cycles.
pub const DEFAULT_SCRAPE_INTERVAL: Duration = Duration::from_secs(1);
/// Default per-request timeout.
pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(2);
/// Default path requested on every target.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Something that can fetch the exposition body of a target.
pub trait MetricsSource: Send + Sync + 'static {
    /// Fetch the current body for `target` (a `host:port` pair).
    fn fetch(&self, target: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Plain HTTP GET against `http://{target}{path}`.
///
/// The body is returned whatever the response status is.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    path: String,
}

impl HttpSource {
    pub fn new(timeout: Duration, path: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Client)?;
        Ok(Self {
            client,
            path: path.to_string(),
        })
    }

    pub fn url(&self, target: &str) -> String {
        format!("http://{}{}", target, self.path)
    }
}

impl MetricsSource for HttpSource {
    async fn fetch(&self, target: &str) -> Result<String> {
        let transport = |source| Error::Transport {
            target: target.to_string(),
            source,
        };
        let response = self
            .client
            .get(self.url(target))
            .send()
            .await
            .map_err(transport)?;
        response.text().await.map_err(transport)
    }
}

/// Fetch one target and feed its body into `store`.
///
/// Transport failures are logged and otherwise ignored; the next cycle
/// retries.
///
/// # Example with a canned source
///
/// ```
/// use madvisor::source::scrape_target;
/// use madvisor::{MetricsSource, SeriesStore};
///
/// struct Canned;
///
/// impl MetricsSource for Canned {
///     async fn fetch(&self, _target: &str) -> madvisor::Result<String> {
///         Ok("# TYPE up gauge\nup 1\n".to_string())
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let store = SeriesStore::new();
/// scrape_target(&Canned, "localhost:9100", &store).await;
/// assert_eq!(store.get("up").map(|s| s.last()), Some(1.0));
/// # });
/// ```
pub async fn scrape_target<S: MetricsSource>(source: &S, target: &str, store: &SeriesStore) {
    match source.fetch(target).await {
        Ok(body) => {
            let samples = exposition::ingest(&body, store);
            debug!(endpoint = target, samples, "scrape complete");
        }
        Err(e) => {
            debug!(endpoint = target, error = %e, "scrape failed");
        }
    }
}

/// Drives scrape cycles over a fixed target list.
#[derive(Debug)]
pub struct Scheduler<S> {
    source: Arc<S>,
    store: Arc<SeriesStore>,
    targets: Vec<String>,
    interval: Duration,
}

impl<S: MetricsSource> Scheduler<S> {
    pub fn new(source: S, store: Arc<SeriesStore>, targets: Vec<String>) -> Self {
        Self {
            source: Arc::new(source),
            store,
            targets,
            interval: DEFAULT_SCRAPE_INTERVAL,
        }
    }

    /// Set the time between cycles.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Scrape every target in turn, waiting for each.
    pub async fn scrape_all(&self) {
        for target in &self.targets {
            scrape_target(self.source.as_ref(), target, &self.store).await;
        }
    }

    /// Start one independent scrape task per target without waiting on any.
    pub fn spawn_cycle(&self) {
        for target in &self.targets {
            let source = Arc::clone(&self.source);
            let store = Arc::clone(&self.store);
            let target = target.clone();
            tokio::spawn(async move {
                scrape_target(source.as_ref(), &target, &store).await;
            });
        }
    }

    /// Scrape once up front, then every interval until `shutdown` turns true.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            targets = ?self.targets,
            interval_ms = self.interval.as_millis() as u64,
            "scrape scheduler started"
        );
        self.scrape_all().await;

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.spawn_cycle(),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("scrape scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves fixed bodies per target; unknown targets fail.
    #[derive(Debug, Default)]
    struct StaticSource {
        bodies: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        fn with(target: &str, body: &str) -> Self {
            let mut bodies = HashMap::new();
            bodies.insert(target.to_string(), body.to_string());
            Self {
                bodies,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl MetricsSource for StaticSource {
        async fn fetch(&self, target: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.bodies.get(target) {
                Some(body) => Ok(body.clone()),
                None => Err(transport_error(target).await),
            }
        }
    }

    /// A real client error, produced without touching the network.
    async fn transport_error(target: &str) -> Error {
        match reqwest::Client::new().get("http://[::1").send().await {
            Err(source) => Error::Transport {
                target: target.to_string(),
                source,
            },
            Ok(_) => panic!("malformed URL was accepted"),
        }
    }

    #[test]
    fn test_http_source_url() {
        let src = HttpSource::new(DEFAULT_SCRAPE_TIMEOUT, DEFAULT_METRICS_PATH).unwrap();
        assert_eq!(src.url("localhost:8080"), "http://localhost:8080/metrics");
    }

    #[tokio::test]
    async fn test_scrape_target_updates_store() {
        let store = SeriesStore::new();
        let src = StaticSource::with("a:1", "up 1\nrequests_total{code=\"200\"} 7\n");
        scrape_target(&src, "a:1", &store).await;
        assert_eq!(store.series_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_target_leaves_store_unchanged() {
        let store = SeriesStore::new();
        let src = StaticSource::default();
        scrape_target(&src, "missing:1", &store).await;
        assert_eq!(store.snapshot().len(), 0);
    }

    #[tokio::test]
    async fn test_scrape_all_skips_failing_targets() {
        let store = Arc::new(SeriesStore::new());
        let src = StaticSource::with("good:1", "up 1\n");
        let sched = Scheduler::new(
            src,
            Arc::clone(&store),
            vec!["bad:1".to_string(), "good:1".to_string()],
        );
        sched.scrape_all().await;
        assert_eq!(store.series_count(), 1);
        assert_eq!(sched.source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_scrapes_eagerly_then_on_interval() {
        let store = Arc::new(SeriesStore::new());
        let src = StaticSource::with("t:1", "up 1\n");
        let sched = Scheduler::new(src, Arc::clone(&store), vec!["t:1".to_string()])
            .with_interval(Duration::from_secs(1));
        let source = Arc::clone(&sched.source);

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(sched.run(rx));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.get("up").map(|s| s.history.len()), Some(1));

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert!(source.calls.load(Ordering::SeqCst) >= 3);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
