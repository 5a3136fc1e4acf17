//! Metric sources: the exposition parser and the scrape scheduler.
//!
//! This module provides a trait-based abstraction ([`MetricsSource`]) for
//! fetching exposition bodies, an HTTP implementation, and the scheduler that
//! feeds every target into the shared [`SeriesStore`](crate::SeriesStore).
//!
//! ```text
//! Scheduler::run()
//!     │  once eagerly, then every interval
//!     ├──▶ tokio::spawn(scrape_target(t1)) ──┐
//!     ├──▶ tokio::spawn(scrape_target(t2)) ──┼──▶ exposition::ingest() ──▶ SeriesStore
//!     └──▶ ...                               ┘
//! ```

pub mod exposition;
mod scrape;

pub use exposition::{parse, parse_labels, ParsedSample};
pub use scrape::{
    scrape_target, HttpSource, MetricsSource, Scheduler, DEFAULT_METRICS_PATH,
    DEFAULT_SCRAPE_INTERVAL, DEFAULT_SCRAPE_TIMEOUT,
};
