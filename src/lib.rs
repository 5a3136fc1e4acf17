//! # madvisor
//!
//! A real-time terminal dashboard and library for Prometheus-style metrics
//! endpoints.
//!
//! Targets are scraped on a fixed interval, every sample is kept in a short
//! per-series history, and the dashboard shows rates for counters and
//! unit-aware values for everything else.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                                                                  │
//! │  Scheduler ──▶ exposition::ingest ──▶ SeriesStore                │
//! │  (source)          (source)            (data)                    │
//! │                                          │                       │
//! │                                          ▼                       │
//! │  Navigation ◀────────────────────── Dashboard::refresh           │
//! │  RateWindow                              │   every 250ms         │
//! │      ▲                                   ▼                       │
//! │      │                          watch<Arc<DashboardView>>        │
//! │      │                                   │                       │
//! │  events ──▶ App ◀────────────────────────┘                       │
//! │                  │                                               │
//! │                  ▼                                               │
//! │                 ui ──▶ Terminal                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Exposition parser and the scrape [`Scheduler`] behind the
//!   [`MetricsSource`] trait
//! - **[`data`]**: Sample rings, [`Series`], the concurrent [`SeriesStore`]
//!   and rate derivation
//! - **[`units`]**: Regex-driven [`UnitClassifier`] and value formatting
//! - **[`navigation`]**: Selection, scrolling, focus and filter state
//! - **[`dashboard`]**: The refresh task building [`DashboardView`]s
//! - **[`app`]**, **[`events`]**, **[`ui`]**: The interactive terminal front end
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Scrape two local exporters, 10s rate window
//! madvisor --targets localhost:8080,localhost:9100 --rate-window 10s
//!
//! # Same via the environment
//! METRIC_TARGETS=localhost:9100 madvisor
//! ```
//!
//! ### As a library
//!
//! ```
//! use madvisor::{source, SeriesStore};
//!
//! let store = SeriesStore::new();
//! let body = "# TYPE up gauge\nup{job=\"node\"} 1\n";
//! let samples = source::exposition::ingest(body, &store);
//!
//! assert_eq!(samples, 1);
//! assert_eq!(store.names(), vec!["up"]);
//! ```
//!
//! ### Classifying values
//!
//! ```
//! use madvisor::UnitClassifier;
//!
//! let classifier = UnitClassifier::builtin().unwrap();
//! assert_eq!(classifier.format_value("process_resident_memory_bytes", 1536.0), "1.50 KiB");
//! ```

pub mod app;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod navigation;
pub mod settings;
pub mod source;
pub mod ui;
pub mod units;

// Re-export main types for convenience
pub use app::App;
pub use dashboard::{Dashboard, DashboardView, DEFAULT_REFRESH_INTERVAL};
pub use data::{Labels, MetricType, RateWindow, Series, SeriesStore};
pub use error::{Error, Result};
pub use export::Export;
pub use navigation::{Focus, Navigation};
pub use settings::{Overrides, Settings};
pub use source::{HttpSource, MetricsSource, Scheduler};
pub use units::{DisplayUnit, UnitClassifier, UnitsConfig};
