//! Series history, storage and rate derivation.
//!
//! ## Submodules
//!
//! - [`ring`]: Fixed-capacity circular sample buffer
//! - [`series`]: Series identity ([`series_key`]), [`MetricType`] and [`Series`]
//! - [`store`]: The concurrent [`SeriesStore`]
//! - [`rate`]: Windowed rate, per-pair rate slice and the stepped [`RateWindow`]
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "5s", "250ms")
//!
//! ## Data Flow
//!
//! ```text
//! scrape body
//!      │
//!      ▼
//! SeriesStore::update(name, labels, help, type, value)
//!      │
//!      ├──▶ series_key() ──▶ Series (created on first sight)
//!      │
//!      └──▶ RingBuffer::push()   (last 120 samples)
//!                 │
//!                 ▼
//!          rate() / rate_slice()  (read side, on copies)
//! ```

pub mod duration;
pub mod rate;
pub mod ring;
pub mod series;
pub mod store;

pub use rate::{RateWindow, DEFAULT_RATE_WINDOW, RATE_WINDOW_STEPS};
pub use ring::{RingBuffer, Sample, RING_CAPACITY};
pub use series::{series_key, Labels, MetricType, Series};
pub use store::{Family, SeriesStore};
