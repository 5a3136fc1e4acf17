//! Refresh task: derives an immutable view of the store for the renderer.
//!
//! Every tick the refresh loop reads the store and the navigation state,
//! computes everything the screen shows, and publishes the result as an
//! `Arc<DashboardView>` over a `watch` channel. The render side never touches
//! the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::data::duration::format_window;
use crate::data::{MetricType, RateWindow, Series, SeriesStore};
use crate::navigation::{Focus, NavSnapshot, Navigation};
use crate::units::{format, DisplayUnit, UnitClassifier};

/// Default time between view rebuilds.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(250);

/// One row of the metric-name list.
#[derive(Debug, Clone, PartialEq)]
pub struct NameRow {
    pub name: String,
    pub badge: &'static str,
    pub series_count: usize,
    pub selected: bool,
}

/// Visible page of the metric-name list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameList {
    pub rows: Vec<NameRow>,
    pub hidden_above: usize,
    pub hidden_below: usize,
    pub filter_text: String,
    pub filter_mode: bool,
    pub filter_valid: bool,
    pub focused: bool,
}

/// One row of the series table.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    /// `{k="v", ...}` or `(no labels)`.
    pub labels: String,
    pub value: String,
    pub selected: bool,
}

/// Series of the selected metric name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesTable {
    pub name: Option<String>,
    pub badge: &'static str,
    pub help: String,
    pub total: usize,
    pub rows: Vec<SeriesRow>,
    pub hidden_above: usize,
    pub hidden_below: usize,
    pub focused: bool,
}

/// How chart values are labelled on the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartScale {
    /// Per-second rates.
    Rate,
    /// Seconds since a timestamp.
    Age,
    /// Raw values in a display unit.
    #[default]
    Value,
}

/// One plotted line.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartView {
    pub title: String,
    pub scale: ChartScale,
    pub lines: Vec<ChartLine>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_labels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusView {
    pub filtered_names: usize,
    pub total_names: usize,
    pub total_series: usize,
    pub rate_window: String,
    pub targets: Vec<String>,
}

/// Everything one frame needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    /// False until the first metric name is known.
    pub ready: bool,
    pub names: NameList,
    pub series: SeriesTable,
    pub chart: ChartView,
    pub status: StatusView,
}

/// Builds [`DashboardView`]s from shared state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    store: Arc<SeriesStore>,
    nav: Arc<Navigation>,
    classifier: Arc<UnitClassifier>,
    rate_window: Arc<RateWindow>,
    targets: Vec<String>,
}

impl Dashboard {
    pub fn new(
        store: Arc<SeriesStore>,
        nav: Arc<Navigation>,
        classifier: Arc<UnitClassifier>,
        rate_window: Arc<RateWindow>,
        targets: Vec<String>,
    ) -> Self {
        Self {
            store,
            nav,
            classifier,
            rate_window,
            targets,
        }
    }

    /// View shown before any metric arrives.
    pub fn waiting_view(&self) -> DashboardView {
        DashboardView {
            ready: false,
            status: self.status(0, 0),
            ..Default::default()
        }
    }

    /// Sync navigation with the store and build a fresh view.
    pub fn refresh(&self) -> DashboardView {
        let names = self.store.names();
        if names.is_empty() {
            return self.waiting_view();
        }
        let total_names = names.len();
        self.nav.set_keys(names);

        let selected = self.nav.selected_name();
        let family = selected
            .as_deref()
            .map(|n| self.store.series_for_name(n))
            .unwrap_or_default();
        self.nav.clamp_series(family.len());

        let nav = self.nav.snapshot();
        let window = self.rate_window.get();

        DashboardView {
            ready: true,
            names: self.name_list(&nav),
            series: self.series_table(&nav, &family, window),
            chart: self.chart(&nav, &family),
            status: self.status(nav.filtered.len(), total_names),
        }
    }

    /// Rebuild and publish a view every `interval` until `shutdown` turns
    /// true or every receiver is gone.
    pub async fn run(
        self,
        interval: Duration,
        tx: watch::Sender<Arc<DashboardView>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(interval_ms = interval.as_millis() as u64, "refresh loop started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let view = self.refresh();
                    debug!(
                        names = view.status.total_names,
                        series = view.status.total_series,
                        "view refreshed"
                    );
                    if tx.send(Arc::new(view)).is_err() {
                        break;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("refresh loop stopped");
    }

    fn name_list(&self, nav: &NavSnapshot) -> NameList {
        let start = nav.scroll.min(nav.filtered.len());
        let rows: Vec<NameRow> = nav
            .visible()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let family = self.store.family(name);
                NameRow {
                    name: name.clone(),
                    badge: family.as_ref().map_or(MetricType::Unknown, |f| f.metric_type).badge(),
                    series_count: family.map_or(0, |f| f.series_count),
                    selected: start + i == nav.selected,
                }
            })
            .collect();

        NameList {
            hidden_above: start,
            hidden_below: nav.filtered.len() - start - rows.len(),
            rows,
            filter_text: nav.filter_text.clone(),
            filter_mode: nav.filter_mode,
            filter_valid: nav.filter_valid,
            focused: nav.focus == Focus::Names,
        }
    }

    fn series_table(&self, nav: &NavSnapshot, family: &[Series], window: Duration) -> SeriesTable {
        let focused = nav.focus == Focus::Series;
        let Some(name) = nav.selected_name() else {
            return SeriesTable {
                focused,
                ..Default::default()
            };
        };
        let meta = self.store.family(name);

        let start = nav.series_scroll.min(family.len());
        let end = (start + nav.series_page_size).min(family.len());
        let rows = family[start..end]
            .iter()
            .enumerate()
            .map(|(i, s)| SeriesRow {
                labels: label_cell(s),
                value: self.value_cell(s, window),
                selected: focused && start + i == nav.series_selected,
            })
            .collect();

        SeriesTable {
            name: Some(name.to_string()),
            badge: meta.as_ref().map_or(MetricType::Unknown, |f| f.metric_type).badge(),
            help: meta.map(|f| f.help).unwrap_or_default(),
            total: family.len(),
            rows,
            hidden_above: start,
            hidden_below: family.len() - end,
            focused,
        }
    }

    /// Rate for rated series, unit-formatted value otherwise, with the raw
    /// value appended when the two differ.
    fn value_cell(&self, s: &Series, window: Duration) -> String {
        let raw = s.last();
        let raw_str = raw.to_string();
        let shown = if s.should_rate() {
            format!("{}/s", format::format_generic(s.rate(window)))
        } else {
            self.classifier.format_value(&s.name, raw)
        };
        if shown == raw_str {
            shown
        } else {
            format!("{} ({})", shown, raw_str)
        }
    }

    fn chart(&self, nav: &NavSnapshot, family: &[Series]) -> ChartView {
        let Some(name) = nav.selected_name() else {
            return ChartView {
                title: "chart".to_string(),
                ..Default::default()
            };
        };

        let single = nav.focus == Focus::Series && nav.series_selected < family.len();
        let charted: &[Series] = if single {
            &family[nav.series_selected..=nav.series_selected]
        } else {
            family
        };

        let scale = match charted.first() {
            Some(s) if s.should_rate() => ChartScale::Rate,
            Some(s) if self.classifier.kind(&s.name) == DisplayUnit::Timestamp => ChartScale::Age,
            _ => ChartScale::Value,
        };

        let title = match (single, charted.first()) {
            (true, Some(s)) if s.should_rate() => format!("{} [rate/s]", s.display_name()),
            (true, Some(s)) if self.classifier.kind(&s.name) == DisplayUnit::Timestamp => {
                format!("{} [age]", s.display_name())
            }
            (true, Some(s)) => format!("{}{}", s.display_name(), self.classifier.suffix(&s.name)),
            _ => {
                let badge = self
                    .store
                    .family(name)
                    .map_or(MetricType::Unknown, |f| f.metric_type)
                    .badge();
                format!("{} {} ({} series)", badge, name, family.len())
            }
        };

        let now = format::unix_now();
        let lines: Vec<ChartLine> = charted
            .iter()
            .filter_map(|s| {
                let data = self.chart_data(s, now);
                if data.len() < 2 {
                    return None;
                }
                Some(ChartLine {
                    label: s.display_name(),
                    points: data.into_iter().enumerate().map(|(i, v)| (i as f64, v)).collect(),
                })
            })
            .collect();

        let x_max = lines
            .iter()
            .map(|l| l.points.len().saturating_sub(1))
            .max()
            .unwrap_or(0) as f64;
        let y_bounds = y_bounds(&lines);
        let axis_name = charted.first().map(|s| s.name.as_str()).unwrap_or(name);
        let y_labels = axis_ticks(y_bounds)
            .into_iter()
            .map(|v| self.axis_label(scale, axis_name, v))
            .collect();

        ChartView {
            title,
            scale,
            lines,
            x_bounds: [0.0, x_max.max(1.0)],
            y_bounds,
            y_labels,
        }
    }

    fn chart_data(&self, s: &Series, now: f64) -> Vec<f64> {
        if s.should_rate() {
            return s.rate_slice();
        }
        let raw = s.history.slice();
        if self.classifier.kind(&s.name) == DisplayUnit::Timestamp {
            return raw
                .into_iter()
                .map(|v| if v > 0.0 { now - v } else { 0.0 })
                .collect();
        }
        raw
    }

    fn axis_label(&self, scale: ChartScale, name: &str, v: f64) -> String {
        if v.is_nan() {
            return String::new();
        }
        match scale {
            ChartScale::Rate => format!("{}/s", format::format_generic(v)),
            ChartScale::Age => Duration::try_from_secs_f64(v.max(0.0))
                .map(format::format_rel_duration)
                .unwrap_or_default(),
            ChartScale::Value => self.classifier.format_value(name, v),
        }
    }

    fn status(&self, filtered_names: usize, total_names: usize) -> StatusView {
        StatusView {
            filtered_names,
            total_names,
            total_series: self.store.series_count(),
            rate_window: format_window(self.rate_window.get()),
            targets: self.targets.clone(),
        }
    }
}

fn label_cell(s: &Series) -> String {
    if s.labels.is_empty() {
        "(no labels)".to_string()
    } else {
        format!("{{{}}}", s.label_text(", "))
    }
}

/// Min/max over every finite point, padded so the range is never empty.
fn y_bounds(lines: &[ChartLine]) -> [f64; 2] {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (_, y) in lines.iter().flat_map(|l| l.points.iter()) {
        if y.is_finite() {
            lo = lo.min(*y);
            hi = hi.max(*y);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if hi - lo < f64::EPSILON {
        let pad = if hi.abs() > 0.0 { hi.abs() * 0.1 } else { 1.0 };
        return [lo - pad, hi + pad];
    }
    [lo, hi]
}

fn axis_ticks([lo, hi]: [f64; 2]) -> Vec<f64> {
    vec![lo, (lo + hi) / 2.0, hi]
}
