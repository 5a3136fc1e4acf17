//! Terminal rendering with ratatui.
//!
//! ```text
//! ┌──────────── 70% ────────────┬──── 30% ────┐
//! │ chart (60%)                 │ metric      │
//! │                             │ names       │
//! ├─────────────────────────────┤ (sidebar)   │
//! │ series table (40%)          │             │
//! └─────────────────────────────┴─────────────┘
//!  status bar
//! ```
//!
//! Everything drawn comes from the latest [`DashboardView`](crate::DashboardView)
//! held by the [`App`].

pub mod chart;
pub mod common;
pub mod series;
pub mod sidebar;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

use crate::app::App;

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Draw one frame.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        common::render_too_small(frame, app, area, (MIN_WIDTH, MIN_HEIGHT));
        return;
    }

    let [main, status] = Layout::vertical([Constraint::Min(8), Constraint::Length(1)]).areas(area);

    if !app.view.ready {
        common::render_splash(frame, app, main);
        common::render_status_bar(frame, app, status);
        return;
    }

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)]).areas(main);
    let [chart_area, series_area] =
        Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(left);

    app.fit_pages(sidebar::page_size(right), series::page_size(series_area));

    chart::render(frame, app, chart_area);
    series::render(frame, app, series_area);
    sidebar::render(frame, app, right);
    common::render_status_bar(frame, app, status);
}
