//! Common UI components: status bar, splash screen and size guard.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::dashboard::StatusView;

/// Key hints shown after the counters.
const CONTROLS: &str = "Q: quit │ /: filter │ Tab: focus │ ↑↓: nav │ []: rate │ e: export";

/// The one-line status text.
pub fn status_line(status: &StatusView) -> String {
    format!(
        " madVisor {} │ Targets: {} │ Metrics: {}/{} │ Series: {} │ Rate: {} │ {}",
        env!("CARGO_PKG_VERSION"),
        status.targets.join(", "),
        status.filtered_names,
        status.total_names,
        status.total_series,
        status.rate_window,
        CONTROLS,
    )
}

/// Render the status bar at the bottom.
///
/// A pending status message takes the whole line until it expires.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let paragraph = Paragraph::new(status_line(&app.view.status))
        .style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Shown until the first metric name arrives.
pub fn render_splash(frame: &mut Frame, app: &App, area: Rect) {
    let targets = app.view.status.targets.join(", ");
    let text = vec![
        Line::styled("madVisor", app.theme.header),
        Line::from(""),
        Line::from("Connecting to targets ..."),
        Line::styled(targets, app.theme.muted),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.panel_border(false));

    let height = (text.len() as u16 + 2).min(area.height);
    let y = area.y + area.height.saturating_sub(height) / 2;
    let centered = Rect::new(area.x, y, area.width, height);

    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(block),
        centered,
    );
}

/// Shown instead of the dashboard when the terminal is below `min`.
pub fn render_too_small(frame: &mut Frame, app: &App, area: Rect, min: (u16, u16)) {
    let msg = format!(
        "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
        area.width, area.height, min.0, min.1
    );
    let paragraph = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.highlight));
    let height = 5u16.min(area.height);
    let y = area.y + area.height.saturating_sub(height) / 2;
    let centered = Rect::new(area.x, y, area.width, height);
    frame.render_widget(paragraph, centered);
}
