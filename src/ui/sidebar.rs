//! Metric-name list with the filter line.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::Theme;
use crate::app::App;
use crate::dashboard::NameList;

/// Rows taken by the filter line and the two overflow markers.
const CHROME_ROWS: u16 = 3;

/// Name rows that fit in `area` once borders and chrome are taken.
pub fn page_size(area: Rect) -> usize {
    area.height.saturating_sub(2 + CHROME_ROWS).max(1) as usize
}

pub fn lines(list: &NameList, theme: &Theme) -> Vec<Line<'static>> {
    let mut out = Vec::with_capacity(list.rows.len() + CHROME_ROWS as usize);

    if list.filter_mode || !list.filter_text.is_empty() {
        let mut spans = vec![Span::styled("Filter", theme.header)];
        if !list.filter_valid {
            spans.push(Span::styled("(err)", Style::default().fg(theme.error)));
        }
        let cursor = if list.filter_mode { "█" } else { "" };
        spans.push(Span::raw(format!(": {}{}", list.filter_text, cursor)));
        out.push(Line::from(spans));
    }

    if list.rows.is_empty() {
        out.push(Line::styled("no metrics match filter", theme.muted));
        return out;
    }

    if list.hidden_above > 0 {
        out.push(Line::styled(format!("↑ {} more", list.hidden_above), theme.muted));
    }

    for row in &list.rows {
        let marker = match (row.selected, list.focused) {
            (true, true) => "▶ ",
            (true, false) => "› ",
            _ => "  ",
        };
        let mut text = format!("{}{} {}", marker, row.badge, row.name);
        if row.series_count > 1 {
            text.push_str(&format!(" ({})", row.series_count));
        }
        let style = if row.selected && list.focused {
            theme.selected
        } else if row.selected {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        out.push(Line::styled(text, style));
    }

    if list.hidden_below > 0 {
        out.push(Line::styled(format!("↓ {} more", list.hidden_below), theme.muted));
    }
    out
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let list = &app.view.names;
    let block = Block::default()
        .title(" Metrics ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.panel_border(list.focused));

    frame.render_widget(Paragraph::new(lines(list, &app.theme)).block(block), area);
}
