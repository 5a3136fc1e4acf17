//! Series table for the selected metric name.

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::Theme;
use crate::app::App;
use crate::dashboard::SeriesTable;

/// Header, help and the two overflow markers.
const CHROME_ROWS: u16 = 4;

pub fn page_size(area: Rect) -> usize {
    area.height.saturating_sub(2 + CHROME_ROWS).max(1) as usize
}

pub fn lines(table: &SeriesTable, theme: &Theme) -> Vec<Line<'static>> {
    let Some(name) = &table.name else {
        return vec![Line::styled("select a metric name", theme.muted)];
    };

    let mut out = vec![Line::styled(
        format!(" {} {} — {} series", table.badge, name, table.total),
        theme.header,
    )];
    if !table.help.is_empty() {
        out.push(Line::styled(format!(" {}", table.help), theme.muted));
    }
    if table.hidden_above > 0 {
        out.push(Line::styled(format!("↑ {} more", table.hidden_above), theme.muted));
    }
    for row in &table.rows {
        let marker = if row.selected { "▶ " } else { "  " };
        let style = if row.selected {
            theme.selected
        } else {
            Style::default()
        };
        out.push(Line::styled(
            format!("{}{} = {}", marker, row.labels, row.value),
            style,
        ));
    }
    if table.hidden_below > 0 {
        out.push(Line::styled(format!("↓ {} more", table.hidden_below), theme.muted));
    }
    out
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let table = &app.view.series;
    let block = Block::default()
        .title(" Series ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.panel_border(table.focused));

    frame.render_widget(Paragraph::new(lines(table, &app.theme)).block(block), area);
}
