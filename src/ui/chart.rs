//! Line chart of the selected metric's history.

use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::Style,
    symbols::Marker,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.view.chart;
    let theme = &app.theme;
    let block = Block::default()
        .title(format!(" {} ", view.title))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.panel_border(false));

    if view.lines.is_empty() {
        let waiting = Paragraph::new("waiting for samples")
            .alignment(Alignment::Center)
            .style(theme.muted)
            .block(block);
        frame.render_widget(waiting, area);
        return;
    }

    let datasets: Vec<Dataset> = view
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            Dataset::default()
                .name(line.label.as_str())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme.series_color(i)))
                .data(&line.points)
        })
        .collect();

    let axis_style = Style::default().fg(theme.border);
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(Axis::default().style(axis_style).bounds(view.x_bounds))
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds(view.y_bounds)
                .labels(view.y_labels.iter().map(String::as_str)),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));

    frame.render_widget(chart, area);
}
