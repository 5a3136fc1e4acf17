//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Colors cycled through for chart lines.
const DARK_SERIES: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::LightRed,
    Color::LightBlue,
];

const LIGHT_SERIES: [Color; 6] = [
    Color::Blue,
    Color::Red,
    Color::Magenta,
    Color::Green,
    Color::DarkGray,
    Color::Cyan,
];

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for focused panels and the status bar.
    pub highlight: Color,
    /// Color for an invalid filter pattern.
    pub error: Color,
    /// Color for unfocused borders and overflow markers.
    pub border: Color,
    /// Style for panel headers.
    pub header: Style,
    /// Style for the selected row.
    pub selected: Style,
    /// Style for help and hint text.
    pub muted: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
    series: &'static [Color],
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            error: Color::Red,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            border_type: BorderType::Rounded,
            series: &DARK_SERIES,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            error: Color::Red,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
            series: &LIGHT_SERIES,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color of the `i`th chart line.
    pub fn series_color(&self, i: usize) -> Color {
        self.series[i % self.series.len()]
    }

    /// Border style for a panel that may hold the input focus.
    pub fn panel_border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.highlight)
        } else {
            Style::default().fg(self.border)
        }
    }
}
