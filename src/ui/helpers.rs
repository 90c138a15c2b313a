use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};

use crate::crud::RowParity;

/// Severity levels shown in the footer and in message dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    pub(crate) fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Light or dark palette, toggled at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Theme {
    pub(crate) dark: bool,
}

impl Theme {
    pub(crate) fn base(&self) -> Style {
        if self.dark {
            Style::default().fg(Color::Gray).bg(Color::Black)
        } else {
            Style::default()
        }
    }

    pub(crate) fn header(&self) -> Style {
        Style::default()
            .fg(if self.dark { Color::LightCyan } else { Color::Blue })
            .add_modifier(Modifier::BOLD)
    }

    /// Header cell of the column that `s` would sort by.
    pub(crate) fn sort_cursor(&self) -> Style {
        self.header().add_modifier(Modifier::UNDERLINED)
    }

    pub(crate) fn row(&self, parity: RowParity) -> Style {
        match (parity, self.dark) {
            (RowParity::Even, false) => Style::default(),
            (RowParity::Odd, false) => Style::default().bg(Color::Rgb(235, 240, 248)),
            (RowParity::Even, true) => Style::default().bg(Color::Black),
            (RowParity::Odd, true) => Style::default().bg(Color::Rgb(28, 32, 40)),
        }
    }

    pub(crate) fn selected(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn key(&self) -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn muted(&self) -> Style {
        Style::default().fg(Color::DarkGray)
    }
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Header text with an arrow on the active sort column.
pub(crate) fn heading_label(heading: &str, sorted: Option<bool>) -> String {
    match sorted {
        Some(false) => format!("{heading} ▲"),
        Some(true) => format!("{heading} ▼"),
        None => heading.to_string(),
    }
}
