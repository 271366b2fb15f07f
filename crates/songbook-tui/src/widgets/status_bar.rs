//! Status bar — bottom line with input mode and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Filter,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "BROWSE",
            Self::Filter => "SEARCH",
        }
    }

    pub fn color(self, palette: &Palette) -> ratatui::style::Color {
        match self {
            Self::Normal => palette.mode_normal,
            Self::Filter => palette.mode_filter,
        }
    }

    fn keys(self) -> &'static str {
        match self {
            Self::Normal => {
                " ↑↓/jk select  ←→/hl page  Tab tabs  Enter view  s save  o reader  y copy  / search  t theme  ? help  q quit"
            }
            Self::Filter => " type to search  ↑↓ move  Enter keep  Esc clear+close",
        }
    }
}

/// Draw the keybindings footer bar (one row). `waiting` marks a pending
/// reader hand-off.
pub fn draw_keys_bar(
    frame: &mut Frame,
    area: Rect,
    mode: InputMode,
    waiting: bool,
    palette: &Palette,
) {
    let mut spans = vec![Span::styled(
        format!(" {} ", mode.label()),
        Style::default()
            .fg(mode.color(palette))
            .add_modifier(Modifier::BOLD),
    )];
    if waiting {
        spans.push(Span::styled(
            "● reader ",
            Style::default().fg(palette.toast_warning),
        ));
    }
    spans.push(Span::styled(mode.keys(), Style::default().fg(palette.muted)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect, palette: &Palette) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(palette.separator),
    ));
    frame.render_widget(Paragraph::new(line), area);
}
