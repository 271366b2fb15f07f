//! PaneChrome — bordered pane with focus styling and a right-aligned badge.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
};

use crate::theme::Palette;

/// Text shown in the top-right of the pane border (e.g. "12/40").
pub struct Badge<'a> {
    pub text: &'a str,
    pub color: Color,
}

pub fn pane_chrome<'a>(
    title: &'a str,
    focused: bool,
    badge: Option<Badge<'a>>,
    palette: &Palette,
) -> Block<'a> {
    let border_style = if focused {
        palette.style_focused_border()
    } else {
        palette.style_unfocused_border()
    };

    let title_style = if focused {
        Style::default().fg(palette.primary).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.muted)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Line::from(vec![
            Span::raw(" "),
            Span::styled(title, title_style),
            Span::raw(" "),
        ]));

    match badge {
        Some(b) => block.title_top(
            Line::from(Span::styled(
                format!(" {} ", b.text),
                Style::default().fg(b.color).add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        ),
        None => block,
    }
}
