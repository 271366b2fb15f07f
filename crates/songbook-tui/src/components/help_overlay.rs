//! HelpOverlay component — centered popup with keyboard shortcut reference.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::Palette,
};

pub struct HelpOverlay {
    pub visible: bool,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }
}

impl Component for HelpOverlay {
    fn id(&self) -> ComponentId {
        ComponentId::HelpOverlay
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.visible {
            return vec![];
        }
        // Printable keys, Esc and Enter close the overlay
        match key.code {
            KeyCode::Char(_) | KeyCode::Esc | KeyCode::Enter => vec![Action::ToggleHelp],
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, _event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ToggleHelp = action {
            self.visible = !self.visible;
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if !self.visible {
            return;
        }
        let palette = state.palette();
        let popup = centered_rect(64, 27, area);
        let section = |title: &'static str| {
            Line::from(Span::styled(
                title,
                Style::default()
                    .fg(palette.muted)
                    .add_modifier(Modifier::BOLD),
            ))
        };

        let help_lines: Vec<Line> = vec![
            Line::from(Span::styled(
                " keyboard shortcuts",
                Style::default()
                    .fg(palette.primary)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            section(" songs"),
            help_row("↑ / ↓  or  j / k", "move selection", palette),
            help_row("enter  or  v", "view PDF in the browser", palette),
            help_row("s", "save PDF to the downloads folder", palette),
            help_row("o", "open PDF in the external reader", palette),
            help_row("y", "copy the view link", palette),
            Line::from(""),
            section(" pages & sources"),
            help_row("← / →  or  h / l", "previous / next page", palette),
            help_row("< / >", "first / last page", palette),
            help_row("tab / shift-tab", "next / previous source", palette),
            help_row("[ / ]", "previous / next source", palette),
            help_row("1 … 9", "jump to source tab", palette),
            Line::from(""),
            section(" search & ui"),
            help_row("/", "search name or artist", palette),
            help_row("esc", "clear search, then close it", palette),
            help_row("t", "toggle dark / light theme", palette),
            help_row("K", "toggle keys bar", palette),
            help_row("?", "toggle this help overlay", palette),
            help_row("q / Ctrl+C", "quit", palette),
            Line::from(""),
            Line::from(Span::styled(
                " mouse: click tabs, rows, [view] [save] and the pager",
                Style::default().fg(palette.muted),
            )),
        ];

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(help_lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(palette.panel_border))
                        .style(Style::default().bg(palette.overlay_bg)),
                )
                .wrap(Wrap { trim: false }),
            popup,
        );
    }
}

fn help_row<'a>(key: &'a str, desc: &'a str, palette: &Palette) -> Line<'a> {
    Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{:<20}", key),
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc, Style::default().fg(palette.secondary)),
    ])
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1])[1]
}
