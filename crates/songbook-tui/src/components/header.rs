//! Header component — one-row top bar with the app title and the source tabs.
//!
//! Tabs are clickable; the rects from the last draw are kept for hit-testing.

use ratatui::crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use songbook_core::state::{LoadPhase, TabView};
use unicode_width::UnicodeWidthStr;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
};

const TITLE: &str = " songbook ";

pub struct Header {
    /// (area, source id) per tab from the last draw.
    tab_areas: Vec<(Rect, String)>,
}

impl Header {
    pub fn new() -> Self {
        Self {
            tab_areas: Vec::new(),
        }
    }

    fn tab_at(&self, col: u16, row: u16) -> Option<&str> {
        self.tab_areas
            .iter()
            .find(|(r, _)| col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height)
            .map(|(_, id)| id.as_str())
    }
}

/// Label for one tab, with the song count once it has loaded.
pub fn tab_text(tab: &TabView) -> String {
    match tab.song_count {
        Some(n) => format!(" {} ({}) ", tab.label, n),
        None => format!(" {} (…) ", tab.label),
    }
}

impl Component for Header {
    fn id(&self) -> ComponentId {
        ComponentId::Tabs
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => self
                .tab_at(event.column, event.row)
                .map(|id| vec![Action::SelectSource(id.to_string())])
                .unwrap_or_default(),
            MouseEventKind::ScrollUp => vec![Action::SelectSourceOffset(-1)],
            MouseEventKind::ScrollDown => vec![Action::SelectSourceOffset(1)],
            _ => vec![],
        }
    }

    fn on_action(&mut self, _action: &Action, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let palette = state.palette();
        self.tab_areas.clear();

        let mut spans = vec![Span::styled(
            TITLE,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )];
        let mut x = area.x + TITLE.width() as u16;

        let tabs = state.catalog.view().tabs;
        if tabs.is_empty() {
            let msg = match state.catalog.phase() {
                LoadPhase::Failed(_) => "  no sources",
                _ => "  loading sources…",
            };
            spans.push(Span::styled(msg, palette.style_muted()));
        }

        for (i, tab) in tabs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("│", Style::default().fg(palette.separator)));
                x += 1;
            }
            let text = tab_text(tab);
            let w = text.width() as u16;
            let style = if tab.active {
                palette.style_active_tab()
            } else {
                palette.style_secondary()
            };
            if x < area.x + area.width {
                let width = w.min(area.x + area.width - x);
                self.tab_areas
                    .push((Rect::new(x, area.y, width, 1), tab.id.clone()));
            }
            spans.push(Span::styled(text, style));
            x += w;
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);

        let mode = if state.dark_mode { "dark " } else { "light " };
        let mode_w = mode.len() as u16;
        if area.width > mode_w && x + mode_w < area.x + area.width {
            let mode_area = Rect::new(area.x + area.width - mode_w, area.y, mode_w, 1);
            frame.render_widget(
                Paragraph::new(Span::styled(mode, palette.style_muted())),
                mode_area,
            );
        }
    }
}
