//! FilterInput — wraps tui-input for use as the search bar.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::Palette;

#[derive(Debug, PartialEq, Eq)]
pub enum FilterAction {
    Changed(String),
    Confirmed,
    Cancelled,
}

pub struct FilterInput {
    input: Input,
    active: bool,
    placeholder: String,
}

impl FilterInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder: placeholder.into(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn clear(&mut self) {
        self.input = Input::default();
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    /// Esc with text clears it and stays open; Esc on an empty bar closes it.
    /// Enter closes the bar but keeps the term.
    pub fn handle_key(&mut self, key: KeyEvent) -> FilterAction {
        match key.code {
            KeyCode::Esc => {
                if !self.input.value().is_empty() {
                    self.input = Input::default();
                    FilterAction::Changed(String::new())
                } else {
                    self.deactivate();
                    FilterAction::Cancelled
                }
            }
            KeyCode::Enter => {
                self.deactivate();
                FilterAction::Confirmed
            }
            _ => {
                self.input
                    .handle_event(&ratatui::crossterm::event::Event::Key(key));
                FilterAction::Changed(self.input.value().to_string())
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(4) as usize);
        let value = self.input.value();
        let display = if value.is_empty() {
            Span::styled(
                format!("/ {}", self.placeholder),
                Style::default().fg(palette.muted),
            )
        } else {
            Span::styled(
                format!("/ {}", value.chars().skip(scroll).collect::<String>()),
                Style::default().fg(palette.filter_fg),
            )
        };

        let paragraph =
            Paragraph::new(Line::from(vec![display])).style(Style::default().bg(palette.filter_bg));
        frame.render_widget(paragraph, area);

        if self.active && area.width > 0 {
            let cursor_x = area.x + 2 + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}

impl Default for FilterInput {
    fn default() -> Self {
        Self::new("search name or artist...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_reports_full_term() {
        let mut input = FilterInput::default();
        input.activate();
        assert_eq!(
            input.handle_key(key(KeyCode::Char('a'))),
            FilterAction::Changed("a".to_string())
        );
        assert_eq!(
            input.handle_key(key(KeyCode::Char('v'))),
            FilterAction::Changed("av".to_string())
        );
        assert_eq!(
            input.handle_key(key(KeyCode::Backspace)),
            FilterAction::Changed("a".to_string())
        );
    }

    #[test]
    fn test_escape_clears_then_closes() {
        let mut input = FilterInput::default();
        input.activate();
        input.handle_key(key(KeyCode::Char('x')));

        assert_eq!(
            input.handle_key(key(KeyCode::Esc)),
            FilterAction::Changed(String::new())
        );
        assert!(input.is_active());
        assert_eq!(input.handle_key(key(KeyCode::Esc)), FilterAction::Cancelled);
        assert!(!input.is_active());
    }

    #[test]
    fn test_enter_keeps_term() {
        let mut input = FilterInput::default();
        input.activate();
        input.handle_key(key(KeyCode::Char('q')));
        assert_eq!(input.handle_key(key(KeyCode::Enter)), FilterAction::Confirmed);
        assert!(!input.is_active());
        assert_eq!(input.text(), "q");
    }
}
