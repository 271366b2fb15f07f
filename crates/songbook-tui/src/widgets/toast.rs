//! Toast notifications — transient status messages in the top-right corner.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::theme::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn icon(self) -> &'static str {
        match self {
            Self::Info => "·",
            Self::Success => "✓",
            Self::Warning => "!",
            Self::Error => "✗",
        }
    }

    fn color(self, palette: &Palette) -> Color {
        match self {
            Self::Info => palette.toast_info,
            Self::Success => palette.toast_success,
            Self::Warning => palette.toast_warning,
            Self::Error => palette.toast_error,
        }
    }
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Expiring toasts plus at most one spinner that stays until resolved.
pub struct ToastManager {
    toasts: VecDeque<Toast>,
    spinner: Option<(String, usize)>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            spinner: None,
            max_visible: 4,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity, duration: Duration) {
        let msg = message.into();
        self.toasts.retain(|t| t.message != msg);
        self.toasts.push_back(Toast {
            message: msg,
            severity,
            expires: Instant::now() + duration,
        });
        while self.toasts.len() > self.max_visible * 2 {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Info, Duration::from_secs(3));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success, Duration::from_secs(3));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Warning, Duration::from_secs(4));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error, Duration::from_secs(5));
    }

    /// Start or replace the spinner.
    pub fn spinner(&mut self, message: impl Into<String>) {
        self.spinner = Some((message.into(), 0));
    }

    /// Replace the spinner with a normal expiring toast.
    pub fn resolve_spinner(&mut self, severity: Severity, message: impl Into<String>) {
        self.spinner = None;
        let duration = match severity {
            Severity::Error => Duration::from_secs(5),
            _ => Duration::from_secs(3),
        };
        self.push(message, severity, duration);
    }

    /// Remove expired toasts and advance the spinner. Call each tick.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.toasts.retain(|t| t.expires > now);
        if let Some((_, frame)) = self.spinner.as_mut() {
            *frame = (*frame + 1) % SPINNER_FRAMES.len();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty() && self.spinner.is_none()
    }

    /// Spinner first, then newest toast first.
    pub fn draw(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        if self.is_empty() {
            return;
        }
        let max_width = (area.width / 2).clamp(30, 60);
        let mut lines: Vec<(String, Color)> = Vec::new();
        if let Some((message, frame_idx)) = &self.spinner {
            let icon = SPINNER_FRAMES[frame_idx % SPINNER_FRAMES.len()];
            lines.push((format!(" {} {} ", icon, message), palette.toast_info));
        }
        for toast in self.toasts.iter().rev().take(self.max_visible) {
            lines.push((
                format!(" {} {} ", toast.severity.icon(), toast.message),
                toast.severity.color(palette),
            ));
        }

        for (i, (text, color)) in lines.into_iter().enumerate() {
            let y = area.y + 1 + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let w = (text.chars().count() as u16).min(max_width).min(area.width);
            let toast_area = Rect {
                x: area.x + area.width.saturating_sub(w + 1),
                y,
                width: w,
                height: 1,
            };
            frame.render_widget(Clear, toast_area);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    text,
                    Style::default()
                        .fg(color)
                        .bg(palette.overlay_bg)
                        .add_modifier(Modifier::BOLD),
                ))),
                toast_area,
            );
        }
    }

    #[cfg(test)]
    fn messages(&self) -> Vec<&str> {
        self.toasts.iter().map(|t| t.message.as_str()).collect()
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_moves_to_back() {
        let mut toasts = ToastManager::new();
        toasts.info("a");
        toasts.info("b");
        toasts.info("a");
        assert_eq!(toasts.messages(), vec!["b", "a"]);
    }

    #[test]
    fn test_expired_toasts_dropped_on_tick() {
        let mut toasts = ToastManager::new();
        toasts.push("gone", Severity::Info, Duration::ZERO);
        toasts.success("stays");
        toasts.tick();
        assert_eq!(toasts.messages(), vec!["stays"]);
    }

    #[test]
    fn test_spinner_resolves_into_toast() {
        let mut toasts = ToastManager::new();
        toasts.spinner("downloading Gloria.pdf");
        assert!(!toasts.is_empty());
        toasts.resolve_spinner(Severity::Success, "saved Gloria.pdf");
        assert!(toasts.spinner.is_none());
        assert_eq!(toasts.messages(), vec!["saved Gloria.pdf"]);
    }
}
