//! Color palettes and style helpers for the songbook TUI.
//!
//! There are two palettes, dark and light; the persisted `darkMode` flag picks
//! one at startup and `t` swaps them at runtime.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub accent: Color,
    pub muted: Color,
    pub separator: Color,
    pub secondary: Color,
    pub primary: Color,
    pub selection_bg: Color,
    pub panel_border: Color,
    pub panel_border_focused: Color,
    pub number_hint: Color,
    pub filter_bg: Color,
    pub filter_fg: Color,
    pub artist: Color,
    pub tab_active_bg: Color,
    pub overlay_bg: Color,
    pub toast_info: Color,
    pub toast_success: Color,
    pub toast_warning: Color,
    pub toast_error: Color,
    pub mode_normal: Color,
    pub mode_filter: Color,
}

pub const DARK: Palette = Palette {
    bg: Color::Rgb(18, 18, 18),
    accent: Color::Rgb(255, 95, 95),
    muted: Color::Rgb(72, 72, 88),
    separator: Color::Rgb(40, 40, 52),
    secondary: Color::Rgb(115, 115, 138),
    primary: Color::Rgb(210, 210, 225),
    selection_bg: Color::Rgb(28, 28, 40),
    panel_border: Color::Rgb(40, 40, 52),
    panel_border_focused: Color::Rgb(120, 100, 200),
    number_hint: Color::Rgb(90, 90, 115),
    filter_bg: Color::Rgb(20, 20, 32),
    filter_fg: Color::Rgb(255, 200, 80),
    artist: Color::Rgb(100, 160, 130),
    tab_active_bg: Color::Rgb(44, 36, 72),
    overlay_bg: Color::Rgb(18, 18, 26),
    toast_info: Color::Rgb(80, 160, 220),
    toast_success: Color::Rgb(80, 200, 120),
    toast_warning: Color::Rgb(255, 184, 80),
    toast_error: Color::Rgb(255, 95, 95),
    mode_normal: Color::Rgb(115, 115, 138),
    mode_filter: Color::Rgb(255, 200, 80),
};

pub const LIGHT: Palette = Palette {
    bg: Color::Rgb(246, 245, 240),
    accent: Color::Rgb(196, 48, 48),
    muted: Color::Rgb(150, 150, 160),
    separator: Color::Rgb(215, 213, 205),
    secondary: Color::Rgb(95, 95, 110),
    primary: Color::Rgb(30, 30, 38),
    selection_bg: Color::Rgb(226, 222, 240),
    panel_border: Color::Rgb(205, 203, 195),
    panel_border_focused: Color::Rgb(110, 80, 190),
    number_hint: Color::Rgb(140, 140, 160),
    filter_bg: Color::Rgb(236, 232, 220),
    filter_fg: Color::Rgb(150, 90, 0),
    artist: Color::Rgb(40, 120, 85),
    tab_active_bg: Color::Rgb(220, 212, 245),
    overlay_bg: Color::Rgb(250, 249, 246),
    toast_info: Color::Rgb(30, 110, 180),
    toast_success: Color::Rgb(30, 140, 70),
    toast_warning: Color::Rgb(180, 110, 0),
    toast_error: Color::Rgb(196, 48, 48),
    mode_normal: Color::Rgb(95, 95, 110),
    mode_filter: Color::Rgb(150, 90, 0),
};

impl Palette {
    pub fn for_mode(dark_mode: bool) -> &'static Palette {
        if dark_mode {
            &DARK
        } else {
            &LIGHT
        }
    }

    pub fn style_default(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn style_secondary(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn style_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn style_accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn style_selected(&self) -> Style {
        Style::default().bg(self.selection_bg).fg(self.primary)
    }

    pub fn style_selected_focused(&self) -> Style {
        self.style_selected().add_modifier(Modifier::BOLD)
    }

    pub fn style_focused_border(&self) -> Style {
        Style::default().fg(self.panel_border_focused)
    }

    pub fn style_unfocused_border(&self) -> Style {
        Style::default().fg(self.panel_border)
    }

    pub fn style_filter(&self) -> Style {
        Style::default().fg(self.filter_fg).bg(self.filter_bg)
    }

    pub fn style_active_tab(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .bg(self.tab_active_bg)
            .add_modifier(Modifier::BOLD)
    }
}
