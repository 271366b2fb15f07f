//! Pager — "‹ prev   Page 2 of 5   next ›" row under the song list.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::Palette;

const PREVIOUS: &str = "‹ prev";
const NEXT: &str = "next ›";
const GAP: u16 = 3;

/// Click targets from the last draw.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PagerAreas {
    pub previous: Rect,
    pub next: Rect,
}

pub fn page_label(page: usize, total_pages: usize) -> String {
    format!("Page {} of {}", page, total_pages)
}

/// Where the buttons land when the row is centered in `area`.
pub fn pager_layout(area: Rect, label: &str) -> PagerAreas {
    let prev_w = PREVIOUS.chars().count() as u16;
    let next_w = NEXT.chars().count() as u16;
    let label_w = label.chars().count() as u16;
    let total = prev_w + GAP + label_w + GAP + next_w;
    let x = area.x + area.width.saturating_sub(total) / 2;
    PagerAreas {
        previous: Rect {
            x,
            y: area.y,
            width: prev_w.min(area.width),
            height: 1,
        },
        next: Rect {
            x: x + prev_w + GAP + label_w + GAP,
            y: area.y,
            width: next_w,
            height: 1,
        },
    }
}

pub fn draw_pager(
    frame: &mut Frame,
    area: Rect,
    page: usize,
    total_pages: usize,
    has_previous: bool,
    has_next: bool,
    palette: &Palette,
) -> PagerAreas {
    let button = |enabled: bool| {
        if enabled {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.muted)
        }
    };
    let gap = " ".repeat(GAP as usize);
    let label = page_label(page, total_pages);
    let areas = pager_layout(area, &label);

    let line = Line::from(vec![
        Span::styled(PREVIOUS, button(has_previous)),
        Span::raw(gap.clone()),
        Span::styled(label, palette.style_secondary()),
        Span::raw(gap),
        Span::styled(NEXT, button(has_next)),
    ])
    .centered();
    frame.render_widget(Paragraph::new(line), area);
    areas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_label() {
        assert_eq!(page_label(2, 3), "Page 2 of 3");
    }

    #[test]
    fn test_layout_centers_buttons() {
        let area = Rect::new(0, 10, 40, 1);
        let label = page_label(1, 2);
        let areas = pager_layout(area, &label);
        // 6 + 3 + 11 + 3 + 6 = 29 columns, centered in 40.
        assert_eq!(areas.previous, Rect::new(5, 10, 6, 1));
        assert_eq!(areas.next, Rect::new(28, 10, 6, 1));
    }
}
