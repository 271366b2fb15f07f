//! SongList component — the current page of the active source.
//!
//! Owns the row cursor and the search bar. Page and search changes go out as
//! actions; the rows themselves always come from `CatalogState::view()`.

use std::time::Instant;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use songbook_core::catalog::SongRecord;
use songbook_core::resolver;
use songbook_core::state::LoadPhase;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    download_manager::DownloadStatus,
    theme::Palette,
    widgets::{
        filter_input::{FilterAction, FilterInput},
        pager::{draw_pager, PagerAreas},
        pane_chrome::{pane_chrome, Badge},
    },
};

const VIEW_BUTTON: &str = "[view]";
const SAVE_BUTTON: &str = "[save]";
/// "[view] [save] "
const BUTTONS_W: u16 = 14;
const DOUBLE_CLICK_MS: u128 = 400;

pub struct SongList {
    pub filter_input: FilterInput,
    cursor: usize,
    list_state: ListState,
    rows_area: Rect,
    pager_areas: PagerAreas,
    /// Column where the row buttons start, from the last draw.
    buttons_x: Option<u16>,
    last_click: Option<(usize, Instant)>,
}

impl SongList {
    pub fn new() -> Self {
        Self {
            filter_input: FilterInput::default(),
            cursor: 0,
            list_state: ListState::default(),
            rows_area: Rect::default(),
            pager_areas: PagerAreas::default(),
            buttons_x: None,
            last_click: None,
        }
    }

    pub fn filter_active(&self) -> bool {
        self.filter_input.is_active()
    }

    fn selected<'a>(&self, state: &'a AppState) -> Option<&'a SongRecord> {
        let view = state.catalog.view();
        view.rows.get(self.cursor).copied()
    }

    fn song_action(&self, state: &AppState, make: fn(SongRecord) -> Action) -> Vec<Action> {
        self.selected(state)
            .map(|song| vec![make(song.clone())])
            .unwrap_or_default()
    }

    fn move_cursor(&mut self, delta: isize, state: &AppState) {
        let rows = state.catalog.view().rows.len();
        if rows == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, rows as isize - 1);
        self.cursor = next as usize;
    }

    fn render_row(
        &self,
        song: &SongRecord,
        number: usize,
        width: u16,
        selected: bool,
        focused: bool,
        status: Option<&DownloadStatus>,
        palette: &Palette,
    ) -> ListItem<'static> {
        let prefix = format!("{:>4}. ", number);
        let badge = status.map(|s| format!(" {} ", s.badge())).unwrap_or_default();
        let right_w = badge.width() + BUTTONS_W as usize;
        let avail = (width as usize).saturating_sub(prefix.width() + right_w);

        let name = truncate_to_width(&song.name, avail);
        let mut used = name.width();
        let artist = song
            .artist
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .map(|a| truncate_to_width(a, avail.saturating_sub(used + 2)))
            .filter(|a| !a.is_empty());
        if let Some(a) = &artist {
            used += 2 + a.width();
        }

        let name_style = if selected && focused {
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            palette.style_default()
        };
        let badge_color = match status {
            Some(DownloadStatus::Failed(_)) => palette.toast_error,
            Some(DownloadStatus::Downloaded { .. }) => palette.toast_success,
            _ => palette.toast_info,
        };

        let mut spans = vec![
            Span::styled(prefix, Style::default().fg(palette.number_hint)),
            Span::styled(name, name_style),
        ];
        if let Some(a) = artist {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(a, Style::default().fg(palette.artist)));
        }
        spans.push(Span::raw(" ".repeat(avail.saturating_sub(used))));
        spans.push(Span::styled(badge, Style::default().fg(badge_color)));
        let button_style = if selected {
            Style::default().fg(palette.accent)
        } else {
            palette.style_muted()
        };
        spans.push(Span::styled(VIEW_BUTTON, button_style));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(SAVE_BUTTON, button_style));
        spans.push(Span::raw(" "));

        let item = ListItem::new(Line::from(spans));
        if selected {
            item.style(if focused {
                palette.style_selected_focused()
            } else {
                palette.style_selected()
            })
        } else {
            item
        }
    }
}

impl Default for SongList {
    fn default() -> Self {
        Self::new()
    }
}

/// Cut `s` to at most `max` display columns, marking the cut with "…".
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut w = 0;
    for c in s.chars() {
        let cw = c.width().unwrap_or(0);
        if w + cw + 1 > max {
            break;
        }
        out.push(c);
        w += cw;
    }
    out.push('…');
    out
}

impl Component for SongList {
    fn id(&self) -> ComponentId {
        ComponentId::SongList
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }

        if self.filter_input.is_active() {
            match key.code {
                KeyCode::Up => {
                    self.move_cursor(-1, state);
                    return vec![];
                }
                KeyCode::Down => {
                    self.move_cursor(1, state);
                    return vec![];
                }
                _ => {}
            }
            return match self.filter_input.handle_key(key) {
                FilterAction::Changed(q) => vec![Action::Search(q)],
                FilterAction::Confirmed => vec![Action::CloseFilter],
                FilterAction::Cancelled => vec![Action::Search(String::new()), Action::CloseFilter],
            };
        }

        let view = state.catalog.view();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, state),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, state),
            KeyCode::Home | KeyCode::Char('g') => self.cursor = 0,
            KeyCode::End | KeyCode::Char('G') => self.cursor = view.rows.len().saturating_sub(1),

            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') | KeyCode::PageDown => {
                return vec![Action::NextPage];
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') | KeyCode::PageUp => {
                return vec![Action::PreviousPage];
            }
            KeyCode::Char('<') => return vec![Action::GoToPage(1)],
            KeyCode::Char('>') => return vec![Action::GoToPage(view.total_pages)],

            KeyCode::Enter | KeyCode::Char('v') => return self.song_action(state, Action::View),
            KeyCode::Char('s') => return self.song_action(state, Action::Download),
            KeyCode::Char('o') => return self.song_action(state, Action::OpenInReader),
            KeyCode::Char('y') => {
                if let Some(song) = self.selected(state) {
                    return vec![Action::CopyToClipboard(resolver::view_url(&song.pdf_url))];
                }
            }

            KeyCode::Char('/') => {
                self.filter_input.activate();
                return vec![Action::OpenFilter];
            }
            KeyCode::Esc if !state.catalog.search_term().is_empty() => {
                self.filter_input.clear();
                return vec![Action::Search(String::new())];
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        let (col, row) = (event.column, event.row);
        let hit = |r: Rect| {
            r.width > 0 && col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height
        };
        match event.kind {
            MouseEventKind::ScrollUp => self.move_cursor(-1, state),
            MouseEventKind::ScrollDown => self.move_cursor(1, state),
            MouseEventKind::Down(MouseButton::Left) => {
                if hit(self.pager_areas.previous) {
                    return vec![Action::PreviousPage];
                }
                if hit(self.pager_areas.next) {
                    return vec![Action::NextPage];
                }
                if !hit(self.rows_area) {
                    return vec![];
                }
                let idx = self.list_state.offset() + (row - self.rows_area.y) as usize;
                if idx >= state.catalog.view().rows.len() {
                    return vec![];
                }
                self.cursor = idx;

                if let Some(bx) = self.buttons_x {
                    let view_end = bx + VIEW_BUTTON.len() as u16;
                    let save_start = view_end + 1;
                    if col >= bx && col < view_end {
                        self.last_click = None;
                        return self.song_action(state, Action::View);
                    }
                    if col >= save_start && col < save_start + SAVE_BUTTON.len() as u16 {
                        self.last_click = None;
                        return self.song_action(state, Action::Download);
                    }
                }

                let now = Instant::now();
                let is_double = self
                    .last_click
                    .map(|(r, t)| r == idx && t.elapsed().as_millis() < DOUBLE_CLICK_MS)
                    .unwrap_or(false);
                if is_double {
                    self.last_click = None;
                    return self.song_action(state, Action::View);
                }
                self.last_click = Some((idx, now));
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if action.changes_rows() {
            self.cursor = 0;
            self.last_click = None;
        }
        match action {
            Action::SelectSource(_) | Action::SelectSourceOffset(_) => {
                let was_active = self.filter_input.is_active();
                self.filter_input.clear();
                self.filter_input.deactivate();
                if was_active {
                    return vec![Action::CloseFilter];
                }
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let palette = state.palette();
        let view = state.catalog.view();

        let title = state
            .catalog
            .active_source_config()
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| "songs".to_string());
        let badge_text = if state.catalog.search_term().is_empty() {
            format!("{} songs", view.total_count)
        } else {
            format!("{}/{} songs", view.filtered_count, view.total_count)
        };
        let block = pane_chrome(
            &title,
            focused,
            Some(Badge {
                text: &badge_text,
                color: palette.secondary,
            }),
            palette,
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let show_filter = self.filter_input.is_active() || !self.filter_input.is_empty();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(if show_filter { 1 } else { 0 }),
                Constraint::Length(1),
            ])
            .split(inner);
        self.rows_area = chunks[0];
        self.buttons_x = None;
        self.pager_areas = PagerAreas::default();

        if show_filter {
            self.filter_input.draw(frame, chunks[1], palette);
        }

        if let Some(notice) = &view.notice {
            let style = match state.catalog.phase() {
                LoadPhase::Failed(_) => Style::default().fg(palette.toast_error),
                _ => palette.style_muted(),
            };
            let y_pad = chunks[0].height / 2;
            let msg_area = Rect {
                y: chunks[0].y + y_pad.saturating_sub(1),
                height: chunks[0].height.saturating_sub(y_pad.saturating_sub(1)),
                ..chunks[0]
            };
            frame.render_widget(
                Paragraph::new(Span::styled(notice.clone(), style))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                msg_area,
            );
            return;
        }

        self.cursor = self.cursor.min(view.rows.len().saturating_sub(1));
        let width = chunks[0].width;
        let items: Vec<ListItem> = view
            .rows
            .iter()
            .enumerate()
            .map(|(i, song)| {
                let status = state.download_status_for(&resolver::download_target(&song.pdf_url, None).url);
                self.render_row(
                    song,
                    view.first_index + i + 1,
                    width,
                    i == self.cursor,
                    focused,
                    status,
                    palette,
                )
            })
            .collect();
        if width > BUTTONS_W {
            self.buttons_x = Some(chunks[0].x + width - BUTTONS_W);
        }

        // The page can be taller than the pane; ListState scrolls to the cursor
        self.list_state.select(Some(self.cursor));
        frame.render_stateful_widget(List::new(items), chunks[0], &mut self.list_state);

        self.pager_areas = draw_pager(
            frame,
            chunks[2],
            view.page,
            view.total_pages,
            view.has_previous,
            view.has_next,
            palette,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::crossterm::event::KeyModifiers;
    use ratatui::Terminal;
    use songbook_core::catalog::SourceConfig;
    use songbook_core::state::Event;
    use std::collections::HashMap;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded_state(n: usize) -> AppState {
        let mut state = AppState::new(10, true, "config.json".to_string());
        let source = SourceConfig {
            id: "a".to_string(),
            name: "Choir".to_string(),
            display_name: None,
            output_file: "songs-a.json".to_string(),
        };
        let songs: Vec<SongRecord> = (1..=n)
            .map(|i| SongRecord {
                id: None,
                name: format!("Song {:02}", i),
                artist: None,
                pdf_url: format!("https://drive.google.com/file/d/F{}/view", i),
            })
            .collect();
        state.catalog.dispatch(Event::SourcesLoaded(vec![source]));
        state
            .catalog
            .dispatch(Event::CatalogsLoaded(HashMap::from([("a".to_string(), songs)])));
        state
    }

    /// Draw into a `width` x `height` terminal and return the screen text.
    fn render(list: &mut SongList, state: &AppState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| list.draw(f, f.area(), true, state))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_short_pane_scrolls_to_last_row() {
        let state = loaded_state(10);
        let mut list = SongList::new();

        // Borders and pager leave five list rows for a ten-song page
        let screen = render(&mut list, &state, 60, 8);
        assert!(screen.contains("Song 01"));
        assert!(!screen.contains("Song 10"));

        for _ in 0..9 {
            list.handle_key(key(KeyCode::Down), &state);
        }
        let screen = render(&mut list, &state, 60, 8);
        assert!(screen.contains("Song 10"));
        assert!(!screen.contains("Song 01"));

        match list.handle_key(key(KeyCode::Enter), &state).as_slice() {
            [Action::View(song)] => assert_eq!(song.name, "Song 10"),
            other => panic!("unexpected actions: {other:?}"),
        }
    }

    #[test]
    fn test_click_maps_through_scroll_offset() {
        let state = loaded_state(10);
        let mut list = SongList::new();
        for _ in 0..9 {
            list.handle_key(key(KeyCode::Down), &state);
        }
        render(&mut list, &state, 60, 8);

        // First visible row, inside the top border
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 8,
            row: 1,
            modifiers: KeyModifiers::NONE,
        };
        list.handle_mouse(click, Rect::new(0, 0, 60, 8), &state);
        assert_eq!(list.cursor, 5);
        match list.handle_key(key(KeyCode::Enter), &state).as_slice() {
            [Action::View(song)] => assert_eq!(song.name, "Song 06"),
            other => panic!("unexpected actions: {other:?}"),
        }
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("Ave Maria", 20), "Ave Maria");
        assert_eq!(truncate_to_width("Ave Maria", 5), "Ave …");
        assert_eq!(truncate_to_width("Ave Maria", 0), "");
        assert_eq!(truncate_to_width("合唱曲集", 5), "合唱…");
    }

    #[test]
    fn test_cursor_stays_on_page() {
        let state = loaded_state(12);
        let mut list = SongList::new();
        for _ in 0..20 {
            list.handle_key(key(KeyCode::Down), &state);
        }
        assert_eq!(list.cursor, 9);
        list.handle_key(key(KeyCode::Char('g')), &state);
        assert_eq!(list.cursor, 0);
    }

    #[test]
    fn test_enter_views_selected_song() {
        let state = loaded_state(3);
        let mut list = SongList::new();
        list.handle_key(key(KeyCode::Down), &state);
        let actions = list.handle_key(key(KeyCode::Enter), &state);
        match actions.as_slice() {
            [Action::View(song)] => assert_eq!(song.name, "Song 02"),
            other => panic!("unexpected actions: {other:?}"),
        }
    }

    #[test]
    fn test_typing_in_filter_searches() {
        let state = loaded_state(3);
        let mut list = SongList::new();
        assert!(matches!(
            list.handle_key(key(KeyCode::Char('/')), &state).as_slice(),
            [Action::OpenFilter]
        ));
        match list.handle_key(key(KeyCode::Char('2')), &state).as_slice() {
            [Action::Search(q)] => assert_eq!(q, "2"),
            other => panic!("unexpected actions: {other:?}"),
        }
    }

    #[test]
    fn test_source_switch_clears_filter_and_cursor() {
        let state = loaded_state(5);
        let mut list = SongList::new();
        list.handle_key(key(KeyCode::Down), &state);
        list.handle_key(key(KeyCode::Char('/')), &state);
        list.handle_key(key(KeyCode::Char('x')), &state);

        let follow = list.on_action(&Action::SelectSourceOffset(1), &state);
        assert!(matches!(follow.as_slice(), [Action::CloseFilter]));
        assert_eq!(list.cursor, 0);
        assert!(list.filter_input.is_empty());
        assert!(!list.filter_active());
    }

    #[test]
    fn test_copy_uses_view_url() {
        let state = loaded_state(1);
        let mut list = SongList::new();
        match list.handle_key(key(KeyCode::Char('y')), &state).as_slice() {
            [Action::CopyToClipboard(url)] => {
                assert_eq!(url, "https://drive.google.com/file/d/F1/view")
            }
            other => panic!("unexpected actions: {other:?}"),
        }
    }
}
