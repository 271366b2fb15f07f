//! CatalogState — the browser's single owned state and its transitions.
//!
//! Everything the list shows is derived from this value:
//! `dispatch(event)` applies one user or loader event, `view()` projects the
//! current page for rendering. Nothing here touches a terminal or network,
//! so the whole filter → paginate → render pipeline is testable directly.

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::{SongRecord, SourceConfig};
use crate::paginate;
use crate::search;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Why the list area shows no rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    /// Waiting for the configuration document.
    LoadingSources,
    /// Sources known, song lists still in flight.
    LoadingCatalogs,
    Ready,
    /// Configuration failed; the message replaces the list.
    Failed(String),
}

#[derive(Debug, Clone)]
pub enum Event {
    SourcesLoaded(Vec<SourceConfig>),
    SourcesFailed(String),
    CatalogsLoaded(HashMap<String, Vec<SongRecord>>),
    CatalogLoaded(String, Vec<SongRecord>),
    SelectSource(String),
    /// Move the active tab left (negative) or right, wrapping.
    SelectSourceOffset(isize),
    Search(String),
    NextPage,
    PreviousPage,
    GoToPage(usize),
}

#[derive(Debug, Clone)]
pub struct CatalogState {
    sources: Vec<SourceConfig>,
    active_source: Option<String>,
    records_by_source: HashMap<String, Vec<SongRecord>>,
    search_term: String,
    current_page: usize,
    page_size: usize,
    phase: LoadPhase,
}

/// A tab in the source strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub id: String,
    pub label: String,
    pub active: bool,
    /// `None` while the source's song list is still loading.
    pub song_count: Option<usize>,
}

/// Everything needed to draw the list area for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogView<'a> {
    pub tabs: Vec<TabView>,
    pub rows: Vec<&'a SongRecord>,
    pub page: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
    /// Records matching the search in the active source.
    pub filtered_count: usize,
    /// Records in the active source before filtering.
    pub total_count: usize,
    /// Index of the first row on this page within the filtered list.
    pub first_index: usize,
    /// Message to show instead of rows, if any.
    pub notice: Option<String>,
}

impl CatalogState {
    pub fn new(page_size: usize) -> Self {
        Self {
            sources: Vec::new(),
            active_source: None,
            records_by_source: HashMap::new(),
            search_term: String::new(),
            current_page: 1,
            page_size: page_size.max(1),
            phase: LoadPhase::LoadingSources,
        }
    }

    pub fn sources(&self) -> &[SourceConfig] {
        &self.sources
    }

    pub fn active_source(&self) -> Option<&str> {
        self.active_source.as_deref()
    }

    pub fn active_source_config(&self) -> Option<&SourceConfig> {
        let id = self.active_source.as_deref()?;
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn records_for(&self, source_id: &str) -> Option<&[SongRecord]> {
        self.records_by_source.get(source_id).map(Vec::as_slice)
    }

    /// Active source's records, or empty.
    pub fn active_records(&self) -> &[SongRecord] {
        self.active_source
            .as_deref()
            .and_then(|id| self.records_for(id))
            .unwrap_or(&[])
    }

    /// Active records narrowed by the current search term.
    pub fn filtered(&self) -> Vec<&SongRecord> {
        search::filter(self.active_records(), &self.search_term)
    }

    pub fn total_pages(&self) -> usize {
        paginate::total_pages(self.filtered().len(), self.page_size)
    }

    /// Apply one event. Returns `true` if anything visible changed.
    pub fn dispatch(&mut self, event: Event) -> bool {
        debug!("catalog event: {}", event_name(&event));
        match event {
            Event::SourcesLoaded(sources) => {
                self.active_source = sources.first().map(|s| s.id.clone());
                self.sources = sources;
                self.search_term.clear();
                self.current_page = 1;
                self.phase = LoadPhase::LoadingCatalogs;
                true
            }
            Event::SourcesFailed(message) => {
                self.phase = LoadPhase::Failed(message);
                true
            }
            Event::CatalogsLoaded(mut loaded) => {
                for source in &self.sources {
                    let songs = loaded.remove(&source.id).unwrap_or_default();
                    self.records_by_source.insert(source.id.clone(), songs);
                }
                self.phase = LoadPhase::Ready;
                self.normalize_page();
                true
            }
            Event::CatalogLoaded(id, songs) => {
                if !self.sources.iter().any(|s| s.id == id) {
                    return false;
                }
                let is_active = self.active_source.as_deref() == Some(id.as_str());
                self.records_by_source.insert(id, songs);
                if self
                    .sources
                    .iter()
                    .all(|s| self.records_by_source.contains_key(&s.id))
                {
                    self.phase = LoadPhase::Ready;
                }
                self.normalize_page();
                is_active
            }
            Event::SelectSource(id) => self.select_source(id),
            Event::SelectSourceOffset(delta) => {
                if self.sources.is_empty() {
                    return false;
                }
                let len = self.sources.len() as isize;
                let current = self
                    .active_source
                    .as_deref()
                    .and_then(|id| self.sources.iter().position(|s| s.id == id))
                    .unwrap_or(0) as isize;
                let next = (current + delta).rem_euclid(len) as usize;
                let id = self.sources[next].id.clone();
                self.select_source(id)
            }
            Event::Search(term) => {
                if term == self.search_term {
                    return false;
                }
                self.search_term = term;
                self.current_page = 1;
                true
            }
            Event::NextPage => {
                if self.current_page >= self.total_pages() {
                    return false;
                }
                self.current_page += 1;
                true
            }
            Event::PreviousPage => {
                if self.current_page <= 1 {
                    return false;
                }
                self.current_page -= 1;
                true
            }
            Event::GoToPage(page) => {
                let count = self.filtered().len();
                let page = paginate::normalize_page(page, count, self.page_size);
                let changed = page != self.current_page;
                self.current_page = page;
                changed
            }
        }
    }

    fn select_source(&mut self, id: String) -> bool {
        if !self.sources.iter().any(|s| s.id == id) {
            return false;
        }
        self.active_source = Some(id);
        self.search_term.clear();
        self.current_page = 1;
        true
    }

    fn normalize_page(&mut self) {
        let count = self.filtered().len();
        self.current_page = paginate::normalize_page(self.current_page, count, self.page_size);
    }

    /// Project the current page for rendering.
    pub fn view(&self) -> CatalogView<'_> {
        let tabs = self
            .sources
            .iter()
            .map(|s| TabView {
                id: s.id.clone(),
                label: s.label().to_string(),
                active: self.active_source.as_deref() == Some(s.id.as_str()),
                song_count: self.records_by_source.get(&s.id).map(Vec::len),
            })
            .collect();

        let filtered = self.filtered();
        let page = paginate::paginate(&filtered, self.current_page, self.page_size);
        let first_index = (page.number - 1) * self.page_size;
        let active_loaded = self
            .active_source
            .as_deref()
            .is_some_and(|id| self.records_by_source.contains_key(id));

        let notice = match &self.phase {
            LoadPhase::Failed(message) => Some(message.clone()),
            LoadPhase::LoadingSources => Some("Loading songs...".to_string()),
            _ if !active_loaded => Some("Loading songs...".to_string()),
            _ if filtered.is_empty() => Some("No songs found.".to_string()),
            _ => None,
        };

        CatalogView {
            tabs,
            rows: page.items.to_vec(),
            page: page.number,
            total_pages: page.total_pages,
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            filtered_count: filtered.len(),
            total_count: self.active_records().len(),
            first_index,
            notice,
        }
    }
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

fn event_name(event: &Event) -> String {
    match event {
        Event::SourcesLoaded(s) => format!("SourcesLoaded({})", s.len()),
        Event::SourcesFailed(_) => "SourcesFailed".to_string(),
        Event::CatalogsLoaded(m) => format!("CatalogsLoaded({})", m.len()),
        Event::CatalogLoaded(id, songs) => format!("CatalogLoaded({}, {})", id, songs.len()),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str) -> SourceConfig {
        SourceConfig {
            id: id.to_string(),
            name: format!("Drive {}", id),
            display_name: None,
            output_file: format!("songs-{}.json", id),
        }
    }

    fn songs(prefix: &str, n: usize) -> Vec<SongRecord> {
        (1..=n)
            .map(|i| SongRecord {
                id: Some(i as u32),
                name: format!("{} {:02}", prefix, i),
                artist: None,
                pdf_url: format!("https://drive.google.com/file/d/{}{}/view", prefix, i),
            })
            .collect()
    }

    fn loaded_state() -> CatalogState {
        let mut st = CatalogState::new(10);
        st.dispatch(Event::SourcesLoaded(vec![source("a"), source("b")]));
        let mut map = HashMap::new();
        map.insert("a".to_string(), songs("Hymn", 25));
        map.insert("b".to_string(), songs("Carol", 15));
        st.dispatch(Event::CatalogsLoaded(map));
        st
    }

    #[test]
    fn test_initial_state_has_no_source() {
        let st = CatalogState::default();
        assert_eq!(st.active_source(), None);
        assert_eq!(st.current_page(), 1);
        assert_eq!(st.phase(), &LoadPhase::LoadingSources);
        assert_eq!(st.view().notice.as_deref(), Some("Loading songs..."));
    }

    #[test]
    fn test_select_before_sources_is_noop() {
        let mut st = CatalogState::default();
        assert!(!st.dispatch(Event::SelectSource("a".to_string())));
        assert_eq!(st.active_source(), None);
    }

    #[test]
    fn test_sources_loaded_selects_first() {
        let st = loaded_state();
        assert_eq!(st.active_source(), Some("a"));
        assert_eq!(st.phase(), &LoadPhase::Ready);
        assert_eq!(st.total_pages(), 3);
    }

    #[test]
    fn test_missing_catalog_becomes_empty_list() {
        let mut st = CatalogState::new(10);
        st.dispatch(Event::SourcesLoaded(vec![source("a"), source("b")]));
        let mut map = HashMap::new();
        map.insert("a".to_string(), songs("Hymn", 3));
        st.dispatch(Event::CatalogsLoaded(map));
        assert_eq!(st.records_for("b").map(<[SongRecord]>::len), Some(0));
        st.dispatch(Event::SelectSource("b".to_string()));
        let view = st.view();
        assert!(view.rows.is_empty());
        assert_eq!(view.notice.as_deref(), Some("No songs found."));
    }

    #[test]
    fn test_switching_source_resets_page_and_search() {
        let mut st = loaded_state();
        st.dispatch(Event::Search("hymn".to_string()));
        st.dispatch(Event::NextPage);
        st.dispatch(Event::NextPage);
        assert_eq!(st.current_page(), 3);

        assert!(st.dispatch(Event::SelectSource("b".to_string())));
        assert_eq!(st.current_page(), 1);
        assert_eq!(st.search_term(), "");
        assert_eq!(st.view().filtered_count, 15);

        // Reselecting the same tab still resets
        st.dispatch(Event::NextPage);
        st.dispatch(Event::Search("carol 1".to_string()));
        st.dispatch(Event::SelectSource("b".to_string()));
        assert_eq!(st.current_page(), 1);
        assert_eq!(st.search_term(), "");
    }

    #[test]
    fn test_unknown_source_is_ignored() {
        let mut st = loaded_state();
        assert!(!st.dispatch(Event::SelectSource("zzz".to_string())));
        assert_eq!(st.active_source(), Some("a"));
    }

    #[test]
    fn test_page_guards() {
        let mut st = loaded_state();
        assert!(!st.dispatch(Event::PreviousPage));
        assert!(st.dispatch(Event::NextPage));
        assert!(st.dispatch(Event::NextPage));
        assert_eq!(st.current_page(), 3);
        assert!(!st.dispatch(Event::NextPage));
        assert_eq!(st.current_page(), 3);
        assert!(st.dispatch(Event::PreviousPage));
        assert_eq!(st.current_page(), 2);
    }

    #[test]
    fn test_go_to_out_of_range_page_resets() {
        let mut st = loaded_state();
        st.dispatch(Event::GoToPage(2));
        assert_eq!(st.current_page(), 2);
        st.dispatch(Event::GoToPage(4));
        assert_eq!(st.current_page(), 1);
    }

    #[test]
    fn test_search_narrows_and_resets_page() {
        let mut st = loaded_state();
        st.dispatch(Event::NextPage);
        st.dispatch(Event::Search("HYMN 2".to_string()));
        assert_eq!(st.current_page(), 1);
        let view = st.view();
        // "Hymn 20".."Hymn 25"
        assert_eq!(view.filtered_count, 6);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.total_count, 25);
        assert!(!view.has_next);
    }

    #[test]
    fn test_view_projects_current_page() {
        let mut st = loaded_state();
        st.dispatch(Event::GoToPage(3));
        let view = st.view();
        assert_eq!(view.page, 3);
        assert_eq!(view.rows.len(), 5);
        assert_eq!(view.rows[0].name, "Hymn 21");
        assert_eq!(view.first_index, 20);
        assert!(view.has_previous);
        assert!(!view.has_next);
        assert_eq!(view.tabs.len(), 2);
        assert!(view.tabs[0].active);
        assert_eq!(view.tabs[1].song_count, Some(15));
    }

    #[test]
    fn test_tab_offset_wraps() {
        let mut st = loaded_state();
        st.dispatch(Event::SelectSourceOffset(1));
        assert_eq!(st.active_source(), Some("b"));
        st.dispatch(Event::SelectSourceOffset(1));
        assert_eq!(st.active_source(), Some("a"));
        st.dispatch(Event::SelectSourceOffset(-1));
        assert_eq!(st.active_source(), Some("b"));
    }

    #[test]
    fn test_late_catalog_for_inactive_source_is_kept() {
        let mut st = CatalogState::new(10);
        st.dispatch(Event::SourcesLoaded(vec![source("a"), source("b")]));
        assert!(st.dispatch(Event::CatalogLoaded("a".to_string(), songs("Hymn", 4))));
        assert_eq!(st.phase(), &LoadPhase::LoadingCatalogs);
        // Stale response for the inactive tab: stored, not visible
        assert!(!st.dispatch(Event::CatalogLoaded("b".to_string(), songs("Carol", 2))));
        assert_eq!(st.phase(), &LoadPhase::Ready);
        st.dispatch(Event::SelectSource("b".to_string()));
        assert_eq!(st.view().rows.len(), 2);
    }

    #[test]
    fn test_sources_failed_shows_message() {
        let mut st = CatalogState::default();
        st.dispatch(Event::SourcesFailed("Error loading songs.".to_string()));
        let view = st.view();
        assert_eq!(view.notice.as_deref(), Some("Error loading songs."));
        assert!(view.tabs.is_empty());
    }
}
