//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use std::collections::HashMap;

use songbook_core::state::CatalogState;

use crate::download_manager::DownloadStatus;
use crate::theme::Palette;
use crate::widgets::status_bar::InputMode;

pub struct AppState {
    pub catalog: CatalogState,
    pub input_mode: InputMode,
    pub dark_mode: bool,
    /// Download status keyed by direct-download URL.
    pub downloads: HashMap<String, DownloadStatus>,
    /// A reader hand-off is waiting for focus loss or its fallback timer.
    pub handoff_pending: bool,
    /// Where the catalog configuration was loaded from, for the status line.
    pub config_location: String,
}

impl AppState {
    pub fn new(page_size: usize, dark_mode: bool, config_location: String) -> Self {
        Self {
            catalog: CatalogState::new(page_size),
            input_mode: InputMode::Normal,
            dark_mode,
            downloads: HashMap::new(),
            handoff_pending: false,
            config_location,
        }
    }

    pub fn palette(&self) -> &'static Palette {
        Palette::for_mode(self.dark_mode)
    }

    pub fn download_status_for(&self, url: &str) -> Option<&DownloadStatus> {
        self.downloads.get(url)
    }
}
