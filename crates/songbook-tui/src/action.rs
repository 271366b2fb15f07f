//! Action enum — all user-initiated intents.

use songbook_core::catalog::SongRecord;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Tabs,
    SongList,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Catalog ──────────────────────────────────────────────────────────────
    SelectSource(String),
    SelectSourceOffset(isize),
    Search(String),
    NextPage,
    PreviousPage,
    GoToPage(usize),

    // ── Song ─────────────────────────────────────────────────────────────────
    View(SongRecord),
    Download(SongRecord),
    OpenInReader(SongRecord),

    // ── Filter/search ────────────────────────────────────────────────────────
    OpenFilter,
    CloseFilter,

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleDarkMode,
    ToggleHelp,
    ToggleKeys,
    CopyToClipboard(String),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Noop,
}

impl Action {
    /// Whether this action moves the list to a different set of rows.
    pub fn changes_rows(&self) -> bool {
        matches!(
            self,
            Action::SelectSource(_)
                | Action::SelectSourceOffset(_)
                | Action::Search(_)
                | Action::NextPage
                | Action::PreviousPage
                | Action::GoToPage(_)
        )
    }
}
