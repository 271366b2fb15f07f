//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks:
//!   terminal input, the catalog loader and reader hand-off results.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use songbook_core::catalog::{CatalogLoader, Location, SongRecord};
use songbook_core::config::Config;
use songbook_core::handoff::{Handoff, HandoffOutcome};
use songbook_core::prefs::UiPrefs;
use songbook_core::resolver;
use songbook_core::state::Event as CatalogEvent;

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    components::{header::Header, help_overlay::HelpOverlay, song_list::SongList},
    download_manager::{DownloadManager, DownloadStatus},
    launcher,
    widgets::{
        status_bar::{self, InputMode},
        toast::{Severity, ToastManager},
    },
};

// ── Messages into the event loop ─────────────────────────────────────────────

enum AppMessage {
    /// Raw terminal event.
    Event(Event),
    /// Loader result for the catalog state.
    Catalog(CatalogEvent),
    /// A reader hand-off race finished.
    HandoffSettled {
        seq: u64,
        direct_url: String,
        outcome: HandoffOutcome,
    },
}

/// Screen areas from the last draw, for mouse hit-testing.
#[derive(Debug, Default, Clone, Copy)]
struct PaneAreas {
    header: Rect,
    song_list: Rect,
}

/// The reader hand-off waiting on focus loss, if any. Each one gets a
/// sequence number so results of superseded hand-offs can be told apart.
#[derive(Debug, Default)]
struct HandoffSlot {
    pending: Option<(u64, CancellationToken)>,
    seq: u64,
}

impl HandoffSlot {
    /// Track `handoff` as the pending one, cancelling any older hand-off.
    fn arm(&mut self, handoff: &Handoff) -> u64 {
        self.cancel();
        self.seq += 1;
        self.pending = Some((self.seq, handoff.token()));
        self.seq
    }

    fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deliver focus loss to the pending hand-off. Returns its number.
    fn focus_lost(&self) -> Option<u64> {
        let (seq, token) = self.pending.as_ref()?;
        token.cancel();
        Some(*seq)
    }

    /// Clear the slot when `seq` is the pending hand-off. False when it was
    /// superseded.
    fn settle(&mut self, seq: u64) -> bool {
        match &self.pending {
            Some((pending, _)) if *pending == seq => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    fn cancel(&mut self) {
        if let Some((_, token)) = self.pending.take() {
            token.cancel();
        }
    }
}

fn hit(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height
}

pub struct App {
    config: Config,
    location: Location,
    ui_state_path: PathBuf,

    state: AppState,

    header: Header,
    song_list: SongList,
    help_overlay: HelpOverlay,

    downloads: DownloadManager,
    active_downloads: usize,
    toast: ToastManager,

    show_keys_bar: bool,
    should_quit: bool,
    pane_areas: PaneAreas,

    handoff: HandoffSlot,

    tx: Option<mpsc::Sender<AppMessage>>,
}

impl App {
    pub fn new(config: Config, location: Location, page_size: usize, ui_state_path: PathBuf) -> Self {
        let prefs = UiPrefs::load(&ui_state_path);
        let state = AppState::new(page_size, prefs.dark_mode, location.to_string());
        let downloads = DownloadManager::new(config.downloads.dir.clone());
        info!("downloads go to {}", downloads.download_dir().display());
        Self {
            config,
            location,
            ui_state_path,
            state,
            header: Header::new(),
            song_list: SongList::new(),
            help_overlay: HelpOverlay::new(),
            downloads,
            active_downloads: 0,
            toast: ToastManager::new(),
            show_keys_bar: true,
            should_quit: false,
            pane_areas: PaneAreas::default(),
            handoff: HandoffSlot::default(),
            tx: None,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        )?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, rx) = mpsc::channel::<AppMessage>(256);
        self.tx = Some(tx.clone());

        // ── Background task: keyboard/mouse/focus events ──────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: configuration, then every source ─────────────────
        spawn_catalog_load(self.location.clone(), tx);

        let result = self.event_loop(&mut terminal, rx).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        self.handoff.cancel();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableFocusChange
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        mut rx: mpsc::Receiver<AppMessage>,
    ) -> anyhow::Result<()> {
        // Toast expiry, spinner animation and download progress
        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    needs_redraw = self.handle_message(msg).await;
                }
                _ = toast_tick.tick() => {
                    let had_toasts = !self.toast.is_empty();
                    self.toast.tick();
                    let downloads_changed = self.poll_downloads();
                    needs_redraw = had_toasts || downloads_changed;
                }
            }
        }
        info!("songbook quitting");
        Ok(())
    }

    // ── Message handling ──────────────────────────────────────────────────────

    /// Returns whether the screen needs a redraw.
    async fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind == KeyEventKind::Release {
                    return false;
                }
                let actions = self.handle_key(key);
                for action in actions {
                    self.dispatch(action).await;
                }
                self.sync_input_mode();
                true
            }
            AppMessage::Event(Event::Mouse(mouse)) => {
                if mouse.kind == MouseEventKind::Moved {
                    return false;
                }
                let actions = self.handle_mouse(mouse);
                if actions.is_empty() {
                    return false;
                }
                for action in actions {
                    self.dispatch(action).await;
                }
                self.sync_input_mode();
                true
            }
            AppMessage::Event(Event::FocusLost) => {
                self.on_focus_lost();
                false
            }
            AppMessage::Event(_) => true,
            AppMessage::Catalog(event) => {
                match &event {
                    CatalogEvent::SourcesLoaded(sources) => {
                        info!("{} source(s) configured", sources.len());
                    }
                    CatalogEvent::SourcesFailed(msg) => {
                        self.toast.error(msg.clone());
                    }
                    CatalogEvent::CatalogsLoaded(catalogs) => {
                        let total: usize = catalogs.values().map(Vec::len).sum();
                        info!("{} song(s) loaded across {} source(s)", total, catalogs.len());
                    }
                    _ => {}
                }
                self.state.catalog.dispatch(event)
            }
            AppMessage::HandoffSettled {
                seq,
                direct_url,
                outcome,
            } => {
                self.on_handoff_settled(seq, direct_url, outcome);
                true
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }
        if self.help_overlay.visible {
            return self.help_overlay.handle_key(key, &self.state);
        }
        if self.state.input_mode == InputMode::Filter {
            return self.song_list.handle_key(key, &self.state);
        }

        match key.code {
            KeyCode::Char('q') => return vec![Action::Quit],
            KeyCode::Char('?') => return vec![Action::ToggleHelp],
            KeyCode::Char('K') => return vec![Action::ToggleKeys],
            KeyCode::Char('t') => return vec![Action::ToggleDarkMode],
            KeyCode::Tab | KeyCode::Char(']') => return vec![Action::SelectSourceOffset(1)],
            KeyCode::BackTab | KeyCode::Char('[') => return vec![Action::SelectSourceOffset(-1)],
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                return self
                    .state
                    .catalog
                    .sources()
                    .get(idx)
                    .map(|s| vec![Action::SelectSource(s.id.clone())])
                    .unwrap_or_default();
            }
            _ => {}
        }

        self.song_list.handle_key(key, &self.state)
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        if self.help_overlay.visible {
            return match event.kind {
                MouseEventKind::Down(_) => vec![Action::ToggleHelp],
                _ => vec![],
            };
        }
        let areas = self.pane_areas;
        let (component, area): (&mut dyn Component, Rect) =
            if hit(areas.header, event.column, event.row) {
                (&mut self.header, areas.header)
            } else if hit(areas.song_list, event.column, event.row) {
                (&mut self.song_list, areas.song_list)
            } else {
                return vec![];
            };
        let actions = component.handle_mouse(event, area, &self.state);
        if !actions.is_empty() {
            debug!("{:?} mouse → {:?}", component.id(), actions);
        }
        actions
    }

    fn sync_input_mode(&mut self) {
        self.state.input_mode = if self.song_list.filter_active() {
            InputMode::Filter
        } else {
            InputMode::Normal
        };
    }

    // ── Action dispatch ───────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        let secondary = {
            let state = &self.state;
            let mut out = Vec::new();
            out.extend(self.header.on_action(&action, state));
            out.extend(self.song_list.on_action(&action, state));
            out.extend(self.help_overlay.on_action(&action, state));
            out
        };
        self.apply_action(action).await;
        for action in secondary {
            self.apply_action(action).await;
        }
    }

    async fn apply_action(&mut self, action: Action) {
        match action {
            Action::SelectSource(id) => {
                self.state.catalog.dispatch(CatalogEvent::SelectSource(id));
            }
            Action::SelectSourceOffset(delta) => {
                self.state
                    .catalog
                    .dispatch(CatalogEvent::SelectSourceOffset(delta));
            }
            Action::Search(term) => {
                self.state.catalog.dispatch(CatalogEvent::Search(term));
            }
            Action::NextPage => {
                self.state.catalog.dispatch(CatalogEvent::NextPage);
            }
            Action::PreviousPage => {
                self.state.catalog.dispatch(CatalogEvent::PreviousPage);
            }
            Action::GoToPage(page) => {
                self.state.catalog.dispatch(CatalogEvent::GoToPage(page));
            }
            Action::View(song) => match launcher::open_view(&song.pdf_url) {
                Ok(url) => {
                    debug!("viewing {} at {}", song.name, url);
                    self.toast.info(format!("opened {}", song.name));
                }
                Err(e) => {
                    warn!("view failed: {:#}", e);
                    self.toast.error(format!("could not open browser: {}", e));
                }
            },
            Action::Download(song) => self.start_download(song).await,
            Action::OpenInReader(song) => self.open_in_reader(song),
            Action::OpenFilter | Action::CloseFilter => {}
            Action::ToggleDarkMode => {
                self.state.dark_mode = !self.state.dark_mode;
                let prefs = UiPrefs {
                    dark_mode: self.state.dark_mode,
                };
                if let Err(e) = prefs.save(&self.ui_state_path) {
                    warn!("failed to save ui state: {:#}", e);
                    self.toast.warning("theme not saved");
                }
            }
            Action::ToggleHelp => {}
            Action::ToggleKeys => {
                self.show_keys_bar = !self.show_keys_bar;
            }
            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(_) => self.toast.success(format!("copied {}", text)),
                    Err(e) => {
                        warn!("clipboard: {}", e);
                        self.toast.error("clipboard unavailable");
                    }
                }
            }
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Noop => {}
        }
    }

    // ── Downloads ─────────────────────────────────────────────────────────────

    async fn start_download(&mut self, song: SongRecord) {
        let target = resolver::download_target(&song.pdf_url, Some(&song.name));
        if self.downloads.is_downloading(&target.url) {
            self.toast.info(format!("{} is already downloading", song.name));
            return;
        }
        match self.downloads.start_download(&target).await {
            Ok(path) => {
                info!("downloading {} → {}", target.url, path.display());
                self.state.downloads.insert(
                    target.url.clone(),
                    DownloadStatus::Downloading {
                        received: 0,
                        total: None,
                    },
                );
                self.active_downloads += 1;
                let label = self.spinner_label(&song.name);
                self.toast.spinner(label);
            }
            Err(e) => self.toast.warning(format!("{}: {}", song.name, e)),
        }
    }

    fn spinner_label(&self, name: &str) -> String {
        match self.active_downloads {
            0 | 1 => format!("downloading {}", name),
            n => format!("downloading {} files", n),
        }
    }

    /// Copy download progress into AppState. Returns whether anything changed.
    fn poll_downloads(&mut self) -> bool {
        let updates = self.downloads.update_statuses();
        if updates.is_empty() {
            return false;
        }
        for progress in updates {
            match &progress.status {
                DownloadStatus::Downloaded { path, .. } => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    self.finish_download(Severity::Success, format!("saved {}", name));
                }
                DownloadStatus::Failed(e) => {
                    self.finish_download(Severity::Error, format!("download failed: {}", e));
                }
                DownloadStatus::Downloading { .. } => {}
            }
            self.state.downloads.insert(progress.url, progress.status);
        }
        true
    }

    fn finish_download(&mut self, severity: Severity, message: String) {
        self.active_downloads = self.active_downloads.saturating_sub(1);
        if self.active_downloads == 0 {
            self.toast.resolve_spinner(severity, message);
        } else {
            match severity {
                Severity::Error => self.toast.error(message),
                _ => self.toast.success(message),
            }
        }
    }

    // ── Reader hand-off ───────────────────────────────────────────────────────

    fn open_in_reader(&mut self, song: SongRecord) {
        let direct_url =
            match launcher::open_reader(&song.pdf_url, &self.config.reader.scheme_template) {
                Ok(url) => url,
                Err(e) => {
                    warn!("reader link failed: {:#}", e);
                    self.open_fallback(&resolver::direct_url(&song.pdf_url));
                    return;
                }
            };

        let handoff = Handoff::new(Duration::from_millis(self.config.reader.fallback_ms));
        let seq = self.handoff.arm(&handoff);
        self.state.handoff_pending = true;
        self.toast.info(format!("opening {} in reader…", song.name));

        let Some(tx) = self.tx.clone() else {
            return;
        };
        tokio::spawn(async move {
            let outcome = handoff.run().await;
            let _ = tx
                .send(AppMessage::HandoffSettled {
                    seq,
                    direct_url,
                    outcome,
                })
                .await;
        });
    }

    fn on_focus_lost(&mut self) {
        if let Some(seq) = self.handoff.focus_lost() {
            debug!("focus lost with hand-off #{} pending", seq);
        }
    }

    fn on_handoff_settled(&mut self, seq: u64, direct_url: String, outcome: HandoffOutcome) {
        if !self.handoff.settle(seq) {
            debug!("ignoring superseded hand-off #{}", seq);
            return;
        }
        self.state.handoff_pending = self.handoff.is_pending();
        match outcome {
            HandoffOutcome::Accepted => {
                info!("reader accepted hand-off #{}", seq);
                self.toast.success("opened in reader");
            }
            HandoffOutcome::Fallback => {
                info!("reader did not respond to hand-off #{}", seq);
                self.open_fallback(&direct_url);
            }
        }
    }

    fn open_fallback(&mut self, direct_url: &str) {
        match launcher::open_url(direct_url) {
            Ok(()) => self.toast.info("no reader responded, opened in browser"),
            Err(e) => {
                warn!("fallback open failed: {:#}", e);
                self.toast.error(format!("could not open PDF: {}", e));
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let palette = self.state.palette();
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(palette.bg)), area);

        let keys_h = if self.show_keys_bar { 1 } else { 0 };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(keys_h),
            ])
            .split(area);

        self.pane_areas = PaneAreas {
            header: outer[0],
            song_list: outer[2],
        };

        self.header.draw(frame, outer[0], false, &self.state);
        status_bar::draw_separator(frame, outer[1], palette);
        self.song_list.draw(frame, outer[2], true, &self.state);
        if self.show_keys_bar {
            status_bar::draw_keys_bar(
                frame,
                outer[3],
                self.state.input_mode,
                self.state.handoff_pending,
                palette,
            );
        }

        self.help_overlay.draw(frame, area, false, &self.state);
        self.toast.draw(frame, area, palette);
    }
}

fn spawn_catalog_load(location: Location, tx: mpsc::Sender<AppMessage>) {
    tokio::spawn(async move {
        let loader = CatalogLoader::new();
        let sources = match loader.load_sources(&location).await {
            Ok(sources) => sources,
            Err(e) => {
                error!("catalog configuration from {} failed: {}", location, e);
                let _ = tx
                    .send(AppMessage::Catalog(CatalogEvent::SourcesFailed(format!(
                        "Failed to load songs: {}",
                        e
                    ))))
                    .await;
                return;
            }
        };
        if tx
            .send(AppMessage::Catalog(CatalogEvent::SourcesLoaded(
                sources.clone(),
            )))
            .await
            .is_err()
        {
            return;
        }
        let catalogs = loader.load_all_catalogs(&location, &sources).await;
        let _ = tx
            .send(AppMessage::Catalog(CatalogEvent::CatalogsLoaded(catalogs)))
            .await;
    });
}
