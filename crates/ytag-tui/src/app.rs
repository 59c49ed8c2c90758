//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage`s in from terminal input and
//!   from the tasks that talk to the backend.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use ytag_proto::client::{ApiClient, ApiError};
use ytag_proto::config::Config;
use ytag_proto::protocol::{ArtistRef, JobHandle, MetadataCandidate, SongRecord};
use ytag_proto::status::{self, StatusEvent};

use crate::{
    action::{Action, ComponentId},
    app_state::{AppState, BackendStatus},
    component::Component,
    components::{
        header::Header, help_overlay::HelpOverlay, log_panel::LogPanel, lookup_form::LookupForm,
        song_table::SongTablePane, tag_form::TagFormPane,
    },
    controller::{self, SubmitError},
    focus::FocusRing,
    form::FieldId,
    job_tracker::Transition,
    session::PopulationTicket,
    widgets::{
        alert::draw_alert,
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
};

const LOG_TAIL_LINES: usize = 500;

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    Probe(Result<(), ApiError>),
    Metadata(Result<MetadataCandidate, ApiError>),
    /// Result of the artist search started by population `ticket`.
    CoverFound {
        ticket: PopulationTicket,
        result: Result<Option<ArtistRef>, ApiError>,
    },
    Songs(Result<Vec<SongRecord>, ApiError>),
    ConversionAccepted(Result<JobHandle, ApiError>),
    /// One event of the status channel of a job.
    Job(JobHandle, StatusEvent),
    Downloaded(Result<PathBuf, ApiError>),
}

#[derive(Debug, Clone, Default)]
struct PaneAreas {
    lookup: Rect,
    tag_form: Rect,
    song_table: Rect,
    log_panel: Rect,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    client: ApiClient,
    default_tagger: Option<String>,
    cover_lookup: bool,

    state: AppState,

    // ── Components ────────────────────────────────────────────────────────────
    header: Header,
    lookup: LookupForm,
    tag_form: TagFormPane,
    song_table: SongTablePane,
    log_panel: LogPanel,
    help_overlay: HelpOverlay,
    toast: ToastManager,

    focus: FocusRing,
    pane_areas: PaneAreas,
    show_keys_bar: bool,
    should_quit: bool,

    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,
}

impl App {
    pub fn new(client: ApiClient, config: &Config, log_path: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel::<AppMessage>(1024);
        let state = AppState::new(
            client.base_url().to_string(),
            config.ui.artist_mode,
            config.paths.downloads_dir.clone(),
            log_path,
        );
        Self {
            default_tagger: config.default_tagger().map(str::to_string),
            cover_lookup: config.ui.cover_lookup,
            client,
            state,
            header: Header::new(),
            lookup: LookupForm::new(),
            tag_form: TagFormPane::new(),
            song_table: SongTablePane::new(),
            log_panel: LogPanel::new(),
            help_overlay: HelpOverlay::new(),
            toast: ToastManager::new(),
            focus: FocusRing::new(vec![
                ComponentId::LookupForm,
                ComponentId::TagForm,
                ComponentId::SongTable,
            ]),
            pane_areas: PaneAreas::default(),
            show_keys_bar: true,
            should_quit: false,
            tx,
            rx: Some(rx),
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let Some(rx) = self.rx.take() else {
            anyhow::bail!("event loop already started");
        };

        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal, rx).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        mut rx: mpsc::Receiver<AppMessage>,
    ) -> anyhow::Result<()> {
        info!("ytag started against {}", self.client.base_url());

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = self.tx.clone();
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

        // Startup: availability probe, then the song table.
        self.spawn_probe();
        self.spawn_song_refresh();
        self.reload_tui_log();
        self.sync_input_mode();

        // ── Periodic timers ───────────────────────────────────────────────────
        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut log_refresh = tokio::time::interval(Duration::from_secs(2));
        log_refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
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
                    // messages are handled strictly in arrival order
                    while let Ok(next) = rx.try_recv() {
                        needs_redraw |= self.handle_message(next).await;
                        if self.should_quit {
                            break;
                        }
                    }
                }

                _ = ui_tick.tick() => {
                    let tick_actions: Vec<Action> = {
                        let s = &self.state;
                        let mut all = Vec::new();
                        all.extend(self.lookup.tick(s));
                        all.extend(self.tag_form.tick(s));
                        all.extend(self.song_table.tick(s));
                        all.extend(self.log_panel.tick(s));
                        all
                    };
                    for action in tick_actions {
                        self.dispatch(action).await;
                    }
                    needs_redraw = self.state.tracker.is_active() || needs_redraw;
                }

                _ = toast_tick.tick() => {
                    if !self.toast.is_empty() {
                        self.toast.tick();
                        needs_redraw = true;
                    }
                }

                _ = log_refresh.tick() => {
                    self.reload_tui_log();
                    needs_redraw = true;
                }
            }
        }

        info!("ytag exiting");
        Ok(())
    }

    // ── Message handling ──────────────────────────────────────────────────────

    /// Returns true when the frame must be redrawn.
    async fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    return false;
                }
                let actions = self.handle_key(key);
                for action in actions {
                    self.dispatch(action).await;
                }
                self.sync_input_mode();
            }
            AppMessage::Event(Event::Mouse(mouse)) => {
                let actions = self.handle_mouse(mouse);
                for action in actions {
                    self.dispatch(action).await;
                }
                self.sync_input_mode();
            }
            AppMessage::Event(Event::Resize(w, h)) => {
                self.dispatch(Action::Resize(w, h)).await;
            }
            AppMessage::Event(_) => return false,

            AppMessage::Probe(result) => match result {
                Ok(()) => {
                    if self.state.backend != BackendStatus::Up {
                        info!("backend up at {}", self.client.base_url());
                    }
                    self.state.backend = BackendStatus::Up;
                }
                Err(e) => {
                    warn!("backend probe failed: {}", e);
                    self.state.backend = BackendStatus::Down(e.to_string());
                }
            },

            AppMessage::Metadata(result) => {
                self.state.lookup_pending = false;
                self.toast.dismiss_spinner();
                match result {
                    Ok(meta) => self.on_metadata(meta),
                    Err(e) => {
                        warn!("metadata lookup failed: {}", e);
                        self.toast.error(format!("lookup failed: {}", e));
                    }
                }
            }

            AppMessage::CoverFound { ticket, result } => match result {
                Ok(Some(artist)) => {
                    let url = self.client.cover_url(artist.id);
                    if self.state.form.apply_cover(ticket, url, &self.state.session) {
                        debug!("cover set from artist {} ({})", artist.name, artist.id);
                    } else {
                        debug!("stale cover lookup for {} dropped", artist.name);
                    }
                }
                Ok(None) => debug!("cover lookup: artist not in catalog"),
                Err(e) => warn!("cover lookup failed: {}", e),
            },

            AppMessage::Songs(result) => {
                self.state.songs_loading = false;
                match result {
                    Ok(records) => {
                        let client = &self.client;
                        self.state
                            .songs
                            .rebuild(&records, |id| client.download_url(id));
                        debug!("song table rebuilt: {} rows", self.state.songs.len());
                    }
                    Err(e) => {
                        warn!("song refresh failed: {}", e);
                        self.toast.error(format!("could not load songs: {}", e));
                    }
                }
            }

            AppMessage::ConversionAccepted(result) => match result {
                Ok(handle) => {
                    info!("conversion accepted as job {}", handle);
                    self.state.tracker.attach(handle.clone());
                    let url = self.client.status_ws_url(&handle);
                    status::spawn_listener(url, self.tx.clone(), move |ev| {
                        AppMessage::Job(handle.clone(), ev)
                    });
                }
                Err(e) => {
                    warn!("conversion submit failed: {}", e);
                    controller::conversion_failed(
                        &mut self.state.session,
                        &mut self.state.tracker,
                    );
                    self.toast.error(format!("convert failed: {}", e));
                }
            },

            AppMessage::Job(handle, event) => {
                let transition = controller::handle_job_event(
                    &mut self.state.session,
                    &mut self.state.tracker,
                    &handle,
                    &event,
                );
                match transition {
                    Transition::Done => {
                        self.toast.success("conversion done");
                        self.spawn_song_refresh();
                    }
                    Transition::Failed => {
                        self.toast.error("conversion failed on the server");
                    }
                    Transition::Interrupted => {
                        self.toast
                            .warning("lost the job status channel; the song list was not refreshed");
                    }
                    Transition::Updated | Transition::Closed | Transition::Ignored => {}
                }
            }

            AppMessage::Downloaded(result) => match result {
                Ok(path) => {
                    self.toast.success(format!("saved {}", path.display()));
                    self.state.last_download = Some(path);
                }
                Err(e) => {
                    warn!("download failed: {}", e);
                    self.toast.error(format!("download failed: {}", e));
                }
            },
        }
        true
    }

    fn on_metadata(&mut self, meta: MetadataCandidate) {
        info!(
            "metadata for {}: {:?} ({} artist candidates)",
            meta.video_id,
            meta.title,
            meta.artists.len()
        );
        self.focus.set(ComponentId::TagForm);
        self.sync_input_mode();
        let AppState {
            form,
            session,
            artist_mode,
            ..
        } = &mut self.state;
        let population = form.populate(&meta, *artist_mode, session);

        if !self.cover_lookup {
            return;
        }
        if let Some(artist) = population.cover_query {
            let client = self.client.clone();
            let tx = self.tx.clone();
            let ticket = population.ticket;
            tokio::spawn(async move {
                let result = client.search_artist(&artist).await;
                let _ = tx.send(AppMessage::CoverFound { ticket, result }).await;
            });
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        // Global keys — always active regardless of focus/mode
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        // The alert is modal.
        if self.state.alert.is_some() {
            return match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => vec![Action::DismissAlert],
                _ => vec![],
            };
        }

        // Help overlay captures all keys when visible
        if self.help_overlay.visible {
            let actions = self.help_overlay.handle_key(key, &self.state);
            if !actions.is_empty() {
                return actions;
            }
            return vec![Action::ToggleHelp];
        }

        match key.code {
            KeyCode::F(1) => return vec![Action::ToggleHelp],
            KeyCode::Char('r') if key.modifiers == KeyModifiers::CONTROL => {
                return vec![Action::Refresh];
            }
            KeyCode::Char('l') if key.modifiers == KeyModifiers::CONTROL => {
                return vec![Action::ToggleLogs];
            }
            KeyCode::Tab => return vec![Action::FocusNext],
            KeyCode::BackTab => return vec![Action::FocusPrev],
            _ => {}
        }

        // Single-letter globals only when no text field has the keyboard.
        if self.state.input_mode == InputMode::Normal {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return vec![Action::Quit],
                KeyCode::Char('?') => return vec![Action::ToggleHelp],
                KeyCode::Char('L') => return vec![Action::ToggleLogs],
                KeyCode::Char('K') => return vec![Action::ToggleKeys],
                KeyCode::Char('1') => return vec![Action::FocusPane(ComponentId::LookupForm)],
                KeyCode::Char('2') => return vec![Action::FocusPane(ComponentId::TagForm)],
                KeyCode::Char('3') => return vec![Action::FocusPane(ComponentId::SongTable)],
                _ => {}
            }
        }

        let s = &self.state;
        match self.focus.current() {
            Some(ComponentId::LookupForm) => self.lookup.handle_key(key, s),
            Some(ComponentId::TagForm) => self.tag_form.handle_key(key, s),
            Some(ComponentId::SongTable) => self.song_table.handle_key(key, s),
            Some(ComponentId::LogPanel) => self.log_panel.handle_key(key, s),
            Some(ComponentId::HelpOverlay) | None => vec![],
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        if self.state.alert.is_some() || self.help_overlay.visible {
            return vec![];
        }
        let is_click = matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        if !is_click {
            return vec![];
        }

        let col = event.column;
        let row = event.row;

        fn hit(r: Rect, col: u16, row: u16) -> bool {
            r.width > 0
                && r.height > 0
                && col >= r.x
                && col < r.x + r.width
                && row >= r.y
                && row < r.y + r.height
        }

        let areas = self.pane_areas.clone();
        let s = &self.state;
        let focused = self.focus.current();

        macro_rules! click_pane {
            ($id:expr, $component:expr, $area:expr) => {{
                let mut actions = $component.handle_mouse(event, $area, s);
                if focused != Some($id) && matches!(event.kind, MouseEventKind::Down(_)) {
                    actions.insert(0, Action::FocusPane($id));
                }
                return actions;
            }};
        }

        if hit(areas.lookup, col, row) {
            click_pane!(ComponentId::LookupForm, self.lookup, areas.lookup);
        }
        if hit(areas.tag_form, col, row) {
            click_pane!(ComponentId::TagForm, self.tag_form, areas.tag_form);
        }
        if hit(areas.song_table, col, row) {
            click_pane!(ComponentId::SongTable, self.song_table, areas.song_table);
        }
        if hit(areas.log_panel, col, row) && self.log_panel.expanded {
            click_pane!(ComponentId::LogPanel, self.log_panel, areas.log_panel);
        }
        vec![]
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.lookup.on_action(&action, s));
            out.extend(self.tag_form.on_action(&action, s));
            out.extend(self.song_table.on_action(&action, s));
            out.extend(self.log_panel.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action).await;

        // depth-limited to one level
        for a in secondary {
            self.apply_action(a).await;
        }
    }

    async fn apply_action(&mut self, action: Action) {
        match &action {
            Action::EditField(..) | Action::Noop | Action::Resize(..) => {}
            _ => debug!("apply_action: {:?}", action),
        }
        match action {
            // ── Lookup ────────────────────────────────────────────────────────
            Action::SubmitLookup(input) => {
                match controller::submit_lookup(&self.state.session, &input) {
                    Ok(None) => {}
                    Ok(Some(video_id)) => self.spawn_lookup(video_id),
                    Err(SubmitError::Busy) => {
                        self.toast.info("a conversion is in progress");
                    }
                    Err(e) => {
                        info!("lookup rejected: {:?}", e);
                        self.state.alert = Some(e.to_string());
                    }
                }
            }

            // ── Tag form ──────────────────────────────────────────────────────
            Action::EditField(id, value) => self.state.form.edit(id, value),
            Action::MoveSuggestion(delta) => self.state.form.move_suggestion(delta),
            Action::ChooseSuggestion(idx) => {
                if self.state.form.choose_suggestion(idx) {
                    debug!("artist set to {:?}", self.state.form.value(FieldId::Artists));
                }
            }
            Action::SubmitConversion => {
                match controller::submit_conversion(
                    &mut self.state.session,
                    &mut self.state.tracker,
                    &self.state.form,
                    self.default_tagger.as_deref(),
                ) {
                    Ok(req) => {
                        let client = self.client.clone();
                        let tx = self.tx.clone();
                        tokio::spawn(async move {
                            let result = client.submit_conversion(&req).await;
                            let _ = tx.send(AppMessage::ConversionAccepted(result)).await;
                        });
                    }
                    Err(SubmitError::Busy) => {
                        self.toast.info("a conversion is in progress");
                    }
                    Err(e) => {
                        info!("convert rejected: {}", e);
                        self.state.alert = Some(e.to_string());
                    }
                }
            }

            // ── Songs ─────────────────────────────────────────────────────────
            Action::DownloadSong(song_id) => {
                let Some(row) = self.state.songs.row_by_id(song_id) else {
                    warn!("download requested for unknown song {}", song_id);
                    return;
                };
                let url = row.download_url.clone();
                let fallback = row.fallback_file_name();
                let dir = self.state.downloads_dir.clone();
                let client = self.client.clone();
                let tx = self.tx.clone();
                self.toast.info(format!("downloading {}", fallback));
                tokio::spawn(async move {
                    let result = client.download_file(&url, &dir, &fallback).await;
                    let _ = tx.send(AppMessage::Downloaded(result)).await;
                });
            }
            Action::Refresh => {
                self.spawn_probe();
                self.spawn_song_refresh();
            }

            // ── Navigation ────────────────────────────────────────────────────
            Action::FocusNext => {
                self.focus.next();
            }
            Action::FocusPrev => {
                self.focus.prev();
            }
            Action::FocusPane(id) => self.focus.set(id),

            // ── UI toggles ────────────────────────────────────────────────────
            Action::ToggleLogs => {
                // LogPanel already flipped itself in on_action
                if self.log_panel.expanded {
                    self.reload_tui_log();
                    self.focus.insert(ComponentId::LogPanel);
                } else {
                    self.focus.remove(ComponentId::LogPanel);
                }
            }
            Action::ToggleHelp => {}
            Action::ToggleKeys => self.show_keys_bar = !self.show_keys_bar,
            Action::DismissAlert => self.state.alert = None,
            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        let display = if text.chars().count() > 40 {
                            format!("{}…", text.chars().take(40).collect::<String>())
                        } else {
                            text.clone()
                        };
                        self.toast.success(format!("copied: {}", display));
                    }
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.toast.error(format!("clipboard error: {}", e));
                    }
                }
            }

            // ── System ────────────────────────────────────────────────────────
            Action::Quit => self.should_quit = true,
            Action::Resize(..) | Action::Noop => {}
        }
    }

    // ── Background work ───────────────────────────────────────────────────────

    fn spawn_probe(&self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.probe().await;
            let _ = tx.send(AppMessage::Probe(result)).await;
        });
    }

    fn spawn_song_refresh(&mut self) {
        self.state.songs_loading = true;
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.list_songs().await;
            let _ = tx.send(AppMessage::Songs(result)).await;
        });
    }

    fn spawn_lookup(&mut self, video_id: String) {
        info!("looking up video {}", video_id);
        self.state.lookup_pending = true;
        self.toast.spinner(format!("looking up {}", video_id));
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_metadata(&video_id).await;
            let _ = tx.send(AppMessage::Metadata(result)).await;
        });
    }

    /// Read the tail of the log file into `state.tui_log_lines`.
    fn reload_tui_log(&mut self) {
        if let Ok(content) = std::fs::read_to_string(&self.state.log_path) {
            let lines: Vec<&str> = content.lines().collect();
            let start = lines.len().saturating_sub(LOG_TAIL_LINES);
            self.state.tui_log_lines = lines[start..].iter().map(|l| l.to_string()).collect();
        }
    }

    fn sync_input_mode(&mut self) {
        self.state.input_mode = if self.state.alert.is_some() {
            InputMode::Alert
        } else {
            let editing = match self.focus.current() {
                Some(ComponentId::LookupForm) => self.lookup.is_editing(),
                Some(ComponentId::TagForm) => self.tag_form.is_editing(),
                Some(ComponentId::SongTable) => self.song_table.is_editing(),
                Some(ComponentId::LogPanel) => self.log_panel.is_editing(),
                Some(ComponentId::HelpOverlay) | None => false,
            };
            if editing {
                InputMode::Edit
            } else {
                InputMode::Normal
            }
        };
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        use crate::theme::C_BG;
        use ratatui::widgets::Block;
        let area = frame.area();

        frame.render_widget(
            Block::default().style(ratatui::style::Style::default().bg(C_BG)),
            area,
        );

        // ── Outer layout: header | (banner) | lookup | body | log | (keys) ────
        let banner_h = matches!(self.state.backend, BackendStatus::Down(_)) as u16;
        let log_h = if self.log_panel.expanded { 10u16 } else { 1 };
        let keys_h = self.show_keys_bar as u16;

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(banner_h),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(log_h),
                Constraint::Length(keys_h),
            ])
            .split(area);

        let focused = self.focus.current();

        self.header.draw(frame, outer[0], false, &self.state);

        if let BackendStatus::Down(reason) = &self.state.backend {
            status_bar::draw_backend_banner(frame, outer[1], &self.state.base_url, reason);
        }

        self.lookup.draw(
            frame,
            outer[2],
            focused == Some(ComponentId::LookupForm),
            &self.state,
        );
        self.pane_areas.lookup = outer[2];

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(outer[3]);
        self.tag_form.draw(
            frame,
            body[0],
            focused == Some(ComponentId::TagForm),
            &self.state,
        );
        self.song_table.draw(
            frame,
            body[1],
            focused == Some(ComponentId::SongTable),
            &self.state,
        );
        self.pane_areas.tag_form = body[0];
        self.pane_areas.song_table = body[1];

        self.log_panel.draw(
            frame,
            outer[4],
            focused == Some(ComponentId::LogPanel),
            &self.state,
        );
        self.pane_areas.log_panel = outer[4];

        if self.show_keys_bar {
            status_bar::draw_keys_bar(frame, outer[5], self.state.input_mode, focused);
        }

        // ── Overlays ──────────────────────────────────────────────────────────
        if let Some(message) = &self.state.alert {
            draw_alert(frame, area, message);
        }
        self.help_overlay.draw(frame, area, false, &self.state);

        // ── Toast notifications (topmost layer) ──────────────────────────────
        self.toast.draw(frame, area);
    }
}
