//! AppState — shared read-only data passed to all components during render/event.
//!
//! The App event loop is the only thing that writes to AppState.

use std::path::PathBuf;

use ytag_proto::config::ArtistMode;

use crate::form::TagForm;
use crate::job_tracker::JobTracker;
use crate::session::ClientSession;
use crate::song_table::SongTable;
use crate::widgets::status_bar::InputMode;

/// Result of the last liveness probe.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackendStatus {
    #[default]
    Unknown,
    Up,
    Down(String),
}

pub struct AppState {
    // ── Backend ────────────────────────────────────────────────────────────
    pub base_url: String,
    pub backend: BackendStatus,

    // ── Session / forms ─────────────────────────────────────────────────────
    pub session: ClientSession,
    pub form: TagForm,
    pub tracker: JobTracker,
    pub artist_mode: ArtistMode,
    /// A metadata lookup is in flight.
    pub lookup_pending: bool,
    /// Modal alert text; blocks input until dismissed.
    pub alert: Option<String>,

    // ── Songs ───────────────────────────────────────────────────────────────
    pub songs: SongTable,
    pub songs_loading: bool,
    pub last_download: Option<PathBuf>,

    // ── UI ──────────────────────────────────────────────────────────────────
    pub input_mode: InputMode,
    /// Cached tail of the log file (refreshed periodically by App).
    pub tui_log_lines: Vec<String>,

    // ── Paths ───────────────────────────────────────────────────────────────
    pub downloads_dir: PathBuf,
    pub log_path: PathBuf,
}

impl AppState {
    pub fn new(
        base_url: String,
        artist_mode: ArtistMode,
        downloads_dir: PathBuf,
        log_path: PathBuf,
    ) -> Self {
        Self {
            base_url,
            backend: BackendStatus::Unknown,
            session: ClientSession::new(),
            form: TagForm::new(),
            tracker: JobTracker::new(),
            artist_mode,
            lookup_pending: false,
            alert: None,
            songs: SongTable::new(),
            songs_loading: false,
            last_download: None,
            input_mode: InputMode::Normal,
            tui_log_lines: Vec::new(),
            downloads_dir,
            log_path,
        }
    }

    /// The convert submit control is enabled whenever no job is in flight.
    pub fn submit_enabled(&self) -> bool {
        !self.session.is_busy()
    }
}
