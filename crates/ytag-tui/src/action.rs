//! Action enum — all user-initiated intents and internal events.

use crate::form::FieldId;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    LookupForm,
    TagForm,
    SongTable,
    LogPanel,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lookup ───────────────────────────────────────────────────────────────
    SubmitLookup(String),

    // ── Tag form ─────────────────────────────────────────────────────────────
    EditField(FieldId, String),
    MoveSuggestion(isize),
    ChooseSuggestion(usize),
    SubmitConversion,

    // ── Songs ────────────────────────────────────────────────────────────────
    DownloadSong(i64),
    Refresh,

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleLogs,
    ToggleHelp,
    ToggleKeys,
    DismissAlert,
    CopyToClipboard(String),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Resize(u16, u16),
    Noop,
}
