//! Status bar — backend banner and the keybindings footer.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::ComponentId;
use crate::theme::{C_ERROR, C_MODE_ALERT, C_MODE_EDIT, C_MODE_NORMAL, C_MUTED};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    /// A text field has the keyboard.
    Edit,
    /// A modal alert is open.
    Alert,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Edit => "EDIT",
            Self::Alert => "ALERT",
        }
    }

    pub fn color(self) -> ratatui::style::Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Edit => C_MODE_EDIT,
            Self::Alert => C_MODE_ALERT,
        }
    }
}

/// Persistent one-line banner shown while the backend is unreachable.
pub fn draw_backend_banner(frame: &mut Frame, area: Rect, base_url: &str, reason: &str) {
    let line = Line::from(vec![
        Span::styled(
            " backend unavailable ",
            Style::default().fg(C_ERROR).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{}: {}  (ctrl+r to retry)", base_url, reason),
            Style::default().fg(C_MUTED),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the keybindings footer (one row) for the focused pane.
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, focused: Option<ComponentId>) {
    let keys = match mode {
        InputMode::Alert => " Enter/Esc dismiss",
        InputMode::Edit => match focused {
            Some(ComponentId::TagForm) => {
                " type to edit  ↑↓ field  ←→ on suggestions choose  Enter convert  Esc leave form  Tab next pane"
            }
            _ => " paste a video url  Enter look up  Esc leave field  Tab next pane  Ctrl+C quit",
        },
        InputMode::Normal => match focused {
            Some(ComponentId::SongTable) => {
                " ↑↓/jk select  Enter download  y copy url  Ctrl+R refresh  Tab panes  L logs  ? help  q quit"
            }
            _ => " Tab/Shift-Tab panes  Ctrl+R refresh  Ctrl+L logs  F1 help  Ctrl+C quit",
        },
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(mode.color()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
