//! TextField — single-line text input wrapping tui-input.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};
use unicode_width::UnicodeWidthChar;

use crate::theme::{C_INPUT_BG, C_INPUT_FG, C_MUTED, C_PRIMARY};

pub enum FieldAction {
    Changed(String),
    Submitted,
    Cancelled,
    None,
}

pub struct TextField {
    input: Input,
    placeholder: String,
}

impl TextField {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            placeholder: placeholder.into(),
        }
    }

    pub fn set_value(&mut self, value: &str) {
        self.input = Input::new(value.to_string());
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    /// Enter submits, Esc cancels; everything else edits the text.
    pub fn handle_key(&mut self, key: KeyEvent) -> FieldAction {
        match key.code {
            KeyCode::Enter => FieldAction::Submitted,
            KeyCode::Esc => FieldAction::Cancelled,
            _ => {
                let changed = self
                    .input
                    .handle_event(&Event::Key(key))
                    .map_or(false, |resp| resp.value);
                if changed {
                    FieldAction::Changed(self.input.value().to_string())
                } else {
                    FieldAction::None
                }
            }
        }
    }

    /// Render into a one-row `area`.  The cursor is placed only when `active`.
    pub fn draw(&self, frame: &mut Frame, area: Rect, active: bool) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let width = area.width.saturating_sub(1) as usize;
        let scroll = self.input.visual_scroll(width);
        let value = self.input.value();

        let span = if value.is_empty() {
            Span::styled(self.placeholder.as_str(), Style::default().fg(C_MUTED))
        } else {
            let fg = if active { C_INPUT_FG } else { C_PRIMARY };
            Span::styled(skip_columns(value, scroll), Style::default().fg(fg))
        };

        let bg = if active { C_INPUT_BG } else { crate::theme::C_BG };
        frame.render_widget(
            Paragraph::new(Line::from(span)).style(Style::default().bg(bg)),
            area,
        );

        if active {
            let offset = self.input.visual_cursor().saturating_sub(scroll) as u16;
            let x = (area.x + offset).min(area.x + area.width.saturating_sub(1));
            frame.set_cursor_position((x, area.y));
        }
    }
}

/// The suffix of `s` starting at display column `cols`.
fn skip_columns(s: &str, cols: usize) -> &str {
    let mut seen = 0;
    for (idx, ch) in s.char_indices() {
        if seen >= cols {
            return &s[idx..];
        }
        seen += ch.width().unwrap_or(0);
    }
    ""
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_reports_changes() {
        let mut f = TextField::new("url");
        assert!(matches!(f.handle_key(key(KeyCode::Char('a'))), FieldAction::Changed(v) if v == "a"));
        assert!(matches!(f.handle_key(key(KeyCode::Char('b'))), FieldAction::Changed(v) if v == "ab"));
        assert!(matches!(f.handle_key(key(KeyCode::Backspace)), FieldAction::Changed(v) if v == "a"));
        assert!(matches!(f.handle_key(key(KeyCode::Enter)), FieldAction::Submitted));
        assert!(matches!(f.handle_key(key(KeyCode::Esc)), FieldAction::Cancelled));
        assert_eq!(f.value(), "a");
    }

    #[test]
    fn test_skip_columns_respects_wide_chars() {
        assert_eq!(skip_columns("abc", 1), "bc");
        assert_eq!(skip_columns("星街すいせい", 4), "すいせい");
        assert_eq!(skip_columns("ab", 5), "");
    }
}
