//! LookupForm component — the video link input.

use ratatui::crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::{layout::Rect, Frame};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::C_PENDING,
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        text_field::{FieldAction, TextField},
    },
};

pub struct LookupForm {
    input: TextField,
}

impl LookupForm {
    pub fn new() -> Self {
        Self {
            input: TextField::new("https://www.youtube.com/watch?v=…"),
        }
    }
}

impl Component for LookupForm {
    fn id(&self) -> ComponentId {
        ComponentId::LookupForm
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match self.input.handle_key(key) {
            FieldAction::Submitted => vec![Action::SubmitLookup(self.input.value().to_string())],
            FieldAction::Cancelled => vec![Action::FocusPane(ComponentId::SongTable)],
            FieldAction::Changed(_) | FieldAction::None => vec![],
        }
    }

    fn is_editing(&self) -> bool {
        true
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = state.lookup_pending.then_some(Badge {
            text: "looking up…",
            color: C_PENDING,
        });
        let block = pane_chrome("video", Some('1'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 {
            return;
        }
        let row = Rect { height: 1, ..inner };
        self.input.draw(frame, row, focused);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::AppState;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};
    use ytag_proto::config::ArtistMode;

    fn state() -> AppState {
        AppState::new(
            "http://localhost:8000/api/v0.0.1".into(),
            ArtistMode::Suggest,
            "/tmp/ytag".into(),
            "/tmp/ytag.log".into(),
        )
    }

    #[test]
    fn test_enter_submits_typed_url() {
        let s = state();
        let mut form = LookupForm::new();
        for c in "https://y.t/watch?v=ab".chars() {
            form.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE), &s);
        }
        let actions = form.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &s);
        assert!(
            matches!(actions.as_slice(), [Action::SubmitLookup(url)] if url == "https://y.t/watch?v=ab")
        );
    }
}
