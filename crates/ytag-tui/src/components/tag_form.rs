//! TagForm component — editable tags, artist suggestions, the convert
//! control and the job progress area.
//!
//! The field values live in `AppState::form`; this component keeps one
//! `TextField` per field and reloads them whenever the model's revision
//! moves (lookup population, suggestion choice, cover lookup).

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    form::{FieldId, Suggestions, COULD_NOT_GUESS},
    job_tracker::JobPhase,
    theme::{
        style_label, C_ERROR, C_MUTED, C_OK, C_PENDING, C_PRIMARY, C_SELECTION_BG, C_SUGGESTION,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        progress_bar::draw_progress,
        text_field::{FieldAction, TextField},
        toast::SPINNER_FRAMES,
    },
};

const LABEL_W: u16 = 13;

/// Index of the suggestion drawn under `col`, counted from the row start.
/// Mirrors the span layout of `draw_suggestions`.
fn suggestion_at(names: &[String], col: u16) -> Option<usize> {
    let col = usize::from(col);
    let mut x = usize::from(LABEL_W);
    for (i, name) in names.iter().enumerate() {
        let w = name.width() + 2;
        if (x..x + w).contains(&col) {
            return Some(i);
        }
        x += w + 1;
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Field(FieldId),
    Suggestions,
    Submit,
}

pub struct TagFormPane {
    inputs: Vec<(FieldId, TextField)>,
    cursor: usize,
    synced_revision: Option<u64>,
    spinner_frame: usize,
}

impl TagFormPane {
    pub fn new() -> Self {
        Self {
            inputs: FieldId::ALL
                .into_iter()
                .map(|id| (id, TextField::new(id.placeholder())))
                .collect(),
            cursor: 0,
            synced_revision: None,
            spinner_frame: 0,
        }
    }

    fn rows(state: &AppState) -> Vec<Row> {
        let mut rows = Vec::with_capacity(FieldId::ALL.len() + 2);
        for id in FieldId::ALL {
            rows.push(Row::Field(id));
            if id == FieldId::Artists && state.form.suggestions != Suggestions::Hidden {
                rows.push(Row::Suggestions);
            }
        }
        rows.push(Row::Submit);
        rows
    }

    fn current_row(&self, state: &AppState) -> Row {
        let rows = Self::rows(state);
        rows[self.cursor.min(rows.len() - 1)]
    }

    fn input_mut(&mut self, id: FieldId) -> Option<&mut TextField> {
        self.inputs.iter_mut().find(|(f, _)| *f == id).map(|(_, t)| t)
    }

    fn sync(&mut self, state: &AppState) {
        let rev = state.form.revision();
        if self.synced_revision == Some(rev) {
            return;
        }
        for (id, input) in self.inputs.iter_mut() {
            input.set_value(state.form.value(*id));
        }
        self.synced_revision = Some(rev);
        self.cursor = self.cursor.min(Self::rows(state).len() - 1);
    }

    fn move_cursor(&mut self, delta: isize, state: &AppState) {
        let len = Self::rows(state).len() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len - 1) as usize;
    }

    fn draw_suggestions(&self, frame: &mut Frame, area: Rect, active: bool, state: &AppState) {
        let mut spans = vec![Span::styled(
            format!("{:<w$}", "  suggestions", w = LABEL_W as usize),
            style_label(active),
        )];
        match &state.form.suggestions {
            Suggestions::Hidden => {}
            Suggestions::CouldNotGuess => {
                spans.push(Span::styled(COULD_NOT_GUESS, Style::default().fg(C_MUTED)));
            }
            Suggestions::Names(names) => {
                for (i, name) in names.iter().enumerate() {
                    let highlighted = active && i == state.form.suggestion_cursor;
                    let chosen = name == state.form.value(FieldId::Artists);
                    let mut style = Style::default().fg(if chosen { C_PRIMARY } else { C_SUGGESTION });
                    if highlighted {
                        style = style.bg(C_SELECTION_BG).add_modifier(Modifier::BOLD);
                    }
                    spans.push(Span::styled(format!(" {} ", name), style));
                    spans.push(Span::raw(" "));
                }
            }
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_submit(&self, frame: &mut Frame, area: Rect, active: bool, state: &AppState) {
        let enabled = state.submit_enabled();
        let mut style = Style::default().fg(if enabled { C_OK } else { C_MUTED });
        if active {
            style = style.bg(C_SELECTION_BG).add_modifier(Modifier::BOLD);
        }
        let hint = if enabled { "" } else { "  a conversion is in progress" };
        let line = Line::from(vec![
            Span::raw(" ".repeat(LABEL_W as usize)),
            Span::styled(" convert ", style),
            Span::styled(hint, Style::default().fg(C_MUTED)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_progress_area(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let tracker = &state.tracker;
        let phase = tracker.phase();
        if area.height == 0 || phase == JobPhase::Idle {
            return;
        }
        if tracker.is_active() {
            let spinner = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
            let label = format!("  {} {}", spinner, phase.label().unwrap_or(""));
            draw_progress(
                frame,
                area,
                &label,
                tracker.ratio(),
                tracker.progress_text().as_deref(),
            );
            return;
        }
        let (text, color) = match phase {
            JobPhase::Done => ("  last job: done".to_string(), C_OK),
            JobPhase::Error => ("  last job: failed".to_string(), C_ERROR),
            _ => (
                format!(
                    "  last job: status channel closed while {}",
                    phase.label().unwrap_or("idle").to_lowercase()
                ),
                C_PENDING,
            ),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(color))),
            area,
        );
    }
}

impl Component for TagFormPane {
    fn id(&self) -> ComponentId {
        ComponentId::TagForm
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        self.sync(state);

        match key.code {
            KeyCode::Up => {
                self.move_cursor(-1, state);
                return vec![];
            }
            KeyCode::Down => {
                self.move_cursor(1, state);
                return vec![];
            }
            _ => {}
        }

        match self.current_row(state) {
            Row::Field(id) => {
                let Some(input) = self.input_mut(id) else {
                    return vec![];
                };
                match input.handle_key(key) {
                    FieldAction::Changed(value) => vec![Action::EditField(id, value)],
                    FieldAction::Submitted => vec![Action::SubmitConversion],
                    FieldAction::Cancelled => vec![Action::FocusPane(ComponentId::SongTable)],
                    FieldAction::None => vec![],
                }
            }
            Row::Suggestions => match key.code {
                KeyCode::Left => vec![Action::MoveSuggestion(-1)],
                KeyCode::Right => vec![Action::MoveSuggestion(1)],
                KeyCode::Enter | KeyCode::Char(' ') => {
                    vec![Action::ChooseSuggestion(state.form.suggestion_cursor)]
                }
                KeyCode::Esc => vec![Action::FocusPane(ComponentId::SongTable)],
                _ => vec![],
            },
            Row::Submit => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => vec![Action::SubmitConversion],
                KeyCode::Esc => vec![Action::FocusPane(ComponentId::SongTable)],
                _ => vec![],
            },
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => self.move_cursor(-1, state),
            MouseEventKind::ScrollDown => self.move_cursor(1, state),
            MouseEventKind::Down(_) => {
                let Some(row) = event.row.checked_sub(area.y + 1) else {
                    return vec![];
                };
                let row = usize::from(row);
                let Some(&clicked) = Self::rows(state).get(row) else {
                    return vec![];
                };
                self.cursor = row;
                if let (Row::Suggestions, Suggestions::Names(names)) =
                    (clicked, &state.form.suggestions)
                {
                    let col = event.column.saturating_sub(area.x + 1);
                    if let Some(idx) = suggestion_at(names, col) {
                        return vec![Action::ChooseSuggestion(idx)];
                    }
                }
            }
            _ => {}
        }
        vec![]
    }

    fn tick(&mut self, state: &AppState) -> Vec<Action> {
        if state.tracker.is_active() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
        vec![]
    }

    fn is_editing(&self) -> bool {
        true
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        self.sync(state);

        let badge = if state.session.is_busy() {
            Some(Badge {
                text: "BUSY",
                color: C_PENDING,
            })
        } else {
            None
        };
        let block = pane_chrome("tags", Some('2'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Self::rows(state);
        let cursor = self.cursor.min(rows.len() - 1);
        let mut y = inner.y;
        let bottom = inner.y + inner.height;

        for (i, row) in rows.iter().enumerate() {
            if y >= bottom {
                break;
            }
            let line = Rect {
                y,
                height: 1,
                ..inner
            };
            let active = focused && i == cursor;
            match row {
                Row::Field(id) => {
                    let mut label = format!("  {}", id.label());
                    if id.is_required() {
                        label.push('*');
                    }
                    frame.render_widget(
                        Paragraph::new(Span::styled(
                            format!("{:<w$}", label, w = LABEL_W as usize),
                            style_label(active),
                        )),
                        Rect {
                            width: LABEL_W.min(line.width),
                            ..line
                        },
                    );
                    let input_area = Rect {
                        x: line.x + LABEL_W,
                        width: line.width.saturating_sub(LABEL_W + 1),
                        ..line
                    };
                    if let Some((_, input)) = self.inputs.iter().find(|(f, _)| f == id) {
                        input.draw(frame, input_area, active);
                    }
                }
                Row::Suggestions => self.draw_suggestions(frame, line, active, state),
                Row::Submit => self.draw_submit(frame, line, active, state),
            }
            y += 1;
        }

        if y + 1 < bottom {
            let progress = Rect {
                y: y + 1,
                height: 1,
                ..inner
            };
            self.draw_progress_area(frame, progress, state);
        }
    }
}
