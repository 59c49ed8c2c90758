//! Header component — one-row top bar: app name, backend, job summary.
//!
//! Not focusable.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::{AppState, BackendStatus},
    component::Component,
    job_tracker::JobPhase,
    theme::{C_ACCENT, C_ERROR, C_MUTED, C_OK, C_PENDING, C_SECONDARY},
};

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }
}

impl Component for Header {
    fn id(&self) -> ComponentId {
        // never in the focus ring
        ComponentId::LookupForm
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        frame.render_widget(Clear, area);

        let (dot, dot_color) = match state.backend {
            BackendStatus::Unknown => ("○", C_PENDING),
            BackendStatus::Up => ("●", C_OK),
            BackendStatus::Down(_) => ("●", C_ERROR),
        };

        let mut spans = vec![
            Span::styled(
                " ytag ",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(dot, Style::default().fg(dot_color)),
            Span::raw(" "),
            Span::styled(state.base_url.as_str(), Style::default().fg(C_SECONDARY)),
        ];

        let phase = state.tracker.phase();
        if phase != JobPhase::Idle {
            let label = phase.label().unwrap_or("");
            let color = match phase {
                JobPhase::Done => C_OK,
                JobPhase::Error => C_ERROR,
                _ if state.tracker.is_interrupted() => C_MUTED,
                _ => C_PENDING,
            };
            let job = match state.tracker.job() {
                Some(h) => format!("  │  job {} ", h.as_str()),
                None => "  │  ".to_string(),
            };
            spans.push(Span::styled(job, Style::default().fg(C_MUTED)));
            spans.push(Span::styled(label, Style::default().fg(color)));
            if let Some(p) = state.tracker.progress_text() {
                spans.push(Span::styled(format!(" {}", p), Style::default().fg(color)));
            }
        }

        if state.session.is_busy() {
            spans.push(Span::styled(
                "  BUSY",
                Style::default().fg(C_PENDING).add_modifier(Modifier::BOLD),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
