//! LogPanel component — tail of the ytag log file.
//!
//! Collapsed it shows the newest entry on one line; expanded it scrolls.
//! `scroll == usize::MAX` pins the view to the bottom.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Borders, Clear, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_ERROR, C_MUTED, C_PENDING, C_SECONDARY, C_TOAST_INFO},
    widgets::pane_chrome::pane_chrome_borders,
};

pub struct LogPanel {
    pub expanded: bool,
    pub scroll: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            expanded: false,
            scroll: usize::MAX,
        }
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
        if self.expanded {
            self.scroll = usize::MAX;
        }
    }

    fn scroll_up(&mut self, n: usize, total: usize, height: usize) {
        let max = total.saturating_sub(height);
        self.scroll = self.scroll.min(max).saturating_sub(n);
    }

    fn scroll_down(&mut self, n: usize, total: usize, height: usize) {
        let max = total.saturating_sub(height);
        let next = self.scroll.min(max).saturating_add(n);
        self.scroll = if next >= max { usize::MAX } else { next };
    }
}

impl Component for LogPanel {
    fn id(&self) -> ComponentId {
        ComponentId::LogPanel
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.expanded {
            return vec![];
        }
        let total = state.tui_log_lines.len();
        // the exact body height is only known at draw time
        let h = 8;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(1, total, h),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(1, total, h),
            KeyCode::PageUp => self.scroll_up(10, total, h),
            KeyCode::PageDown => self.scroll_down(10, total, h),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            KeyCode::End | KeyCode::Char('G') => self.scroll = usize::MAX,
            KeyCode::Char('y') => {
                return vec![Action::CopyToClipboard(
                    state.log_path.display().to_string(),
                )];
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        if !self.expanded {
            return vec![];
        }
        let total = state.tui_log_lines.len();
        let h = area.height.saturating_sub(2) as usize;
        match event.kind {
            MouseEventKind::ScrollUp => self.scroll_up(3, total, h),
            MouseEventKind::ScrollDown => self.scroll_down(3, total, h),
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if matches!(action, Action::ToggleLogs) {
            self.toggle();
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        if area.height == 0 {
            return;
        }
        frame.render_widget(Clear, area);

        if !self.expanded || area.height <= 2 {
            let line = match state.tui_log_lines.last() {
                Some(raw) => {
                    let entry = LogEntry::parse(raw);
                    let mut spans = vec![Span::styled(" log ", Style::default().fg(C_MUTED))];
                    spans.extend(entry.spans());
                    Line::from(spans)
                }
                None => Line::from(Span::styled(" log (empty)", Style::default().fg(C_MUTED))),
            };
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        let block = pane_chrome_borders("log", None, focused, None, Borders::TOP);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let logs = &state.tui_log_lines;
        if logs.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("  nothing logged yet ({})", state.log_path.display()),
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }

        let height = inner.height as usize;
        let first = self.scroll.min(logs.len().saturating_sub(height));
        let lines: Vec<Line> = logs
            .iter()
            .skip(first)
            .take(height)
            .map(|raw| {
                let mut spans = vec![Span::raw(" ")];
                spans.extend(LogEntry::parse(raw).spans());
                Line::from(spans)
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

// ── Log line parsing ─────────────────────────────────────────────────────────

/// One `tracing_subscriber::fmt` line split into its parts.
#[derive(Debug, PartialEq, Eq)]
struct LogEntry<'a> {
    time: Option<String>,
    level: Option<&'a str>,
    message: &'a str,
}

impl<'a> LogEntry<'a> {
    fn parse(raw: &'a str) -> Self {
        let mut rest = raw.trim();

        let mut time = None;
        if let Some((tok, rem)) = split_first_token(rest) {
            if let Some(t) = short_time(tok) {
                time = Some(t);
                rest = rem.trim_start();
            }
        }

        let mut level = None;
        if let Some((tok, rem)) = split_first_token(rest) {
            if matches!(tok, "TRACE" | "DEBUG" | "INFO" | "WARN" | "ERROR") {
                level = Some(tok);
                rest = rem.trim_start();
            }
        }

        // drop the "ytag::app: " target prefix
        if let Some((target, msg)) = rest.split_once(": ") {
            if !target.is_empty()
                && target.len() <= 48
                && target
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':'))
            {
                rest = msg.trim_start();
            }
        }

        Self {
            time,
            level,
            message: rest,
        }
    }

    fn level_color(&self) -> Color {
        match self.level {
            Some("ERROR") => C_ERROR,
            Some("WARN") => C_PENDING,
            Some("INFO") => C_TOAST_INFO,
            _ => C_MUTED,
        }
    }

    fn spans(&self) -> Vec<Span<'a>> {
        let mut spans = Vec::with_capacity(4);
        if let Some(t) = &self.time {
            spans.push(Span::styled(format!("{} ", t), Style::default().fg(C_MUTED)));
        }
        if let Some(l) = self.level {
            spans.push(Span::styled(
                format!("{:<5} ", l),
                Style::default().fg(self.level_color()),
            ));
        }
        spans.push(Span::styled(self.message, Style::default().fg(C_SECONDARY)));
        spans
    }
}

fn short_time(token: &str) -> Option<String> {
    let dt = chrono::DateTime::parse_from_rfc3339(token).ok()?;
    Some(dt.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
}

fn split_first_token(s: &str) -> Option<(&str, &str)> {
    let mut parts = s.splitn(2, char::is_whitespace);
    let first = parts.next()?;
    if first.is_empty() {
        return None;
    }
    Some((first, parts.next().unwrap_or("")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_fmt_line() {
        let e = LogEntry::parse(
            "2026-10-18T09:12:44.120318Z  INFO ytag::app: conversion accepted job=abc",
        );
        assert!(e.time.is_some());
        assert_eq!(e.level, Some("INFO"));
        assert_eq!(e.message, "conversion accepted job=abc");
    }

    #[test]
    fn test_keeps_unstructured_line() {
        let e = LogEntry::parse("thread panicked at src/app.rs");
        assert_eq!(e.time, None);
        assert_eq!(e.level, None);
        assert_eq!(e.message, "thread panicked at src/app.rs");
    }

    #[test]
    fn test_message_with_colon_but_spaces_kept() {
        let e = LogEntry::parse("WARN status channel broke: reset by peer");
        assert_eq!(e.level, Some("WARN"));
        assert_eq!(e.message, "status channel broke: reset by peer");
    }

    #[test]
    fn test_scroll_down_past_end_pins_bottom() {
        let mut p = LogPanel::new();
        p.scroll = 0;
        p.scroll_down(100, 20, 8);
        assert_eq!(p.scroll, usize::MAX);
        p.scroll_up(2, 20, 8);
        assert_eq!(p.scroll, 10);
    }
}
