//! SongTable component — converted songs with per-row download links.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    song_table::SongRow,
    theme::{style_selected, style_selected_focused, C_MUTED, C_PENDING, C_PRIMARY, C_SECONDARY},
    widgets::pane_chrome::{pane_chrome, Badge},
};

const PAGE: usize = 10;

/// Footer naming the file the last download was written to.
fn saved_note(state: &AppState) -> Option<String> {
    state
        .last_download
        .as_ref()
        .map(|path| format!("  saved {}", path.display()))
}

pub struct SongTablePane {
    selected: usize,
    /// Song id under the cursor, so the selection survives a refresh.
    selected_id: Option<i64>,
    table_state: TableState,
}

impl SongTablePane {
    pub fn new() -> Self {
        Self {
            selected: 0,
            selected_id: None,
            table_state: TableState::default(),
        }
    }

    fn selected_row<'a>(&self, state: &'a AppState) -> Option<&'a SongRow> {
        state.songs.rows().get(self.selected)
    }

    /// Re-anchor the cursor after the row set changed underneath it.
    fn reconcile(&mut self, state: &AppState) {
        let rows = state.songs.rows();
        if let Some(id) = self.selected_id {
            if let Some(pos) = rows.iter().position(|r| r.song_id == id) {
                self.selected = pos;
            }
        }
        if self.selected >= rows.len() {
            self.selected = rows.len().saturating_sub(1);
        }
        self.selected_id = rows.get(self.selected).map(|r| r.song_id);
    }

    fn select(&mut self, idx: usize, state: &AppState) {
        let len = state.songs.len();
        if len == 0 {
            return;
        }
        self.selected = idx.min(len - 1);
        self.selected_id = state.songs.rows().get(self.selected).map(|r| r.song_id);
    }

    fn select_up(&mut self, n: usize, state: &AppState) {
        self.select(self.selected.saturating_sub(n), state);
    }

    fn select_down(&mut self, n: usize, state: &AppState) {
        self.select(self.selected.saturating_add(n), state);
    }
}

impl Component for SongTablePane {
    fn id(&self) -> ComponentId {
        ComponentId::SongTable
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        self.reconcile(state);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select_up(1, state),
            KeyCode::Down | KeyCode::Char('j') => self.select_down(1, state),
            KeyCode::PageUp => self.select_up(PAGE, state),
            KeyCode::PageDown => self.select_down(PAGE, state),
            KeyCode::Home | KeyCode::Char('g') => self.select(0, state),
            KeyCode::End | KeyCode::Char('G') => self.select(usize::MAX, state),
            KeyCode::Enter | KeyCode::Char('d') => {
                if let Some(row) = self.selected_row(state) {
                    return vec![Action::DownloadSong(row.song_id)];
                }
            }
            KeyCode::Char('y') => {
                if let Some(row) = self.selected_row(state) {
                    return vec![Action::CopyToClipboard(row.download_url.clone())];
                }
            }
            KeyCode::Char('r') => return vec![Action::Refresh],
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        self.reconcile(state);
        match event.kind {
            MouseEventKind::ScrollUp => self.select_up(1, state),
            MouseEventKind::ScrollDown => self.select_down(1, state),
            MouseEventKind::Down(_) => {
                // border + header row
                let first = area.y + 2;
                let footer = u16::from(saved_note(state).is_some());
                let end = area.bottom().saturating_sub(1 + footer);
                if event.row >= first
                    && event.row < end
                    && ((event.row - first) as usize + self.table_state.offset()) < state.songs.len()
                {
                    let idx = (event.row - first) as usize + self.table_state.offset();
                    // a click on the selected row downloads it
                    if idx == self.selected {
                        if let Some(row) = self.selected_row(state) {
                            return vec![Action::DownloadSong(row.song_id)];
                        }
                    }
                    self.select(idx, state);
                }
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        self.reconcile(state);

        let count = match (state.songs_loading, state.songs.len()) {
            (true, _) => "refreshing…".to_string(),
            (false, n) => {
                let noun = if n == 1 { "song" } else { "songs" };
                match state.songs.refreshed_at() {
                    Some(at) => format!("{} {} · {}", n, noun, at.format("%H:%M")),
                    None => format!("{} {}", n, noun),
                }
            }
        };
        let badge = Badge {
            text: &count,
            color: if state.songs_loading { C_PENDING } else { C_SECONDARY },
        };
        let block = pane_chrome("songs", Some('3'), focused, Some(badge));
        let mut inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(note) = saved_note(state) {
            if inner.height > 2 {
                inner.height -= 1;
                let footer = Rect {
                    y: inner.y + inner.height,
                    height: 1,
                    ..inner
                };
                frame.render_widget(
                    Paragraph::new(Span::styled(note, Style::default().fg(C_MUTED))),
                    footer,
                );
            }
        }

        if state.songs.is_empty() {
            let msg = if state.songs_loading {
                "  loading songs…"
            } else {
                "  no converted songs yet"
            };
            frame.render_widget(
                Paragraph::new(Span::styled(msg, Style::default().fg(C_MUTED))),
                inner,
            );
            return;
        }

        let header = Row::new(["title", "artists", "album", "created", "tagger"])
            .style(Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = state
            .songs
            .rows()
            .iter()
            .map(|r| {
                Row::new(vec![
                    Cell::from(r.title.as_str()).style(Style::default().fg(C_PRIMARY)),
                    Cell::from(r.artists.as_str()),
                    Cell::from(r.album.as_str()),
                    Cell::from(r.created.as_str()).style(Style::default().fg(C_MUTED)),
                    Cell::from(r.tagger.as_str()).style(Style::default().fg(C_MUTED)),
                ])
                .style(Style::default().fg(C_SECONDARY))
            })
            .collect();

        let widths = [
            Constraint::Percentage(30),
            Constraint::Percentage(22),
            Constraint::Percentage(20),
            Constraint::Length(19),
            Constraint::Min(6),
        ];
        let highlight = if focused {
            style_selected_focused()
        } else {
            style_selected()
        };
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .row_highlight_style(highlight);

        self.table_state.select(Some(self.selected));
        frame.render_stateful_widget(table, inner, &mut self.table_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;
    use ytag_proto::config::ArtistMode;
    use ytag_proto::protocol::SongRecord;

    fn record(id: i64, title: &str) -> SongRecord {
        SongRecord {
            id,
            title: title.into(),
            artists: vec!["Suisei".into()],
            album: None,
            created_date: None,
            tagger: None,
        }
    }

    fn state_with(records: &[SongRecord]) -> AppState {
        let mut s = AppState::new(
            "http://localhost:8000/api/v0.0.1".into(),
            ArtistMode::Suggest,
            "/tmp/ytag".into(),
            "/tmp/ytag.log".into(),
        );
        s.songs
            .rebuild(records, |id| format!("http://localhost:8000/api/v0.0.1/download/{id}"));
        s
    }

    fn press(pane: &mut SongTablePane, code: KeyCode, s: &AppState) -> Vec<Action> {
        pane.handle_key(KeyEvent::new(code, KeyModifiers::NONE), s)
    }

    #[test]
    fn test_enter_downloads_selected_row() {
        let s = state_with(&[record(1, "a"), record(2, "b")]);
        let mut pane = SongTablePane::new();
        press(&mut pane, KeyCode::Down, &s);
        assert!(matches!(
            press(&mut pane, KeyCode::Enter, &s).as_slice(),
            [Action::DownloadSong(2)]
        ));
    }

    #[test]
    fn test_y_copies_download_url() {
        let s = state_with(&[record(5, "a")]);
        let mut pane = SongTablePane::new();
        let actions = press(&mut pane, KeyCode::Char('y'), &s);
        assert!(matches!(
            actions.as_slice(),
            [Action::CopyToClipboard(url)] if url.ends_with("/download/5")
        ));
    }

    #[test]
    fn test_selection_follows_song_across_refresh() {
        let s = state_with(&[record(1, "a"), record(2, "b"), record(3, "c")]);
        let mut pane = SongTablePane::new();
        press(&mut pane, KeyCode::Char('G'), &s);
        assert_eq!(pane.selected, 2);

        let s = state_with(&[record(4, "d"), record(1, "a"), record(2, "b"), record(3, "c")]);
        assert!(matches!(
            press(&mut pane, KeyCode::Enter, &s).as_slice(),
            [Action::DownloadSong(3)]
        ));
    }

    #[test]
    fn test_footer_names_last_saved_file() {
        let mut s = state_with(&[record(1, "a")]);
        assert_eq!(saved_note(&s), None);

        s.last_download = Some("/tmp/ytag/Song 1.mp3".into());
        assert_eq!(saved_note(&s).as_deref(), Some("  saved /tmp/ytag/Song 1.mp3"));
    }

    #[test]
    fn test_empty_table_emits_nothing() {
        let s = state_with(&[]);
        let mut pane = SongTablePane::new();
        assert!(press(&mut pane, KeyCode::Enter, &s).is_empty());
        assert!(press(&mut pane, KeyCode::Char('y'), &s).is_empty());
    }
}
