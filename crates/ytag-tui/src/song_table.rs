//! Model behind the song table pane: one row per converted song, rebuilt
//! wholesale on every refresh.

use chrono::{DateTime, Local};
use ytag_proto::protocol::{parse_backend_timestamp, SongRecord};

/// Placeholder for absent album/tagger cells.
pub const EMPTY_CELL: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRow {
    pub song_id: i64,
    pub title: String,
    pub artists: String,
    pub album: String,
    pub created: String,
    pub tagger: String,
    /// Target of the row's download action.
    pub download_url: String,
}

impl SongRow {
    /// File name used when the server does not name the download.
    pub fn fallback_file_name(&self) -> String {
        if self.artists.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.artists, self.title)
        }
    }
}

#[derive(Debug, Default)]
pub struct SongTable {
    rows: Vec<SongRow>,
    refreshed_at: Option<DateTime<Local>>,
}

impl SongTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[SongRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Local>> {
        self.refreshed_at
    }

    pub fn row_by_id(&self, song_id: i64) -> Option<&SongRow> {
        self.rows.iter().find(|r| r.song_id == song_id)
    }

    /// Drop every row and insert one per record, in record order.
    pub fn rebuild(&mut self, records: &[SongRecord], download_url: impl Fn(i64) -> String) {
        self.rows.clear();
        self.rows.extend(records.iter().map(|rec| SongRow {
            song_id: rec.id,
            title: rec.title.clone(),
            artists: rec.artists.join(", "),
            album: cell(rec.album.as_deref()),
            created: format_created(rec.created_date.as_deref()),
            tagger: cell(rec.tagger.as_deref()),
            download_url: download_url(rec.id),
        }));
        self.refreshed_at = Some(Local::now());
    }
}

fn cell(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => EMPTY_CELL.to_string(),
    }
}

/// Render a creation timestamp in local time.  Unparseable input is shown
/// as received.
pub fn format_created(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return EMPTY_CELL.to_string();
    };
    match parse_backend_timestamp(raw) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => raw.to_string(),
    }
}
