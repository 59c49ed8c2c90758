//! Request and response bodies of the conversion backend.
//!
//! The backend went through several revisions and each one shaped a few of
//! these payloads differently (bare strings vs. `{id, name}` objects, ranked
//! artist tuples, ...).  Decoding accepts every shape seen in the wild and
//! normalises it into a single Rust type.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Body of `POST /metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRequest {
    pub video_id: String,
}

// ── Metadata ──────────────────────────────────────────────────────────────────

/// One guessed artist for a looked-up video.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawArtistCandidate")]
pub struct ArtistCandidate {
    pub name: String,
    /// Other spellings the backend knows for this artist.
    pub alternate_names: Vec<String>,
    /// Match score (0..=100) when the backend ranked its guesses.
    pub score: Option<u32>,
}

impl ArtistCandidate {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Primary name followed by alternates, without duplicates or blanks.
    pub fn all_names(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(1 + self.alternate_names.len());
        for n in std::iter::once(&self.name).chain(self.alternate_names.iter()) {
            let n = n.trim();
            if !n.is_empty() && !out.contains(&n) {
                out.push(n);
            }
        }
        out
    }
}

#[derive(Deserialize)]
struct ArtistDetails {
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    fuzzy_names: Vec<String>,
}

// Variant order matters for untagged decoding: the tuple shapes must be tried
// before `Detailed`, because serde also lets a struct decode from a sequence.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawArtistCandidate {
    Name(String),
    Ranked(ArtistDetails, f64),
    RankedName(String, f64),
    Detailed(ArtistDetails),
}

impl From<RawArtistCandidate> for ArtistCandidate {
    fn from(raw: RawArtistCandidate) -> Self {
        match raw {
            RawArtistCandidate::Name(name) => Self::named(name),
            RawArtistCandidate::Ranked(d, score) => Self {
                name: d.name,
                alternate_names: d.fuzzy_names,
                score: Some(score_from_f64(score)),
            },
            RawArtistCandidate::RankedName(name, score) => Self {
                name,
                alternate_names: Vec::new(),
                score: Some(score_from_f64(score)),
            },
            RawArtistCandidate::Detailed(d) => Self {
                name: d.name,
                alternate_names: d.fuzzy_names,
                score: None,
            },
        }
    }
}

fn score_from_f64(score: f64) -> u32 {
    if score.is_finite() {
        score.round().clamp(0.0, u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Response of `POST /metadata`: the backend's best guess at tags for a video.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetadataCandidate {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artists: Vec<ArtistCandidate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub album: String,
    pub video_id: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub tagger: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_artists: Vec<String>,
}

/// Response of `GET /search/artist`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtistRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub yt_id: Option<String>,
}

// ── Conversion ────────────────────────────────────────────────────────────────

/// Body of `POST /convert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    /// Always sent empty; the backend fills it in for covers.
    #[serde(default)]
    pub original_artists: Vec<String>,
    pub tagger: Option<String>,
    pub video_id: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// Opaque id of a submitted conversion job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response of `POST /convert`.  The backend echoes a full job snapshot; only
/// the id matters to the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionAccepted {
    pub request_id: JobHandle,
}

/// Status labels pushed on `/status/ws/{request_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Waiting,
    Downloading,
    Converting,
    Done,
    Error,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// `done` and `error` end a job; nothing meaningful follows them.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// One frame of the job status channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_done: Option<f64>,
}

impl StatusMessage {
    pub fn new(status: JobStatus, percentage_done: Option<f64>) -> Self {
        Self {
            status,
            percentage_done,
        }
    }

    /// Fractional progress rounded to a whole percentage, clamped to 0..=100.
    pub fn percent(&self) -> Option<u8> {
        let p = self.percentage_done?;
        if !p.is_finite() {
            return None;
        }
        Some((p * 100.0).round().clamp(0.0, 100.0) as u8)
    }
}

// ── Songs ─────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum NamedRef {
    Plain(String),
    Object { name: String },
}

impl NamedRef {
    fn into_name(self) -> String {
        match self {
            Self::Plain(s) | Self::Object { name: s } => s,
        }
    }
}

/// A previously converted song as listed by `GET /songs`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SongRecord {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "names")]
    pub artists: Vec<String>,
    #[serde(default, deserialize_with = "optional_name")]
    pub album: Option<String>,
    /// Creation time as sent by the backend (naive timestamps are UTC).
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default, deserialize_with = "optional_name")]
    pub tagger: Option<String>,
}

impl SongRecord {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_date.as_deref().and_then(parse_backend_timestamp)
    }
}

/// Parse a backend timestamp.  Values with an explicit offset are honoured;
/// naive values are taken to be UTC.
pub fn parse_backend_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// ── serde helpers ─────────────────────────────────────────────────────────────

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

fn names<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs: Option<Vec<NamedRef>> = Option::deserialize(de)?;
    Ok(refs
        .unwrap_or_default()
        .into_iter()
        .map(NamedRef::into_name)
        .collect())
}

fn optional_name<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let r: Option<NamedRef> = Option::deserialize(de)?;
    Ok(r.map(NamedRef::into_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_percent_rounds_to_whole_number() {
        let msg = StatusMessage::new(JobStatus::Downloading, Some(0.37));
        assert_eq!(msg.percent(), Some(37));
        let msg = StatusMessage::new(JobStatus::Downloading, Some(0.996));
        assert_eq!(msg.percent(), Some(100));
        let msg = StatusMessage::new(JobStatus::Downloading, Some(1.7));
        assert_eq!(msg.percent(), Some(100));
        assert_eq!(StatusMessage::new(JobStatus::Waiting, None).percent(), None);
    }

    #[test]
    fn test_unknown_status_label() {
        let msg: StatusMessage = serde_json::from_str(r#"{"status":"paused"}"#).unwrap();
        assert_eq!(msg.status, JobStatus::Unknown);
        assert!(!msg.status.is_terminal());
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        let dt = parse_backend_timestamp("2021-03-04T05:06:07.123456").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2021, 3, 4));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (5, 6, 7));
    }

    #[test]
    fn test_offset_timestamp_is_honoured() {
        let dt = parse_backend_timestamp("2021-03-04T07:06:07+02:00").unwrap();
        assert_eq!(dt.hour(), 5);
        assert!(parse_backend_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_all_names_dedups() {
        let c = ArtistCandidate {
            name: "Suisei".into(),
            alternate_names: vec!["星街すいせい".into(), "Suisei".into(), " ".into()],
            score: None,
        };
        assert_eq!(c.all_names(), vec!["Suisei", "星街すいせい"]);
    }
}
