//! Tag form model: the editable fields of the convert form, the artist
//! suggestions and the rules for filling them from a metadata lookup.

use ytag_proto::config::ArtistMode;
use ytag_proto::protocol::{ArtistCandidate, ConversionRequest, MetadataCandidate};

use crate::session::{ClientSession, PopulationTicket};

/// Shown in place of suggestions when the backend had no artist guess.
pub const COULD_NOT_GUESS: &str = "could not guess";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    Title,
    Artists,
    Album,
    Tagger,
    VideoId,
    Cover,
}

impl FieldId {
    pub const ALL: [FieldId; 6] = [
        FieldId::Title,
        FieldId::Artists,
        FieldId::Album,
        FieldId::Tagger,
        FieldId::VideoId,
        FieldId::Cover,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Artists => "artists",
            Self::Album => "album",
            Self::Tagger => "tagger",
            Self::VideoId => "video id",
            Self::Cover => "cover",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Title => "song title",
            Self::Artists => "comma separated",
            Self::Album => "album",
            Self::Tagger => "your name (optional)",
            Self::VideoId => "filled in by lookup",
            Self::Cover => "cover image url",
        }
    }

    /// Fields that must be non-empty before a conversion can be submitted.
    pub fn is_required(self) -> bool {
        matches!(self, Self::Title | Self::VideoId)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFields {
    pub title: String,
    pub artists: String,
    pub album: String,
    pub tagger: String,
    pub video_id: String,
    pub cover: String,
}

impl TagFields {
    pub fn get(&self, id: FieldId) -> &str {
        match id {
            FieldId::Title => &self.title,
            FieldId::Artists => &self.artists,
            FieldId::Album => &self.album,
            FieldId::Tagger => &self.tagger,
            FieldId::VideoId => &self.video_id,
            FieldId::Cover => &self.cover,
        }
    }

    fn slot(&mut self, id: FieldId) -> &mut String {
        match id {
            FieldId::Title => &mut self.title,
            FieldId::Artists => &mut self.artists,
            FieldId::Album => &mut self.album,
            FieldId::Tagger => &mut self.tagger,
            FieldId::VideoId => &mut self.video_id,
            FieldId::Cover => &mut self.cover,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Suggestions {
    /// Nothing looked up yet.
    #[default]
    Hidden,
    CouldNotGuess,
    Names(Vec<String>),
}

/// What the caller should do after a population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    pub ticket: PopulationTicket,
    /// Artist to look a cover up for, if any.
    pub cover_query: Option<String>,
}

#[derive(Debug, Default)]
pub struct TagForm {
    pub fields: TagFields,
    pub suggestions: Suggestions,
    /// Highlighted suggestion in the panel.
    pub suggestion_cursor: usize,
    /// Bumped on every programmatic change so views can resync their inputs.
    revision: u64,
    cover_edited: bool,
}

impl TagForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn value(&self, id: FieldId) -> &str {
        self.fields.get(id)
    }

    /// A user edit.  Does not bump the revision: the view already holds the text.
    pub fn edit(&mut self, id: FieldId, value: String) {
        if id == FieldId::Cover && *self.fields.get(id) != value {
            self.cover_edited = true;
        }
        *self.fields.slot(id) = value;
    }

    fn set(&mut self, id: FieldId, value: impl Into<String>) {
        *self.fields.slot(id) = value.into();
    }

    /// Fill the form from a lookup result.
    pub fn populate(
        &mut self,
        meta: &MetadataCandidate,
        mode: ArtistMode,
        session: &mut ClientSession,
    ) -> Population {
        let ticket = session.begin_population();

        self.set(FieldId::Title, meta.title.as_str());
        self.set(FieldId::Album, meta.album.as_str());
        self.set(FieldId::VideoId, meta.video_id.as_str());
        if let Some(tagger) = meta.tagger.as_deref().filter(|t| !t.trim().is_empty()) {
            self.set(FieldId::Tagger, tagger);
        }

        session.cache_thumbnail(meta.thumbnail_url.as_deref());
        let cover = session.last_thumbnail().unwrap_or("").to_string();
        self.set(FieldId::Cover, cover);
        self.cover_edited = false;

        self.suggestion_cursor = 0;
        let default_artist = match mode {
            ArtistMode::Joined => {
                let joined = meta
                    .artists
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                self.set(FieldId::Artists, joined);
                self.suggestions = Suggestions::Hidden;
                meta.artists.first().map(|a| a.name.clone())
            }
            ArtistMode::Suggest => {
                let ranked = rank_candidates(&meta.artists);
                let default = ranked.first().map(|a| a.name.clone());
                self.set(FieldId::Artists, default.clone().unwrap_or_default());
                self.suggestions = if ranked.is_empty() {
                    Suggestions::CouldNotGuess
                } else {
                    Suggestions::Names(suggestion_names(&ranked))
                };
                default
            }
        };

        self.revision += 1;
        Population {
            ticket,
            cover_query: default_artist.filter(|a| !a.trim().is_empty()),
        }
    }

    pub fn suggestion_names(&self) -> &[String] {
        match &self.suggestions {
            Suggestions::Names(names) => names,
            _ => &[],
        }
    }

    pub fn move_suggestion(&mut self, delta: isize) {
        let len = self.suggestion_names().len();
        if len == 0 {
            return;
        }
        let cur = self.suggestion_cursor as isize;
        self.suggestion_cursor = (cur + delta).rem_euclid(len as isize) as usize;
    }

    /// Overwrite the artist field with suggestion `idx`.
    pub fn choose_suggestion(&mut self, idx: usize) -> bool {
        let Some(name) = self.suggestion_names().get(idx).cloned() else {
            return false;
        };
        self.set(FieldId::Artists, name);
        self.suggestion_cursor = idx;
        self.revision += 1;
        true
    }

    /// Apply a cover lookup result.  Stale results (a newer population
    /// started, or the user typed a cover) are dropped.
    pub fn apply_cover(
        &mut self,
        ticket: PopulationTicket,
        cover_url: String,
        session: &ClientSession,
    ) -> bool {
        if !session.is_current(ticket) || self.cover_edited {
            return false;
        }
        self.set(FieldId::Cover, cover_url);
        self.revision += 1;
        true
    }

    /// First required field that is still empty.
    pub fn missing_required(&self) -> Option<FieldId> {
        FieldId::ALL
            .into_iter()
            .find(|id| id.is_required() && self.value(*id).trim().is_empty())
    }

    /// Build the body of `POST /convert` from the current fields.
    pub fn build_request(
        &self,
        default_tagger: Option<&str>,
        session: &ClientSession,
    ) -> ConversionRequest {
        let f = &self.fields;
        let tagger = non_blank(&f.tagger).or_else(|| default_tagger.and_then(non_blank));
        let thumbnail_url = non_blank(&f.cover).or_else(|| session.last_thumbnail().map(str::to_string));
        ConversionRequest {
            title: f.title.trim().to_string(),
            artists: split_artists(&f.artists),
            album: f.album.trim().to_string(),
            original_artists: Vec::new(),
            tagger,
            video_id: f.video_id.trim().to_string(),
            thumbnail_url,
        }
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Highest score first; candidates the backend did not score keep their
/// order after the scored ones.
pub fn rank_candidates(candidates: &[ArtistCandidate]) -> Vec<&ArtistCandidate> {
    let mut ranked: Vec<&ArtistCandidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

fn suggestion_names(ranked: &[&ArtistCandidate]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in ranked.iter().flat_map(|c| c.all_names()) {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

/// Split the artist field on commas, trimming each part and dropping blanks.
pub fn split_artists(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
