//! Payloads as emitted by each backend revision must decode into the same
//! types.

use ytag_proto::protocol::{
    ArtistCandidate, ConversionAccepted, JobStatus, MetadataCandidate, SongRecord, StatusMessage,
};

#[test]
fn metadata_with_plain_artist_names() {
    let meta: MetadataCandidate = serde_json::from_str(
        r#"{
            "title": "Song",
            "artists": ["A", "B"],
            "album": "Covers",
            "original_artists": [],
            "video_id": "xyz"
        }"#,
    )
    .unwrap();
    assert_eq!(
        meta.artists,
        vec![ArtistCandidate::named("A"), ArtistCandidate::named("B")]
    );
    assert_eq!(meta.thumbnail_url, None);
}

#[test]
fn metadata_with_artist_objects() {
    let meta: MetadataCandidate = serde_json::from_str(
        r#"{
            "title": "Song",
            "artists": [{"name": "Pekora", "fuzzy_names": ["Usada Pekora", "兎田ぺこら"], "yt_id": "UC1"}],
            "album": "Covers",
            "video_id": "xyz",
            "tagger": null,
            "thumbnail_url": "https://i.ytimg.com/vi/xyz/hqdefault.jpg"
        }"#,
    )
    .unwrap();
    let a = &meta.artists[0];
    assert_eq!(a.name, "Pekora");
    assert_eq!(a.alternate_names.len(), 2);
    assert_eq!(a.score, None);
}

#[test]
fn metadata_with_ranked_pairs_and_nulls() {
    let meta: MetadataCandidate = serde_json::from_str(
        r#"{
            "title": "Song",
            "artists": [[{"name": "Mio", "fuzzy_names": null}, 86.6], ["Okayu", 51]],
            "album": null,
            "video_id": "xyz",
            "original_artists": null
        }"#,
    )
    .unwrap();
    assert_eq!(meta.artists[0].name, "Mio");
    assert_eq!(meta.artists[0].score, Some(87));
    assert!(meta.artists[0].alternate_names.is_empty());
    assert_eq!(meta.artists[1].name, "Okayu");
    assert_eq!(meta.artists[1].score, Some(51));
    assert_eq!(meta.album, "");
    assert!(meta.original_artists.is_empty());
}

#[test]
fn metadata_with_no_artists() {
    let meta: MetadataCandidate =
        serde_json::from_str(r#"{"title": "Song", "artists": [], "album": "", "video_id": "v"}"#)
            .unwrap();
    assert!(meta.artists.is_empty());
}

#[test]
fn songs_from_early_revision_use_plain_strings() {
    let songs: Vec<SongRecord> = serde_json::from_str(
        r#"[{"id": 5, "title": "T", "artists": ["A", "B"], "album": "Al", "tagger": "kiri",
             "created_date": "2020-12-01T10:00:00"}]"#,
    )
    .unwrap();
    assert_eq!(songs[0].artists, vec!["A", "B"]);
    assert_eq!(songs[0].album.as_deref(), Some("Al"));
    assert_eq!(songs[0].tagger.as_deref(), Some("kiri"));
}

#[test]
fn songs_without_created_date() {
    let songs: Vec<SongRecord> =
        serde_json::from_str(r#"[{"id": 1, "title": "T", "artists": ["A"], "album": "Al"}]"#)
            .unwrap();
    assert_eq!(songs[0].created_date, None);
    assert_eq!(songs[0].created_at(), None);
}

#[test]
fn conversion_response_carries_extra_fields() {
    let accepted: ConversionAccepted = serde_json::from_str(
        r#"{"request_id": "9a0e", "status": "waiting", "percentage_done": 0.0, "last_update": 1.5}"#,
    )
    .unwrap();
    assert_eq!(accepted.request_id.as_str(), "9a0e");
}

#[test]
fn status_frames_of_every_revision() {
    let old: StatusMessage = serde_json::from_str(r#"{"status": "downloading"}"#).unwrap();
    assert_eq!(old.status, JobStatus::Downloading);
    assert_eq!(old.percent(), None);

    let new: StatusMessage = serde_json::from_str(
        r#"{"request_id": "9a0e", "status": "converting", "percentage_done": 1.0, "last_update": 3.2}"#,
    )
    .unwrap();
    assert_eq!(new.status, JobStatus::Converting);
    assert_eq!(new.percent(), Some(100));
}
