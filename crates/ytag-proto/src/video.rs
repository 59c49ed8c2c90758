//! Video reference parsing: pull the video id out of a pasted link.

use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoRefError {
    #[error("Provided URL is invalid: it does not contain a video ID")]
    MissingVideoId,
    /// Not a URL at all; the parser's complaint is kept for the log.
    #[error("Provided URL is invalid: it does not contain a video ID")]
    Malformed(String),
}

/// Extract the `v` query parameter from a pasted video link.
///
/// Blank input is not an error: it yields `Ok(None)` and callers simply do
/// nothing.  Anything else either yields the id or explains why it can't.
pub fn extract_video_id(input: &str) -> Result<Option<String>, VideoRefError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let url = Url::parse(input).map_err(|e| VideoRefError::Malformed(e.to_string()))?;
    url.query_pairs()
        .find(|(k, _)| k == "v")
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(Some)
        .ok_or(VideoRefError::MissingVideoId)
}
