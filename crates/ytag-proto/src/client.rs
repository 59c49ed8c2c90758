//! HTTP client for the conversion backend.
//!
//! Every path is appended verbatim to the configured base URL, so a base of
//! `http://host/api/v0.0.1` and a path of `/songs` hits
//! `http://host/api/v0.0.1/songs`.  Nothing here retries: a failed call is
//! reported once and the user decides whether to try again.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::protocol::{
    ArtistRef, ConversionAccepted, ConversionRequest, JobHandle, MetadataCandidate,
    MetadataRequest, SongRecord,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base url {url}: {reason}")]
    BaseUrl { url: String, reason: String },
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned {status}")]
    Status { path: String, status: StatusCode },
    #[error("could not decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not save download: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status of a non-success response, if that is what went wrong.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    convert_path: String,
}

impl ApiClient {
    pub fn new(base_url: &str, convert_path: &str, timeout: Duration) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|e| ApiError::BaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::BaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                path: String::new(),
                source: e,
            })?;

        let convert_path = if convert_path.starts_with('/') {
            convert_path.to_string()
        } else {
            format!("/{}", convert_path)
        };

        Ok(Self {
            http,
            base_url: trimmed.to_string(),
            convert_path,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.endpoint(path))
    }

    async fn send(&self, path: &str, req: RequestBuilder) -> Result<Response, ApiError> {
        debug!("api: {}", path);
        req.send().await.map_err(|e| ApiError::Transport {
            path: path.to_string(),
            source: e,
        })
    }

    /// `GET {base}{path}`; only transport failures are errors.
    pub async fn get(&self, path: &str) -> Result<Response, ApiError> {
        self.send(path, self.request(Method::GET, path)).await
    }

    /// `POST {base}{path}` with a JSON body; only transport failures are errors.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        self.send(path, self.request(Method::POST, path).json(body))
            .await
    }

    /// Liveness probe against the base URL.
    pub async fn probe(&self) -> Result<(), ApiError> {
        let resp = self.get("/").await?;
        ensure_success("/", resp).map(|_| ())
    }

    pub async fn fetch_metadata(&self, video_id: &str) -> Result<MetadataCandidate, ApiError> {
        let body = MetadataRequest {
            video_id: video_id.to_string(),
        };
        let resp = self.post("/metadata", &body).await?;
        decode("/metadata", resp).await
    }

    /// Look an artist up by name.  A 404 means "no such artist", not an error.
    pub async fn search_artist(&self, name: &str) -> Result<Option<ArtistRef>, ApiError> {
        let path = "/search/artist";
        let req = self.request(Method::GET, path).query(&[("name", name)]);
        let resp = self.send(path, req).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(path, resp).await.map(Some)
    }

    pub async fn list_songs(&self) -> Result<Vec<SongRecord>, ApiError> {
        let resp = self.get("/songs").await?;
        decode("/songs", resp).await
    }

    pub async fn submit_conversion(&self, req: &ConversionRequest) -> Result<JobHandle, ApiError> {
        let resp = self.post(&self.convert_path, req).await?;
        let accepted: ConversionAccepted = decode(&self.convert_path, resp).await?;
        info!("api: conversion accepted as job {}", accepted.request_id);
        Ok(accepted.request_id)
    }

    pub fn download_url(&self, song_id: i64) -> String {
        self.endpoint(&format!("/download/{}", song_id))
    }

    pub fn cover_url(&self, artist_id: i64) -> String {
        self.endpoint(&format!("/cover/{}", artist_id))
    }

    /// WebSocket URL of a job's status channel (`http` → `ws`, `https` → `wss`).
    pub fn status_ws_url(&self, handle: &JobHandle) -> String {
        let rest = self
            .base_url
            .strip_prefix("https://")
            .map(|r| ("wss://", r))
            .or_else(|| self.base_url.strip_prefix("http://").map(|r| ("ws://", r)));
        match rest {
            Some((scheme, r)) => format!("{}{}/status/ws/{}", scheme, r, handle),
            // `new` only accepts http(s) bases
            None => format!("{}/status/ws/{}", self.base_url, handle),
        }
    }

    /// Fetch `url` into `dir`, returning the written path.
    ///
    /// The file name comes from the response's `Content-Disposition` when the
    /// server sends one and from `fallback_name` otherwise.  An existing file
    /// is never overwritten; a numbered sibling is created instead.
    pub async fn download_file(
        &self,
        url: &str,
        dir: &Path,
        fallback_name: &str,
    ) -> Result<PathBuf, ApiError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                path: url.to_string(),
                source: e,
            })?;
        let resp = ensure_success(url, resp)?;

        let headers = resp.headers();
        let served_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition);
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let mut name = sanitize_file_name(served_name.as_deref().unwrap_or(fallback_name));
        if Path::new(&name).extension().is_none() {
            if let Some(ext) = extension_for(content_type) {
                name = format!("{}.{}", name, ext);
            }
        }

        tokio::fs::create_dir_all(dir).await?;
        let target = unique_path(dir, &name);
        let partial = partial_path(&target);
        if let Err(e) = write_body(url, resp, &partial).await {
            warn!("api: download of {} failed, removing {}", url, partial.display());
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, &target).await?;

        info!("api: saved {} to {}", url, target.display());
        Ok(target)
    }
}

/// Stream a response body into `path`.
async fn write_body(url: &str, resp: Response, path: &Path) -> Result<(), ApiError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ApiError::Transport {
            path: url.to_string(),
            source: e,
        })?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(())
}

/// `Song.mp3` → `Song.mp3.part`; the body lands here until it is complete.
fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn ensure_success(path: &str, resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(ApiError::Status {
            path: path.to_string(),
            status,
        })
    }
}

async fn decode<T: DeserializeOwned>(path: &str, resp: Response) -> Result<T, ApiError> {
    let resp = ensure_success(path, resp)?;
    resp.json().await.map_err(|e| ApiError::Decode {
        path: path.to_string(),
        source: e,
    })
}

/// Pull a file name out of a `Content-Disposition` header value.
/// `filename*=UTF-8''...` wins over a plain `filename=`.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;
    for part in disposition_params(value) {
        if let Some(v) = part.strip_prefix("filename*=") {
            let encoded = v.splitn(3, '\'').nth(2).unwrap_or(v).trim_matches('"');
            extended = Some(
                urlencoding::decode(encoded)
                    .map(|name| name.into_owned())
                    .unwrap_or_else(|_| encoded.to_string()),
            );
        } else if let Some(v) = part.strip_prefix("filename=") {
            plain = Some(unquote(v));
        }
    }
    extended.or(plain).filter(|n| !n.trim().is_empty())
}

/// Split a header value on `;`, leaving quoted-strings whole.
fn disposition_params(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                parts.push(value[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(value[start..].trim());
    parts
}

fn unquote(v: &str) -> String {
    let Some(inner) = v.strip_prefix('"').and_then(|r| r.strip_suffix('"')) else {
        return v.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.extend(chars.next());
        } else {
            out.push(c);
        }
    }
    out
}

/// Strip path separators and control characters so a served name can't
/// escape the downloads directory.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').trim();
    if cleaned.is_empty() {
        "download".to_string()
    } else {
        cleaned.to_string()
    }
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    match mime {
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/ogg" => Some("ogg"),
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => Some("m4a"),
        "audio/flac" => Some("flac"),
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let first = dir.join(name);
    if !first.exists() {
        return first;
    }
    let p = Path::new(name);
    let stem = p.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let ext = p.extension().and_then(|s| s.to_str());
    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
            None => dir.join(format!("{} ({})", stem, n)),
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, "/convert", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_urls_keep_api_prefix() {
        let c = client("http://localhost:8000/api/v0.0.1/");
        assert_eq!(c.base_url(), "http://localhost:8000/api/v0.0.1");
        assert_eq!(
            c.download_url(12),
            "http://localhost:8000/api/v0.0.1/download/12"
        );
        assert_eq!(c.cover_url(3), "http://localhost:8000/api/v0.0.1/cover/3");
    }

    #[test]
    fn test_status_ws_url_scheme() {
        let handle = JobHandle::new("4f1c");
        assert_eq!(
            client("http://localhost:8000/api").status_ws_url(&handle),
            "ws://localhost:8000/api/status/ws/4f1c"
        );
        assert_eq!(
            client("https://tagger.example.org").status_ws_url(&handle),
            "wss://tagger.example.org/status/ws/4f1c"
        );
    }

    #[test]
    fn test_rejects_non_http_base() {
        assert!(ApiClient::new("ftp://example.org", "/convert", Duration::from_secs(1)).is_err());
        assert!(ApiClient::new("not a url", "/convert", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_convert_path_gets_leading_slash() {
        let c = ApiClient::new("http://h", "download", Duration::from_secs(1)).unwrap();
        assert_eq!(c.convert_path, "/download");
    }

    #[test]
    fn test_disposition_parsing() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="Song A""#).as_deref(),
            Some("Song A")
        );
        assert_eq!(
            filename_from_disposition(
                "attachment; filename=\"fallback\"; filename*=UTF-8''%E6%98%9F.mp3"
            )
            .as_deref(),
            Some("星.mp3")
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="Ghost; Acoustic Ver.""#).as_deref(),
            Some("Ghost; Acoustic Ver.")
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="say \"hi\"; ok"; size=3"#).as_deref(),
            Some(r#"say "hi"; ok"#)
        );
        assert_eq!(
            filename_from_disposition("attachment; filename*=utf-8''Ghost%3B%20Acoustic%20Ver.mp3")
                .as_deref(),
            Some("Ghost; Acoustic Ver.mp3")
        );
        assert_eq!(filename_from_disposition("inline"), None);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name("a/b:c"), "a_b_c");
        assert_eq!(sanitize_file_name("   "), "download");
    }

    #[test]
    fn test_unique_path_numbers_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.mp3"), b"1").unwrap();
        assert_eq!(unique_path(dir.path(), "x.mp3"), dir.path().join("x (1).mp3"));
        assert_eq!(unique_path(dir.path(), "y.mp3"), dir.path().join("y.mp3"));
    }
}
