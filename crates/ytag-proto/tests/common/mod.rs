//! A scripted stand-in for the conversion backend, served by axum on an
//! ephemeral port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use ytag_proto::protocol::{ConversionRequest, MetadataRequest, StatusMessage};

pub const JOB_ID: &str = "0b7c3d7e-5b0a-4f4e-9a57-2b1b3e0c9d11";

#[derive(Clone, Default)]
pub struct BackendState {
    /// Frames pushed on every status channel, in order.
    pub script: Arc<Vec<StatusMessage>>,
    /// Conversion requests received so far.
    pub conversions: Arc<Mutex<Vec<ConversionRequest>>>,
    /// When set, the probe endpoint answers 503.
    pub unhealthy: bool,
}

pub struct FakeBackend {
    pub base_url: String,
    pub state: BackendState,
}

pub async fn spawn_backend(state: BackendState) -> FakeBackend {
    let app = Router::new()
        .route("/api/", get(root))
        .route("/api/metadata", post(metadata))
        .route("/api/search/artist", get(search_artist))
        .route("/api/songs", get(songs))
        .route("/api/convert", post(convert))
        .route("/api/download/:song_id", get(download))
        .route("/api/status/ws/:request_id", get(status_ws))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeBackend {
        base_url: format!("http://{}/api", addr),
        state,
    }
}

/// A bare HTTP server whose download promises 1000 bytes, sends three and
/// hangs up.  Returns its base URL.
pub async fn spawn_truncated_download() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let head = "HTTP/1.1 200 OK\r\n\
                        Content-Type: audio/mp3\r\n\
                        Content-Disposition: attachment; filename=\"Song 1\"\r\n\
                        Content-Length: 1000\r\n\r\n";
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(b"ID3").await;
            let _ = stream.flush().await;
        }
    });
    format!("http://{}/api", addr)
}

async fn root(State(state): State<BackendState>) -> StatusCode {
    if state.unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

async fn metadata(Json(req): Json<MetadataRequest>) -> Json<serde_json::Value> {
    Json(json!({
        "title": "Stellar Stellar",
        "artists": [
            [{"name": "Suisei", "fuzzy_names": ["Hoshimachi Suisei"], "yt_id": "UC5C"}, 100],
            [{"name": "Mio", "fuzzy_names": [], "yt_id": "UCp6"}, 72]
        ],
        "album": "Vtuber Covers",
        "original_artists": [],
        "video_id": req.video_id,
        "tagger": null,
        "thumbnail_url": "https://i.ytimg.com/vi/a1b2c3/maxresdefault.jpg"
    }))
}

async fn search_artist(Query(q): Query<HashMap<String, String>>) -> Response {
    match q.get("name").map(String::as_str) {
        Some("Suisei") => Json(json!({"id": 7, "name": "Suisei", "yt_id": "UC5C"})).into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"detail": "not found"}))).into_response(),
    }
}

async fn songs() -> Json<serde_json::Value> {
    Json(json!([
        {
            "id": 1,
            "title": "Stellar Stellar",
            "tagger": {"id": 1, "name": "kiri"},
            "album": {"id": 1, "name": "Vtuber Covers"},
            "artists": [{"id": 7, "name": "Suisei", "yt_id": "UC5C"}],
            "original_artists": [],
            "created_date": "2021-03-04T05:06:07.123456"
        },
        {
            "id": 2,
            "title": "Ghost",
            "tagger": null,
            "album": null,
            "artists": [],
            "original_artists": [],
            "created_date": "2021-03-05T00:00:00"
        }
    ]))
}

async fn convert(
    State(state): State<BackendState>,
    Json(req): Json<ConversionRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.conversions.lock().unwrap().push(req);
    (
        StatusCode::ACCEPTED,
        Json(json!({
            "request_id": JOB_ID,
            "status": "waiting",
            "percentage_done": 0.0,
            "last_update": 0.0
        })),
    )
}

async fn download(Path(song_id): Path<i64>) -> Response {
    if song_id == 404 {
        return StatusCode::NOT_FOUND.into_response();
    }
    (
        [
            (header::CONTENT_TYPE, "audio/mp3".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"Song {}\"", song_id),
            ),
        ],
        vec![0x49u8, 0x44, 0x33, 0x04, 0x00],
    )
        .into_response()
}

async fn status_ws(
    ws: WebSocketUpgrade,
    Path(_request_id): Path<String>,
    State(state): State<BackendState>,
) -> Response {
    ws.on_upgrade(move |socket| push_script(socket, state.script))
}

async fn push_script(mut socket: WebSocket, script: Arc<Vec<StatusMessage>>) {
    for msg in script.iter() {
        let text = serde_json::to_string(msg).unwrap();
        if socket.send(Message::Text(text)).await.is_err() {
            return;
        }
    }
    let _ = socket.send(Message::Close(None)).await;
}
