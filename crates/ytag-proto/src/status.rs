//! Job status channel: a read-only WebSocket the backend pushes job progress on.
//!
//! The listener forwards every decoded frame, in transport order, through an
//! `mpsc` channel and always finishes with exactly one `Closed` or `Failed`
//! event.  There is no reconnect: once the socket is gone the job is no
//! longer followed.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::protocol::StatusMessage;

/// What the status listener reports.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// A decoded status frame.
    Message(StatusMessage),
    /// The socket closed (by the server, or the stream simply ended).
    Closed,
    /// The socket could not be opened or broke mid-stream.
    Failed(StatusChannelError),
}

/// Why a status channel ended abnormally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusChannelError {
    #[error("could not open status channel: {0}")]
    Connect(String),
    #[error("status channel broke: {0}")]
    Stream(String),
}

impl StatusEvent {
    /// True for the events that end a listener.
    pub fn is_transport_end(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed(_))
    }
}

/// Spawn a task following the status channel at `url`.
///
/// `wrap` turns each event into the receiver's message type, so callers can
/// tag events with the job they belong to.  The task ends when the socket
/// closes or the receiver is dropped.
pub fn spawn_listener<T, F>(url: String, tx: mpsc::Sender<T>, wrap: F) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Fn(StatusEvent) -> T + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let end = follow(&url, &tx, &wrap).await;
        let _ = tx.send(wrap(end)).await;
    })
}

/// Read frames until the socket ends; returns the closing event.
async fn follow<T, F>(url: &str, tx: &mpsc::Sender<T>, wrap: &F) -> StatusEvent
where
    F: Fn(StatusEvent) -> T,
{
    info!("status: connecting to {}", url);
    let (ws_stream, _) = match connect_async(url).await {
        Ok(ok) => ok,
        Err(e) => {
            warn!("status: connection to {} failed: {}", url, e);
            return StatusEvent::Failed(StatusChannelError::Connect(e.to_string()));
        }
    };

    let (mut write, mut read) = ws_stream.split();

    while let Some(frame) = read.next().await {
        let decoded = match frame {
            Ok(Message::Text(text)) => serde_json::from_str::<StatusMessage>(&text),
            Ok(Message::Binary(data)) => serde_json::from_slice::<StatusMessage>(&data),
            Ok(Message::Ping(data)) => {
                if let Err(e) = write.send(Message::Pong(data)).await {
                    warn!("status: failed to send pong: {}", e);
                    return StatusEvent::Failed(StatusChannelError::Stream(e.to_string()));
                }
                continue;
            }
            Ok(Message::Close(_)) => {
                info!("status: channel closed by server");
                return StatusEvent::Closed;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!("status: channel error: {}", e);
                return StatusEvent::Failed(StatusChannelError::Stream(e.to_string()));
            }
        };

        match decoded {
            Ok(msg) => {
                debug!("status: {:?}", msg);
                if tx.send(wrap(StatusEvent::Message(msg))).await.is_err() {
                    // Nobody is listening any more.
                    return StatusEvent::Closed;
                }
            }
            Err(e) => warn!("status: ignoring undecodable frame: {}", e),
        }
    }

    info!("status: stream ended");
    StatusEvent::Closed
}
