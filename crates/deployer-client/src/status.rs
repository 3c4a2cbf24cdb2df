//! Push status channel
//!
//! The backend broadcasts `status_update` events over Socket.IO. Each update
//! is forwarded to a channel and shown through the [`Notifier`]. An
//! in-progress alert stays up until the next update replaces it; every other
//! alert is transient.

use crate::error::ChannelError;
use crate::socketio::{EnginePacket, SocketPacket};
use deployer_validation::{Notification, NotificationId, Notifier};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Event name carrying status updates
pub const STATUS_EVENT: &str = "status_update";

/// Status reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusKind {
    /// Work started
    Processing,
    /// Work finished
    Success,
    /// Work failed
    Error,
    /// Periodic health report
    Ok,
    /// Anything else, kept verbatim
    Other(String),
}

impl StatusKind {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Error => "error",
            Self::Ok => "ok",
            Self::Other(other) => other,
        }
    }

    /// Whether the alert stays until replaced
    #[inline]
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Processing)
    }
}

impl From<String> for StatusKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "processing" => Self::Processing,
            "success" => Self::Success,
            "error" => Self::Error,
            "ok" => Self::Ok,
            _ => Self::Other(value),
        }
    }
}

impl From<StatusKind> for String {
    fn from(kind: StatusKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `status_update` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Reported status
    pub status: StatusKind,
    /// Text to show
    #[serde(default)]
    pub message: String,
}

impl StatusUpdate {
    /// How this update is shown
    #[must_use]
    pub fn to_notification(&self) -> Notification {
        match self.status {
            StatusKind::Processing => Notification::progress(self.message.clone()),
            StatusKind::Success | StatusKind::Ok => Notification::success(self.message.clone()),
            StatusKind::Error => Notification::error(self.message.clone()),
            StatusKind::Other(_) => Notification::info(self.message.clone()),
        }
    }
}

/// Socket url for a backend base url
///
/// # Errors
/// - `ChannelError::Url` for anything but http(s) or ws(s)
pub fn socket_url(base: &Url) -> Result<Url, ChannelError> {
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ChannelError::Url(format!("unsupported scheme '{other}'"))),
    };
    let mut url = base.clone();
    url.set_scheme(scheme)
        .map_err(|()| ChannelError::Url(base.to_string()))?;
    url.set_path("/socket.io/");
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url)
}

/// Packet handling for one connection, independent of the socket
pub struct StatusRelay {
    notifier: Arc<dyn Notifier>,
    updates: mpsc::Sender<StatusUpdate>,
    sticky: Option<NotificationId>,
}

impl StatusRelay {
    /// Relay into `updates` and `notifier`
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, updates: mpsc::Sender<StatusUpdate>) -> Self {
        Self {
            notifier,
            updates,
            sticky: None,
        }
    }

    /// Handle one inbound frame; returns frames to send back
    ///
    /// # Errors
    /// - `ChannelError::Protocol` for malformed frames
    /// - `ChannelError::Closed` when the server closes or the receiver is gone
    pub async fn handle(&mut self, frame: &str) -> Result<Vec<String>, ChannelError> {
        match EnginePacket::decode(frame)? {
            EnginePacket::Open(info) => {
                tracing::debug!(sid = %info.sid, ping_interval = info.ping_interval, "Status channel open");
                Ok(vec![EnginePacket::Message(SocketPacket::Connect(None)).encode()])
            }
            EnginePacket::Ping => Ok(vec![EnginePacket::Pong.encode()]),
            EnginePacket::Close | EnginePacket::Message(SocketPacket::Disconnect) => {
                Err(ChannelError::Closed)
            }
            EnginePacket::Message(SocketPacket::ConnectError(payload)) => {
                Err(ChannelError::Connect(payload.to_string()))
            }
            EnginePacket::Message(SocketPacket::Event { name, args }) if name == STATUS_EVENT => {
                let payload = args.into_iter().next().unwrap_or_default();
                let update: StatusUpdate = serde_json::from_value(payload)
                    .map_err(|e| ChannelError::protocol(frame, e.to_string()))?;
                self.deliver(update).await?;
                Ok(Vec::new())
            }
            EnginePacket::Message(SocketPacket::Event { name, .. }) => {
                tracing::trace!(%name, "Ignoring event");
                Ok(Vec::new())
            }
            EnginePacket::Message(SocketPacket::Connect(_))
            | EnginePacket::Pong
            | EnginePacket::Upgrade
            | EnginePacket::Noop => Ok(Vec::new()),
        }
    }

    async fn deliver(&mut self, update: StatusUpdate) -> Result<(), ChannelError> {
        tracing::info!(status = %update.status, message = %update.message, "Status update");
        if let Some(previous) = self.sticky.take() {
            self.notifier.dismiss(previous);
        }
        let id = self.notifier.notify(update.to_notification());
        if update.status.is_in_progress() {
            self.sticky = Some(id);
        }
        self.updates
            .send(update)
            .await
            .map_err(|_| ChannelError::Closed)
    }
}

impl fmt::Debug for StatusRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusRelay")
            .field("sticky", &self.sticky)
            .finish_non_exhaustive()
    }
}

/// Running status channel connection
#[derive(Debug)]
pub struct StatusChannel {
    updates: mpsc::Receiver<StatusUpdate>,
    task: Option<JoinHandle<Result<(), ChannelError>>>,
}

impl StatusChannel {
    /// Connect to the backend at `base` and start relaying
    ///
    /// # Errors
    /// - `ChannelError::Url` if no socket url can be derived
    /// - `ChannelError::Connect` if the websocket handshake fails
    pub async fn connect(base: &Url, notifier: Arc<dyn Notifier>) -> Result<Self, ChannelError> {
        let url = socket_url(base)?;
        tracing::info!(%url, "Connecting status channel");
        let (socket, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;

        let (tx, rx) = mpsc::channel(64);
        let mut relay = StatusRelay::new(notifier, tx);
        let (mut sink, mut stream) = socket.split();

        let task = tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                let message = message.map_err(|e| ChannelError::Connect(e.to_string()))?;
                let frame = match message {
                    Message::Text(text) => text,
                    Message::Close(_) => break,
                    _ => continue,
                };
                match relay.handle(&frame).await {
                    Ok(replies) => {
                        for reply in replies {
                            sink.send(Message::Text(reply))
                                .await
                                .map_err(|e| ChannelError::Connect(e.to_string()))?;
                        }
                    }
                    Err(ChannelError::Closed) => break,
                    Err(error @ ChannelError::Protocol { .. }) => {
                        tracing::warn!(%error, "Skipping malformed frame");
                    }
                    Err(error) => return Err(error),
                }
            }
            tracing::info!("Status channel closed");
            Ok(())
        });

        Ok(Self {
            updates: rx,
            task: Some(task),
        })
    }

    /// Next update, `None` once the channel closed
    pub async fn recv(&mut self) -> Option<StatusUpdate> {
        self.updates.recv().await
    }

    /// Stop relaying
    pub fn close(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Wait for the connection task to end
    ///
    /// # Errors
    /// The error that ended the connection, or `ChannelError::Closed` if the
    /// task was aborted.
    pub async fn join(mut self) -> Result<(), ChannelError> {
        self.updates.close();
        match self.task.take() {
            Some(task) => task.await.map_err(|_| ChannelError::Closed)?,
            None => Ok(()),
        }
    }
}

impl Drop for StatusChannel {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
