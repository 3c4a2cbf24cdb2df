//! Engine.IO v4 / Socket.IO v5 text framing
//!
//! Only what the status channel needs over a websocket transport: the open
//! handshake, heartbeats, namespace connect and JSON events. Binary
//! attachments are rejected.
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,"pingTimeout":20000}   open
//! 2 / 3                                                    ping / pong
//! 40                                                       connect "/"
//! 42["status_update",{"status":"ok","message":".."}]       event
//! ```

use crate::error::ChannelError;
use serde::Deserialize;
use serde_json::Value;

/// Handshake payload of an open packet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    /// Session id
    pub sid: String,
    /// Server heartbeat interval in milliseconds
    #[serde(default)]
    pub ping_interval: u64,
    /// Grace period after a missed heartbeat in milliseconds
    #[serde(default)]
    pub ping_timeout: u64,
}

/// Socket.IO packet carried inside an Engine.IO message
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    /// Namespace joined, with optional payload
    Connect(Option<Value>),
    /// Namespace left
    Disconnect,
    /// Named event with JSON arguments
    Event {
        /// Event name
        name: String,
        /// Remaining array elements
        args: Vec<Value>,
    },
    /// Namespace join refused
    ConnectError(Value),
}

/// One websocket text frame
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    /// Handshake
    Open(OpenInfo),
    /// Transport closing
    Close,
    /// Heartbeat request
    Ping,
    /// Heartbeat reply
    Pong,
    /// Application packet
    Message(SocketPacket),
    /// Transport upgrade
    Upgrade,
    /// No-op
    Noop,
}

impl EnginePacket {
    /// Parse a text frame
    ///
    /// # Errors
    /// - `ChannelError::Protocol` on unknown types or malformed payloads
    pub fn decode(frame: &str) -> Result<Self, ChannelError> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| ChannelError::protocol(frame, "empty frame"))?;
        let rest = chars.as_str();

        match kind {
            '0' => serde_json::from_str(rest)
                .map(Self::Open)
                .map_err(|e| ChannelError::protocol(frame, e.to_string())),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping),
            '3' => Ok(Self::Pong),
            '4' => SocketPacket::decode(rest)
                .map(Self::Message)
                .map_err(|reason| ChannelError::protocol(frame, reason)),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(ChannelError::protocol(
                frame,
                format!("unknown packet type '{other}'"),
            )),
        }
    }

    /// Render as a text frame
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Open(info) => format!(
                r#"0{{"sid":{},"pingInterval":{},"pingTimeout":{}}}"#,
                Value::String(info.sid.clone()),
                info.ping_interval,
                info.ping_timeout
            ),
            Self::Close => "1".to_string(),
            Self::Ping => "2".to_string(),
            Self::Pong => "3".to_string(),
            Self::Message(packet) => format!("4{}", packet.encode()),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        }
    }
}

impl SocketPacket {
    fn decode(body: &str) -> Result<Self, String> {
        let mut chars = body.chars();
        let kind = chars.next().ok_or("empty socket packet")?;
        let rest = skip_ack_id(skip_namespace(chars.as_str()));

        match kind {
            '0' if rest.is_empty() => Ok(Self::Connect(None)),
            '0' => serde_json::from_str(rest)
                .map(|v| Self::Connect(Some(v)))
                .map_err(|e| e.to_string()),
            '1' => Ok(Self::Disconnect),
            '2' => {
                let array: Vec<Value> = serde_json::from_str(rest).map_err(|e| e.to_string())?;
                let mut items = array.into_iter();
                match items.next() {
                    Some(Value::String(name)) => Ok(Self::Event {
                        name,
                        args: items.collect(),
                    }),
                    _ => Err("event without a name".to_string()),
                }
            }
            '4' => serde_json::from_str(rest)
                .map(Self::ConnectError)
                .map_err(|e| e.to_string()),
            '3' | '5' | '6' => Err("acks and binary packets are not supported".to_string()),
            other => Err(format!("unknown socket packet type '{other}'")),
        }
    }

    fn encode(&self) -> String {
        match self {
            Self::Connect(None) => "0".to_string(),
            Self::Connect(Some(payload)) => format!("0{payload}"),
            Self::Disconnect => "1".to_string(),
            Self::Event { name, args } => {
                let mut array = Vec::with_capacity(args.len() + 1);
                array.push(Value::String(name.clone()));
                array.extend(args.iter().cloned());
                format!("2{}", Value::Array(array))
            }
            Self::ConnectError(payload) => format!("4{payload}"),
        }
    }
}

/// Drop a `/namespace,` prefix
fn skip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        body.find(',').map_or("", |i| &body[i + 1..])
    } else {
        body
    }
}

fn skip_ack_id(body: &str) -> &str {
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}
