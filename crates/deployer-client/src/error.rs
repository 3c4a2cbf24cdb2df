//! Client error types
//!
//! Request-level failures surface as `deployer_validation::TransportError`
//! so the coordinator can consume them directly. The types here cover
//! client construction and the push channel.

use deployer_validation::TransportError;

/// Failure building a client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Base URL does not parse or cannot be a base
    #[error("invalid base url: {0}")]
    Url(#[from] url::ParseError),

    /// Base URL is not http(s)
    #[error("unsupported url scheme '{0}'")]
    Scheme(String),

    /// TLS backend or builder failure
    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Push status channel errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// Could not derive the socket url
    #[error("invalid status channel url: {0}")]
    Url(String),

    /// Handshake or socket failure
    #[error("status channel connection failed: {0}")]
    Connect(String),

    /// Frame that does not follow the packet framing
    #[error("malformed packet '{packet}': {reason}")]
    Protocol {
        /// Offending frame, truncated
        packet: String,
        /// What was wrong with it
        reason: String,
    },

    /// Server closed the channel
    #[error("status channel closed")]
    Closed,
}

impl ChannelError {
    pub(crate) fn protocol(packet: &str, reason: impl Into<String>) -> Self {
        Self::Protocol {
            packet: packet.chars().take(64).collect(),
            reason: reason.into(),
        }
    }

    /// Whether reconnecting could help
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Closed)
    }
}

/// Map a reqwest failure onto the coordinator's transport error
pub(crate) fn transport(error: &reqwest::Error) -> TransportError {
    if error.is_decode() {
        TransportError::Decode(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}
