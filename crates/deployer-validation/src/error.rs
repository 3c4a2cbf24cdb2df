//! Error types for the validation pipeline
//!
//! Three families, matching how each is surfaced:
//! - local constraint violations block submission and show inline
//! - remote rejections are data (`ValidationResponse`), not errors
//! - transport failures become transient notifications

use deployer_form::{ConstraintViolation, FormError};

/// Failure to reach the backend or make sense of its answer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection, TLS or timeout failure
    #[error("request failed: {0}")]
    Request(String),

    /// Non-2xx status
    #[error("server responded with status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error text extracted from the body, or the body itself
        message: String,
    },

    /// Body is not the expected JSON
    #[error("malformed response: {0}")]
    Decode(String),

    /// Peer went away before answering
    #[error("connection closed")]
    Closed,
}

impl TransportError {
    /// Status code, when the server answered at all
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a manual retry could plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) | Self::Closed => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) => false,
        }
    }
}

/// Errors from coordinator operations
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// Field lookup or mutation failed
    #[error("form error: {0}")]
    Form(#[from] FormError),

    /// The view was unmounted
    #[error("coordinator is unmounted")]
    Unmounted,
}

/// Errors from whole-form submission
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Local checks failed; nothing was sent
    #[error("{} field(s) failed local checks", .0.len())]
    ConstraintViolations(Vec<ConstraintViolation>),

    /// Form values do not make a payload
    #[error("form error: {0}")]
    Form(#[from] FormError),

    /// Submission endpoint unreachable or rejected the request
    #[error("submission failed: {0}")]
    Transport(#[from] TransportError),

    /// Another submission has not finished yet
    #[error("a submission is already in flight")]
    InFlight,

    /// The view was unmounted
    #[error("coordinator is unmounted")]
    Unmounted,
}

impl SubmitError {
    /// True when the failure was local and no network call was made
    #[inline]
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::ConstraintViolations(_) | Self::Form(_) | Self::InFlight | Self::Unmounted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(TransportError::Request("timeout".into()).is_retryable());
        assert!(TransportError::Status {
            status: 503,
            message: "busy".into()
        }
        .is_retryable());
        assert!(!TransportError::Status {
            status: 400,
            message: "bad".into()
        }
        .is_retryable());
        assert!(!TransportError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn status_message_in_display() {
        let err = TransportError::Status {
            status: 500,
            message: "quota exceeded".into(),
        };
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn local_errors_classified() {
        assert!(SubmitError::ConstraintViolations(vec![]).is_local());
        assert!(!SubmitError::Transport(TransportError::Closed).is_local());
    }
}
