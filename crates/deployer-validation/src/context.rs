//! UI context injected into the coordinator
//!
//! The coordinator never reaches for global state. Everything it shows goes
//! through the two seams held by [`UiContext`]:
//! - [`FeedbackSink`]: per-field feedback slots keyed by field name, plus a
//!   form-level error area
//! - [`Notifier`]: transient, dismissible notifications

use deployer_form::{FieldName, FieldState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ulid::Ulid;

/// What a field's feedback slot should display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFeedback {
    /// Validation state
    pub state: FieldState,
    /// Error text, present when invalid
    pub message: Option<String>,
}

impl FieldFeedback {
    /// Feedback for a state without text
    #[inline]
    #[must_use]
    pub fn state(state: FieldState) -> Self {
        Self {
            state,
            message: None,
        }
    }

    /// Invalid feedback with text
    #[inline]
    #[must_use]
    pub fn invalid(message: Option<String>) -> Self {
        Self {
            state: FieldState::Invalid,
            message,
        }
    }

    /// CSS class for the slot
    #[inline]
    #[must_use]
    pub fn css_class(&self) -> Option<&'static str> {
        self.state.css_class()
    }
}

/// Per-field and form-level feedback surface
///
/// Implementations must not call back into the coordinator; they run while
/// the field's sequence bookkeeping is held.
pub trait FeedbackSink: Send + Sync {
    /// Update the slot associated with `field`
    fn show_field(&self, field: &FieldName, feedback: &FieldFeedback);

    /// Replace the form-level error list (empty clears it)
    fn show_form_errors(&self, errors: &[String]);
}

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Neutral information
    Info,
    /// Something finished well
    Success,
    /// Worth a look, nothing failed
    Warning,
    /// Something failed
    Error,
    /// Work in progress; stays until replaced or dismissed
    Progress,
}

/// Notification identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub Ulid);

impl NotificationId {
    /// Generate new notification ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transient, user-visible message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Text shown to the user
    pub message: String,
    /// Kept until dismissed instead of timing out
    pub sticky: bool,
}

impl Notification {
    /// Create a notification; progress notifications are sticky
    #[must_use]
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            sticky: level == NotificationLevel::Progress,
        }
    }

    /// Informational notification
    #[inline]
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    /// Success notification
    #[inline]
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    /// Error notification
    #[inline]
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    /// Sticky progress notification
    #[inline]
    #[must_use]
    pub fn progress(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Progress, message)
    }
}

/// Sink for transient notifications
pub trait Notifier: Send + Sync {
    /// Show a notification, returning its handle
    fn notify(&self, notification: Notification) -> NotificationId;

    /// Dismiss a notification early; unknown ids are ignored
    fn dismiss(&self, id: NotificationId);
}

/// Everything the coordinator may touch on screen
#[derive(Clone)]
pub struct UiContext {
    feedback: Arc<dyn FeedbackSink>,
    notifier: Arc<dyn Notifier>,
}

impl UiContext {
    /// Bundle a feedback surface and a notifier
    #[inline]
    #[must_use]
    pub fn new(feedback: Arc<dyn FeedbackSink>, notifier: Arc<dyn Notifier>) -> Self {
        Self { feedback, notifier }
    }

    /// Feedback surface
    #[inline]
    #[must_use]
    pub fn feedback(&self) -> &dyn FeedbackSink {
        self.feedback.as_ref()
    }

    /// Notifier
    #[inline]
    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }
}

impl std::fmt::Debug for UiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiContext").finish_non_exhaustive()
    }
}
