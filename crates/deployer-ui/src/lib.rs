//! Deployer UI - headless view state
//!
//! Concrete implementations of the coordinator's display seams plus the
//! page-level state around the deployment form:
//!
//! - [`NotificationCenter`]: transient alerts with auto-dismiss ([`Notifier`])
//! - [`FeedbackBoard`]: per-field feedback slots ([`FeedbackSink`])
//! - [`ViewState`]: theme, sidebars, steps, deployment mode, action feedback
//! - [`DecisionTree`], [`CommandPalette`], [`ChatTranscript`]
//!
//! [`Notifier`]: deployer_validation::Notifier
//! [`FeedbackSink`]: deployer_validation::FeedbackSink

#![warn(unreachable_pub)]

pub mod chat;
pub mod error;
pub mod feedback;
pub mod notifications;
pub mod palette;
pub mod tree;
pub mod view;

pub use chat::{ChatMessage, ChatTranscript, Speaker};
pub use error::UiError;
pub use feedback::{FeedbackBoard, FeedbackSlot};
pub use notifications::{NotificationCenter, DEFAULT_TTL};
pub use palette::{CommandPalette, DEFAULT_COMMANDS};
pub use tree::{DecisionTree, TreeNode};
pub use view::{Theme, ViewState};

use deployer_form::Form;
use deployer_validation::UiContext;
use std::sync::Arc;
use std::time::Duration;

/// Feedback board and notification center wired as one [`UiContext`]
#[derive(Debug, Clone)]
pub struct Screen {
    /// Field feedback
    pub board: Arc<FeedbackBoard>,
    /// Transient alerts
    pub notifications: NotificationCenter,
}

impl Screen {
    /// Screen for `form` with the given alert TTL
    #[must_use]
    pub fn for_form(form: &Form, ttl: Duration) -> Self {
        Self {
            board: Arc::new(FeedbackBoard::for_form(form)),
            notifications: NotificationCenter::new(ttl),
        }
    }

    /// Context to mount a coordinator with
    #[must_use]
    pub fn context(&self) -> UiContext {
        UiContext::new(self.board.clone(), Arc::new(self.notifications.clone()))
    }
}
