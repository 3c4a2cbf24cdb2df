//! Deployer Validation - the field validation coordinator
//!
//! Turns bursty edits into at most one remote validation round-trip per
//! quiet period per field, and applies results guarded by a per-field
//! sequence number so a slow response never overwrites a fresher one.
//!
//! The coordinator is mounted with an explicit [`UiContext`] (feedback
//! surface and notifier) and a [`RemoteValidator`]; unmounting cancels every
//! pending debounce timer.
//!
//! # Example
//!
//! ```rust,ignore
//! use deployer_validation::{CoordinatorConfig, UiContext, ValidationCoordinator};
//! use deployer_form::Form;
//!
//! let coordinator = ValidationCoordinator::mount(
//!     Form::simple(),
//!     validator,
//!     UiContext::new(feedback, notifier),
//!     CoordinatorConfig::default(),
//! );
//! coordinator.on_field_changed("resourceGroup", "prod-nodes")?;
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod context;
pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod protocol;
pub mod remote;

pub use config::CoordinatorConfig;
pub use context::{
    FeedbackSink, FieldFeedback, Notification, NotificationId, NotificationLevel, Notifier,
    UiContext,
};
pub use coordinator::{Application, ValidationCoordinator};
pub use debounce::Debouncer;
pub use error::{CoordinatorError, SubmitError, TransportError};
pub use protocol::{ValidationRequest, ValidationResponse};
pub use remote::{DeploymentSubmitter, RemoteValidator, SubmitReceipt};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring a coordinator
    pub use crate::{
        CoordinatorConfig, DeploymentSubmitter, FeedbackSink, Notifier, RemoteValidator,
        UiContext, ValidationCoordinator,
    };
}
