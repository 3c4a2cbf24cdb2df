//! Deployer Form - field and form model
//!
//! Everything the validation pipeline needs to know about a form
//! without touching the network:
//! - Fields with their validation state and last message
//! - Forms tagged with a validation mode ("simple" | "expert")
//! - Local constraint checks (required, type, pattern, range, length)
//! - Attribution of remote error strings to fields
//! - Typed deployment payloads and the domain rules the backend applies
//!
//! # Example
//!
//! ```rust
//! use deployer_form::{check_form, Form};
//!
//! let mut form = Form::expert();
//! form.set_value("alertEmail", "not-an-email").unwrap();
//!
//! let violations = check_form(&form);
//! assert!(violations
//!     .iter()
//!     .any(|v| v.message == "Please enter a valid email address"));
//! ```

#![warn(unreachable_pub)]

pub mod attribution;
pub mod constraints;
pub mod deployment;
pub mod error;
pub mod field;
pub mod form;

pub use attribution::{attribute_errors, message_for_field, Attribution};
pub use constraints::{check_form, check_value, ConstraintViolation, ViolationKind};
pub use deployment::{
    DeploymentRequest, ExpertDeployment, MonitoringSettings, NetworkSettings, NodeSettings,
    SimpleDeployment,
};
pub use error::FormError;
pub use field::{Constraints, Field, FieldName, FieldState, InputKind, Pattern};
pub use form::{Form, FormSnapshot, ValidationMode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
