//! Deployer CLI
//!
//! Command-line front end over the deployer crates: offline checks,
//! backend validation through the coordinator, submission with progress,
//! the status push channel, prediction, chat and named actions.

#![warn(unreachable_pub)]

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;

pub use config::DeployerConfig;
pub use error::{ConfigError, InputError};
pub use input::{DeploymentInput, InputValue};
