//! Deployer Client - backend access for the deployer
//!
//! - [`DeployerClient`]: reqwest client implementing the coordinator's
//!   [`RemoteValidator`](deployer_validation::RemoteValidator) and
//!   [`DeploymentSubmitter`](deployer_validation::DeploymentSubmitter) seams,
//!   plus the prediction and chat endpoints
//! - [`StatusChannel`]: Socket.IO push channel relaying `status_update` events
//! - [`ProgressSimulator`]: paced deployment stages shown after a submission

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod http;
pub mod progress;
pub mod socketio;
pub mod status;

pub use config::{ClientConfig, ValidationEndpoint, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{ChannelError, ClientError};
pub use http::{describe_config_check, DeployerClient, Prediction};
pub use progress::{ProgressSimulator, ProgressStage, STAGES};
pub use status::{socket_url, StatusChannel, StatusKind, StatusRelay, StatusUpdate};
