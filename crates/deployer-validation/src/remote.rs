//! Remote collaborators
//!
//! The coordinator talks to the backend only through these traits. The
//! HTTP implementations live in `deployer-client`.

use crate::error::TransportError;
use crate::protocol::{ValidationRequest, ValidationResponse};
use deployer_form::DeploymentRequest;
use serde::{Deserialize, Serialize};

/// Remote validation endpoint
///
/// Calls are never cancelled by the coordinator; a superseded call simply
/// has its result ignored when it lands.
#[async_trait::async_trait]
pub trait RemoteValidator: Send + Sync {
    /// Validate a form snapshot
    async fn validate(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationResponse, TransportError>;
}

/// Opaque answer from the deployment endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmitReceipt(pub serde_json::Value);

impl SubmitReceipt {
    /// Human-readable summary, if the backend sent one
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        ["message", "result", "status"]
            .iter()
            .find_map(|key| self.0.get(*key).and_then(serde_json::Value::as_str))
    }
}

/// Deployment submission endpoint
#[async_trait::async_trait]
pub trait DeploymentSubmitter: Send + Sync {
    /// Submit a deployment payload
    async fn submit(&self, request: &DeploymentRequest) -> Result<SubmitReceipt, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_message_prefers_message_key() {
        let receipt = SubmitReceipt(serde_json::json!({
            "result": "queued",
            "message": "Deployment started"
        }));
        assert_eq!(receipt.message(), Some("Deployment started"));

        let receipt = SubmitReceipt(serde_json::json!({ "result": "queued" }));
        assert_eq!(receipt.message(), Some("queued"));

        assert_eq!(SubmitReceipt::default().message(), None);
    }
}
