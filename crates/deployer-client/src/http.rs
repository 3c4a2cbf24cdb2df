//! reqwest client for the deployer backend
//!
//! Every call is a JSON POST. Non-2xx answers become
//! `TransportError::Status` carrying the backend's error text; bodies that do
//! not decode become `TransportError::Decode`.

use crate::config::{ClientConfig, ValidationEndpoint};
use crate::error::{transport, ClientError};
use deployer_form::DeploymentRequest;
use deployer_validation::{
    DeploymentSubmitter, RemoteValidator, SubmitReceipt, TransportError, ValidationRequest,
    ValidationResponse,
};
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Deployment submission path
pub const DEPLOY_PATH: &str = "deployer/deploy";

/// Answer of the prediction endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    /// Model output
    Value {
        /// Predicted value, passed through as sent
        prediction: serde_json::Value,
    },
    /// The configuration could not be scored
    Rejected {
        /// Reason given by the backend
        error: String,
    },
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value { prediction } => match prediction {
                serde_json::Value::String(s) => write!(f, "Prediction: {s}"),
                other => write!(f, "Prediction: {other}"),
            },
            Self::Rejected { error } => write!(f, "Prediction error: {error}"),
        }
    }
}

/// One-line summary of a raw configuration check
#[must_use]
pub fn describe_config_check(response: &ValidationResponse) -> String {
    if response.valid {
        "Configuration is valid.".to_string()
    } else {
        format!("Invalid configuration: {}", response.errors.join("; "))
    }
}

#[derive(Deserialize)]
struct ChatReply {
    response: String,
}

#[derive(Deserialize)]
struct ExecuteReply {
    result: String,
}

/// Deployer backend client
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct DeployerClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    http: reqwest::Client,
}

impl DeployerClient {
    /// Build a client
    ///
    /// # Errors
    /// - `ClientError::Build` if the HTTP stack cannot be initialised
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner { config, http }),
        })
    }

    /// Client settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Check raw configuration text via `/validate_config`
    ///
    /// # Errors
    /// Transport failures as described at module level.
    pub async fn validate_config(&self, config: &str) -> Result<ValidationResponse, TransportError> {
        self.post("validate_config", &serde_json::json!({ "config": config }))
            .await
    }

    /// Score configuration text via `/predict`
    ///
    /// # Errors
    /// Transport failures as described at module level.
    pub async fn predict(&self, config: &str) -> Result<Prediction, TransportError> {
        self.post("predict", &serde_json::json!({ "config": config }))
            .await
    }

    /// Send a chat message and return the reply text
    ///
    /// # Errors
    /// Transport failures as described at module level.
    pub async fn chat(&self, message: &str) -> Result<String, TransportError> {
        let reply: ChatReply = self
            .post("chat", &serde_json::json!({ "message": message }))
            .await?;
        Ok(reply.response)
    }

    /// Run a named backend action against `config` and return its result text
    ///
    /// Sent as a url-encoded form with `action` and `config` fields.
    ///
    /// # Errors
    /// Transport failures as described at module level.
    pub async fn execute(&self, action: &str, config: &str) -> Result<String, TransportError> {
        let reply: ExecuteReply = self
            .send("execute", |request| {
                request.form(&[("action", action), ("config", config)])
            })
            .await?;
        Ok(reply.result)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(path, |request| request.json(body)).await
    }

    async fn send<T, F>(&self, path: &str, body: F) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
        F: FnOnce(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    {
        let url = self
            .inner
            .config
            .base_url()
            .join(path)
            .map_err(|e| TransportError::Request(e.to_string()))?;
        tracing::debug!(%url, "POST");

        let response = body(self.inner.http.post(url))
            .send()
            .await
            .map_err(|e| transport(&e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| transport(&e))?;

        if !status.is_success() {
            let message = error_message(&bytes)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default();
            tracing::warn!(path, status = status.as_u16(), %message, "Backend rejected request");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(path, error = %e, "Malformed response body");
            TransportError::Decode(e.to_string())
        })
    }
}

impl fmt::Debug for DeployerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployerClient")
            .field("base_url", &self.inner.config.base_url().as_str())
            .finish_non_exhaustive()
    }
}

/// Error text from a failure body: `error`, `message`, joined `errors`, or the raw text
fn error_message(body: &[u8]) -> Option<String> {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(text) = json.get(key).and_then(serde_json::Value::as_str) {
                return Some(text.to_string());
            }
        }
        if let Some(errors) = json.get("errors").and_then(serde_json::Value::as_array) {
            let joined: Vec<&str> = errors.iter().filter_map(serde_json::Value::as_str).collect();
            if !joined.is_empty() {
                return Some(joined.join("; "));
            }
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[async_trait::async_trait]
impl RemoteValidator for DeployerClient {
    async fn validate(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationResponse, TransportError> {
        let path = match self.inner.config.validation_endpoint() {
            ValidationEndpoint::ModeScoped => format!("api/validate/{}", request.mode.as_str()),
            ValidationEndpoint::SingleField => "validate_config".to_string(),
        };
        tracing::debug!(field = %request.field, sequence = request.sequence, %path, "Remote validation");
        self.post(&path, &serde_json::json!({ "config": request.config }))
            .await
    }
}

#[async_trait::async_trait]
impl DeploymentSubmitter for DeployerClient {
    async fn submit(&self, request: &DeploymentRequest) -> Result<SubmitReceipt, TransportError> {
        self.post(DEPLOY_PATH, request).await
    }
}
