//! HTTP client configuration

use crate::error::ClientError;
use std::time::Duration;
use url::Url;

/// Default backend address
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which endpoint answers field validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationEndpoint {
    /// `/api/validate/{mode}`, answering `{valid, errors}`
    #[default]
    ModeScoped,
    /// `/validate_config`, answering `{valid, error}`
    SingleField,
}

/// Connection settings for [`DeployerClient`](crate::DeployerClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    timeout: Duration,
    user_agent: String,
    validation_endpoint: ValidationEndpoint,
}

impl ClientConfig {
    /// Settings for a backend at `base_url`
    ///
    /// # Errors
    /// - `ClientError::Url` if the url does not parse
    /// - `ClientError::Scheme` for anything but http(s)
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut url = Url::parse(base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Scheme(url.scheme().to_string()));
        }
        // Relative joins only append when the base ends in a slash.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            base_url: url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("deployer-client/{}", env!("CARGO_PKG_VERSION")),
            validation_endpoint: ValidationEndpoint::default(),
        })
    }

    /// Override the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the user agent
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Choose the validation endpoint
    #[must_use]
    pub fn with_validation_endpoint(mut self, endpoint: ValidationEndpoint) -> Self {
        self.validation_endpoint = endpoint;
        self
    }

    /// Backend base url, always ending in `/`
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Endpoint used for field validation
    #[inline]
    #[must_use]
    pub fn validation_endpoint(&self) -> ValidationEndpoint {
        self.validation_endpoint
    }

    /// User agent header value
    #[inline]
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
