//! CLI error types

use deployer_form::FormError;
use std::path::PathBuf;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for the config
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Deployment input file errors
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// File could not be read
    #[error("cannot read input file {}: {source}", path.display())]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON input did not parse
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML input did not parse
    #[error("invalid TOML input: {0}")]
    Toml(#[from] toml::de::Error),

    /// Values do not fit the form
    #[error(transparent)]
    Form(#[from] FormError),
}
