//! Deployment input files
//!
//! A JSON or TOML document naming the mode and the field values:
//!
//! ```toml
//! mode = "expert"
//!
//! [values]
//! vnetName = "chain-vnet"
//! subnetPrefix = "10.0.0.0/24"
//! nodeCount = 3
//! monitoringEnabled = true
//! ```
//!
//! Values may be written as strings, numbers or booleans; the form only
//! ever sees their text.

use crate::error::InputError;
use deployer_form::{Form, ValidationMode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One field value as written in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    /// `true` / `false`
    Flag(bool),
    /// Whole number
    Integer(i64),
    /// Decimal number
    Float(f64),
    /// Anything else
    Text(String),
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// Parsed input document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentInput {
    /// Form mode, simple when absent
    #[serde(default)]
    pub mode: Option<ValidationMode>,
    /// Field values in file order
    #[serde(default)]
    pub values: IndexMap<String, InputValue>,
}

impl DeploymentInput {
    /// Parse JSON text
    ///
    /// # Errors
    /// - `InputError::Json` on malformed input
    pub fn from_json(text: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// - `InputError::Toml` on malformed input
    pub fn from_toml(text: &str) -> Result<Self, InputError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a file, choosing the format by extension (`.json`, else TOML)
    ///
    /// # Errors
    /// - `InputError::Read` if the file cannot be read
    /// - `InputError::Json` / `InputError::Toml` on malformed input
    pub fn read(path: &Path) -> Result<Self, InputError> {
        let text = std::fs::read_to_string(path).map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_toml(&text)
        }
    }

    /// Mode after applying an override
    #[must_use]
    pub fn effective_mode(&self, mode_override: Option<ValidationMode>) -> ValidationMode {
        mode_override.or(self.mode).unwrap_or_default()
    }

    /// Build the form for the effective mode and fill in the values
    ///
    /// # Errors
    /// - `InputError::Form` if a value names a field the form lacks
    pub fn into_form(self, mode_override: Option<ValidationMode>) -> Result<Form, InputError> {
        let mut form = Form::for_mode(self.effective_mode(mode_override));
        for (name, value) in self.values {
            form.set_value(&name, value.to_string())?;
        }
        Ok(form)
    }
}
