//! Validation request and response types

use deployer_form::{FieldName, FormSnapshot, ValidationMode};
use serde::{Deserialize, Serialize};

/// Snapshot sent for one settled field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    /// Mode of the form, selects the mode-scoped endpoint
    pub mode: ValidationMode,
    /// Field whose debounce settled
    pub field: FieldName,
    /// Per-field sequence number, starting at 1
    pub sequence: u64,
    /// All form values at dispatch time
    pub config: FormSnapshot,
}

/// Backend verdict
///
/// Accepts both the list form `{valid, errors: [..]}` and the single-field
/// form `{valid, error}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawValidationResponse")]
pub struct ValidationResponse {
    /// Whether the configuration was accepted
    pub valid: bool,
    /// Error messages in backend order
    pub errors: Vec<String>,
}

impl ValidationResponse {
    /// Accepting response
    #[inline]
    #[must_use]
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Rejecting response with messages
    #[must_use]
    pub fn invalid<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            valid: false,
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    /// First error, used by single-field displays
    #[inline]
    #[must_use]
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

#[derive(Deserialize)]
struct RawValidationResponse {
    valid: bool,
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

impl From<RawValidationResponse> for ValidationResponse {
    fn from(raw: RawValidationResponse) -> Self {
        let mut errors = raw.errors;
        if let Some(error) = raw.error {
            errors.push(error);
        }
        Self {
            valid: raw.valid,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_form() {
        let response: ValidationResponse =
            serde_json::from_str(r#"{"valid": false, "errors": ["a", "b"]}"#).unwrap();
        assert_eq!(response, ValidationResponse::invalid(["a", "b"]));
    }

    #[test]
    fn single_field_form() {
        let response: ValidationResponse =
            serde_json::from_str(r#"{"valid": false, "error": "Invalid JSON format"}"#).unwrap();
        assert_eq!(response.first_error(), Some("Invalid JSON format"));
    }

    #[test]
    fn bare_valid() {
        let response: ValidationResponse = serde_json::from_str(r#"{"valid": true}"#).unwrap();
        assert_eq!(response, ValidationResponse::valid());
    }

    #[test]
    fn missing_valid_is_malformed() {
        assert!(serde_json::from_str::<ValidationResponse>(r#"{"errors": []}"#).is_err());
    }
}
