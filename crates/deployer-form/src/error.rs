//! Error types for the form model

/// Errors raised while building or mutating a form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// Field names identify feedback slots and must not be empty
    #[error("field name must not be empty")]
    EmptyFieldName,

    /// Field is not part of the form
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Two fields with the same name in one form
    #[error("duplicate field: {0}")]
    DuplicateField(String),

    /// Pattern constraint does not compile
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Mode tag is neither "simple" nor "expert"
    #[error("unknown validation mode: {0}")]
    UnknownMode(String),

    /// Form values cannot be turned into a deployment payload
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
