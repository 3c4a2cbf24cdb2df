//! Field model
//!
//! A field is one user-editable input. It carries:
//! - its name (unique within a form, also the key of its feedback slot)
//! - the current raw value
//! - the validation state and the last message shown for it
//! - the constraints checked locally before submission

use crate::error::FormError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::sync::Arc;

/// Field identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldName(String);

impl FieldName {
    /// Create a field name
    ///
    /// # Errors
    /// - `FormError::EmptyFieldName` if `name` is empty or whitespace
    pub fn new(name: impl Into<String>) -> Result<Self, FormError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FormError::EmptyFieldName);
        }
        Ok(Self(name))
    }

    /// Borrow the name as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FieldName {
    type Error = FormError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FieldName> for String {
    fn from(name: FieldName) -> Self {
        name.0
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation state of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldState {
    /// Never validated
    #[default]
    Untouched,
    /// A remote validation round-trip is in flight
    Pending,
    /// Last applied result accepted the value
    Valid,
    /// Last applied result rejected the value
    Invalid,
}

impl FieldState {
    /// CSS class for the feedback element, if any
    #[inline]
    #[must_use]
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            Self::Untouched => None,
            Self::Pending => Some("is-pending"),
            Self::Valid => Some("is-valid"),
            Self::Invalid => Some("is-invalid"),
        }
    }
}

/// Input type, mirroring the browser `type` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Free text
    #[default]
    Text,
    /// Email address
    Email,
    /// Numeric input (min/max apply)
    Number,
    /// Choice among fixed options
    Select,
    /// Checkbox, value is "true" or "false"
    Checkbox,
}

/// Compiled `pattern` constraint
///
/// Matches the whole value, as the browser anchors `pattern` attributes.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Arc<Regex>,
}

impl Pattern {
    /// Compile a pattern
    ///
    /// # Errors
    /// - `FormError::InvalidPattern` if the expression does not compile
    pub fn new(source: &str) -> Result<Self, FormError> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
            FormError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            source: source.to_string(),
            regex: Arc::new(regex),
        })
    }

    /// Pattern source as written
    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the whole value matches
    #[inline]
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Local constraints of a field
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// Value must not be empty
    pub required: bool,
    /// Input type
    pub kind: InputKind,
    /// Whole-value pattern
    pub pattern: Option<Pattern>,
    /// Hint appended to pattern mismatch messages
    pub title: Option<String>,
    /// Lower bound for numbers
    pub min: Option<f64>,
    /// Upper bound for numbers
    pub max: Option<f64>,
    /// Granularity for numbers, counted from `min` (or 0)
    pub step: Option<f64>,
    /// Minimum length in characters
    pub min_length: Option<usize>,
    /// Maximum length in characters
    pub max_length: Option<usize>,
    /// Allowed values for selects
    pub options: Vec<String>,
}

impl Constraints {
    /// No constraints on a text input
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// With input type
    #[inline]
    #[must_use]
    pub fn kind(mut self, kind: InputKind) -> Self {
        self.kind = kind;
        self
    }

    /// With compiled pattern and optional hint
    #[inline]
    #[must_use]
    pub fn pattern(mut self, pattern: Pattern, title: Option<&str>) -> Self {
        self.pattern = Some(pattern);
        self.title = title.map(str::to_string);
        self
    }

    /// With numeric range; the step defaults to 1 as on a number input
    #[inline]
    #[must_use]
    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.kind = InputKind::Number;
        self.min = min;
        self.max = max;
        self.step = Some(1.0);
        self
    }

    /// With numeric step, `None` for any value
    #[inline]
    #[must_use]
    pub fn step(mut self, step: Option<f64>) -> Self {
        self.step = step;
        self
    }

    /// With length bounds
    #[inline]
    #[must_use]
    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    /// As a select over fixed options
    #[must_use]
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kind = InputKind::Select;
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// One tracked input
#[derive(Debug, Clone)]
pub struct Field {
    name: FieldName,
    label: String,
    value: String,
    state: FieldState,
    message: Option<String>,
    constraints: Constraints,
}

impl Field {
    /// Create an untouched, empty field
    ///
    /// # Errors
    /// - `FormError::EmptyFieldName` if `name` is empty
    pub fn new(name: &str, label: &str, constraints: Constraints) -> Result<Self, FormError> {
        Ok(Self {
            name: FieldName::new(name)?,
            label: label.to_string(),
            value: String::new(),
            state: FieldState::Untouched,
            message: None,
            constraints,
        })
    }

    /// Build a field whose name is a known non-empty literal
    pub(crate) fn from_static(name: &'static str, label: &str, constraints: Constraints) -> Self {
        debug_assert!(!name.trim().is_empty());
        Self {
            name: FieldName(name.to_string()),
            label: label.to_string(),
            value: String::new(),
            state: FieldState::Untouched,
            message: None,
            constraints,
        }
    }

    /// With an initial value
    #[inline]
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// Human-readable label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current raw value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Current validation state
    #[inline]
    #[must_use]
    pub fn state(&self) -> FieldState {
        self.state
    }

    /// Message shown while invalid
    #[inline]
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Local constraints
    #[inline]
    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Replace the raw value; state is left to the validation pipeline
    #[inline]
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Record a validation outcome
    ///
    /// The message is kept only while the field is invalid.
    pub fn set_state(&mut self, state: FieldState, message: Option<String>) {
        self.state = state;
        self.message = if state == FieldState::Invalid {
            message
        } else {
            None
        };
    }
}
