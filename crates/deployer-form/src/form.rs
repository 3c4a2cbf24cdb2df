//! Form model and the two standard deployment forms

use crate::deployment::{
    CONSENSUS_PROTOCOLS, LOCATIONS, NODE_TYPES, RESOURCE_NAME_PATTERN, SUBNET_PREFIX_PATTERN,
    VM_SIZES,
};
use crate::error::FormError;
use crate::field::{Constraints, Field, FieldName, FieldState, InputKind, Pattern};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

static RESOURCE_NAME: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(RESOURCE_NAME_PATTERN).expect("resource name pattern compiles"));

static SUBNET_PREFIX: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(SUBNET_PREFIX_PATTERN).expect("subnet prefix pattern compiles"));

/// Validation mode tag shared by all fields of a form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Guided deployment: resource group, location, node type and size
    #[default]
    Simple,
    /// Full control over network, nodes and monitoring
    Expert,
}

impl ValidationMode {
    /// Tag as sent on the wire and used in mode-scoped paths
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Expert => "expert",
        }
    }
}

impl FromStr for ValidationMode {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::Simple),
            "expert" => Ok(Self::Expert),
            other => Err(FormError::UnknownMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field values captured at one instant, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSnapshot(IndexMap<String, String>);

impl FormSnapshot {
    /// Value of a field at capture time
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Number of captured fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was captured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in form order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for FormSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Ordered set of fields sharing one validation mode
#[derive(Debug, Clone)]
pub struct Form {
    mode: ValidationMode,
    fields: IndexMap<FieldName, Field>,
}

impl Form {
    /// Create an empty form
    #[inline]
    #[must_use]
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            fields: IndexMap::new(),
        }
    }

    /// Standard form for the given mode
    #[must_use]
    pub fn for_mode(mode: ValidationMode) -> Self {
        match mode {
            ValidationMode::Simple => Self::simple(),
            ValidationMode::Expert => Self::expert(),
        }
    }

    /// Simple-mode deployment form
    #[must_use]
    pub fn simple() -> Self {
        let fields = [
            Field::from_static(
                "resourceGroup",
                "Resource group",
                Constraints::new()
                    .required()
                    .pattern(
                        RESOURCE_NAME.clone(),
                        Some("letters, numbers, hyphens and underscores"),
                    )
                    .length(Some(3), Some(64)),
            ),
            Field::from_static(
                "location",
                "Location",
                Constraints::new().required().options(LOCATIONS.iter().copied()),
            ),
            Field::from_static(
                "nodeType",
                "Node type",
                Constraints::new().required().options(NODE_TYPES.iter().copied()),
            ),
            Field::from_static(
                "vmSize",
                "VM size",
                Constraints::new().required().options(VM_SIZES.iter().copied()),
            ),
        ];
        Self::from_fields(ValidationMode::Simple, fields)
    }

    /// Expert-mode deployment form
    #[must_use]
    pub fn expert() -> Self {
        let fields = [
            Field::from_static(
                "vnetName",
                "Virtual network name",
                Constraints::new()
                    .required()
                    .pattern(
                        RESOURCE_NAME.clone(),
                        Some("letters, numbers, hyphens and underscores"),
                    )
                    .length(Some(3), Some(64)),
            ),
            Field::from_static(
                "subnetPrefix",
                "Subnet prefix",
                Constraints::new()
                    .required()
                    .pattern(SUBNET_PREFIX.clone(), Some("e.g., 10.0.0.0/24")),
            ),
            Field::from_static(
                "nodeCount",
                "Node count",
                Constraints::new().required().range(Some(1.0), Some(10.0)),
            )
            .with_value("3"),
            Field::from_static(
                "consensusProtocol",
                "Consensus protocol",
                Constraints::new()
                    .required()
                    .options(CONSENSUS_PROTOCOLS.iter().copied()),
            )
            .with_value("ibft2"),
            Field::from_static(
                "monitoringEnabled",
                "Enable monitoring",
                Constraints::new().kind(InputKind::Checkbox),
            )
            .with_value("false"),
            Field::from_static(
                "retention",
                "Retention (days)",
                Constraints::new().range(Some(1.0), Some(90.0)),
            ),
            Field::from_static(
                "alertEmail",
                "Alert email",
                Constraints::new().kind(InputKind::Email),
            ),
        ];
        Self::from_fields(ValidationMode::Expert, fields)
    }

    fn from_fields(mode: ValidationMode, fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            mode,
            fields: fields
                .into_iter()
                .map(|f| (f.name().clone(), f))
                .collect(),
        }
    }

    /// Add a field, builder style
    ///
    /// # Errors
    /// - `FormError::DuplicateField` if the name is taken
    pub fn with_field(mut self, field: Field) -> Result<Self, FormError> {
        self.add_field(field)?;
        Ok(self)
    }

    /// Add a field at the end
    ///
    /// # Errors
    /// - `FormError::DuplicateField` if the name is taken
    pub fn add_field(&mut self, field: Field) -> Result<(), FormError> {
        if self.fields.contains_key(field.name().as_str()) {
            return Err(FormError::DuplicateField(field.name().to_string()));
        }
        self.fields.insert(field.name().clone(), field);
        Ok(())
    }

    /// Validation mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Look up a field
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Look up a field mutably
    #[inline]
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.get_mut(name)
    }

    /// Fields in form order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Field names in form order
    pub fn names(&self) -> impl Iterator<Item = &FieldName> {
        self.fields.keys()
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the form has no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Current value of a field
    #[inline]
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.field(name).map(Field::value)
    }

    /// Record a new raw value
    ///
    /// # Errors
    /// - `FormError::UnknownField` if the field is not part of the form
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        self.field_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?
            .set_value(value);
        Ok(())
    }

    /// Record a validation outcome for a field
    ///
    /// # Errors
    /// - `FormError::UnknownField` if the field is not part of the form
    pub fn set_state(
        &mut self,
        name: &str,
        state: FieldState,
        message: Option<String>,
    ) -> Result<(), FormError> {
        self.field_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?
            .set_state(state, message);
        Ok(())
    }

    /// Capture all current values
    #[must_use]
    pub fn snapshot(&self) -> FormSnapshot {
        self.fields
            .iter()
            .map(|(name, field)| (name.to_string(), field.value().to_string()))
            .collect()
    }

    /// True when every field is `Valid`
    #[must_use]
    pub fn overall_valid(&self) -> bool {
        self.fields.values().all(|f| f.state() == FieldState::Valid)
    }
}
