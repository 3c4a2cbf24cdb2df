//! Typed deployment payloads
//!
//! Payloads sent to the deployment endpoint, tagged by mode:
//! - simple: resource group, location, node type, VM size
//! - expert: network, node count and consensus, monitoring
//!
//! `validate` applies the same rules the backend enforces so a payload can
//! be checked offline. Messages use the backend's wording.

use crate::error::FormError;
use crate::form::{Form, ValidationMode};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Supported regions
pub const LOCATIONS: &[&str] = &[
    "eastus",
    "westus",
    "centralus",
    "northcentralus",
    "southcentralus",
    "northeurope",
    "westeurope",
];

/// Supported node roles
pub const NODE_TYPES: &[&str] = &["validator", "observer", "bootnode"];

/// Supported VM sizes
pub const VM_SIZES: &[&str] = &["Standard_D2s_v3", "Standard_D4s_v3", "Standard_D8s_v3"];

/// Supported consensus protocols
pub const CONSENSUS_PROTOCOLS: &[&str] = &["ibft2", "qbft", "clique"];

/// Resource and network names
pub const RESOURCE_NAME_PATTERN: &str = "[a-zA-Z0-9_-]{3,64}";

/// Dotted-quad with prefix length
pub const SUBNET_PREFIX_PATTERN: &str = r"([0-9]{1,3}\.){3}[0-9]{1,3}/[0-9]{1,2}";

/// Node count bounds
pub const NODE_COUNT_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

/// Log retention bounds in days
pub const RETENTION_RANGE: std::ops::RangeInclusive<u32> = 1..=90;

/// Subnet prefix length bounds
pub const PREFIX_LENGTH_RANGE: std::ops::RangeInclusive<u8> = 16..=29;

static RESOURCE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{RESOURCE_NAME_PATTERN}$")).expect("resource name regex compiles")
});

static SUBNET_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{SUBNET_PREFIX_PATTERN}$")).expect("subnet prefix regex compiles")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex compiles")
});

/// Simple-mode payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleDeployment {
    /// Target resource group
    pub resource_group: String,
    /// Region
    pub location: String,
    /// Node role
    pub node_type: String,
    /// VM size
    pub vm_size: String,
}

/// Expert-mode network section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSettings {
    /// Virtual network name
    pub vnet_name: String,
    /// Subnet in CIDR notation
    pub subnet_prefix: String,
}

/// Expert-mode node section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSettings {
    /// Number of nodes
    pub count: u32,
    /// Consensus protocol
    pub consensus_protocol: String,
}

/// Expert-mode monitoring section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringSettings {
    /// Whether monitoring is deployed
    pub enabled: bool,
    /// Log retention in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<u32>,
    /// Recipient for alerts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_email: Option<String>,
}

/// Expert-mode payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertDeployment {
    /// Network section
    pub network: NetworkSettings,
    /// Node section
    pub nodes: NodeSettings,
    /// Monitoring section
    #[serde(default)]
    pub monitoring: MonitoringSettings,
}

/// Deployment submission, tagged with its mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DeploymentRequest {
    /// Simple mode
    Simple(SimpleDeployment),
    /// Expert mode
    Expert(ExpertDeployment),
}

impl DeploymentRequest {
    /// Mode of this request
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        match self {
            Self::Simple(_) => ValidationMode::Simple,
            Self::Expert(_) => ValidationMode::Expert,
        }
    }

    /// Build the payload from current form values
    ///
    /// # Errors
    /// - `FormError::UnknownField` if the form lacks a field the mode needs
    /// - `FormError::InvalidValue` if a numeric or boolean field does not parse
    pub fn from_form(form: &Form) -> Result<Self, FormError> {
        let get = |name: &str| -> Result<String, FormError> {
            form.value(name)
                .map(|v| v.trim().to_string())
                .ok_or_else(|| FormError::UnknownField(name.to_string()))
        };

        match form.mode() {
            ValidationMode::Simple => Ok(Self::Simple(SimpleDeployment {
                resource_group: get("resourceGroup")?,
                location: get("location")?,
                node_type: get("nodeType")?,
                vm_size: get("vmSize")?,
            })),
            ValidationMode::Expert => {
                let count = parse_whole("nodeCount", &get("nodeCount")?)?;
                let enabled = match get("monitoringEnabled")?.as_str() {
                    "true" | "on" => true,
                    "false" | "" => false,
                    other => {
                        return Err(FormError::InvalidValue {
                            field: "monitoringEnabled".into(),
                            reason: format!("expected true or false, got '{other}'"),
                        })
                    }
                };
                let retention = match get("retention")? {
                    r if r.is_empty() => None,
                    r => Some(parse_whole("retention", &r)?),
                };
                let alert_email = Some(get("alertEmail")?).filter(|e| !e.is_empty());

                Ok(Self::Expert(ExpertDeployment {
                    network: NetworkSettings {
                        vnet_name: get("vnetName")?,
                        subnet_prefix: get("subnetPrefix")?,
                    },
                    nodes: NodeSettings {
                        count,
                        consensus_protocol: get("consensusProtocol")?,
                    },
                    monitoring: MonitoringSettings {
                        enabled,
                        retention,
                        alert_email,
                    },
                }))
            }
        }
    }

    /// Apply the backend's rules; empty means acceptable
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        match self {
            Self::Simple(simple) => simple.validate(),
            Self::Expert(expert) => expert.validate(),
        }
    }
}

/// Whole number as typed, also in float notation ("10.0", "1e1")
fn parse_whole(field: &str, raw: &str) -> Result<u32, FormError> {
    if let Ok(value) = raw.parse::<u32>() {
        return Ok(value);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|n| {
            n.is_finite()
                && n.fract().abs() < f64::EPSILON
                && (0.0..=f64::from(u32::MAX)).contains(n)
        })
        .map(|n| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = n as u32;
            whole
        })
        .ok_or_else(|| FormError::InvalidValue {
            field: field.to_string(),
            reason: format!("'{raw}' is not a whole number"),
        })
}

fn one_of(kind: &str, value: &str, allowed: &[&str]) -> Option<String> {
    if allowed.contains(&value) {
        None
    } else {
        Some(format!(
            "Invalid {kind}: {value}. Must be one of: {}",
            allowed.join(", ")
        ))
    }
}

impl SimpleDeployment {
    /// Backend rules for simple mode
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !RESOURCE_NAME.is_match(&self.resource_group) {
            errors.push(
                "Resource group name must be 3-64 characters and contain only letters, numbers, hyphens, and underscores"
                    .to_string(),
            );
        }
        if !LOCATIONS.contains(&self.location.as_str()) {
            errors.push(format!(
                "Invalid location. Must be one of: {}",
                LOCATIONS.join(", ")
            ));
        }
        errors.extend(one_of("node type", &self.node_type, NODE_TYPES));
        errors.extend(one_of("VM size", &self.vm_size, VM_SIZES));
        errors
    }
}

impl NetworkSettings {
    /// Backend rules for the network section
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !RESOURCE_NAME.is_match(&self.vnet_name) {
            errors.push(
                "Virtual network name must be 3-64 characters and contain only letters, numbers, hyphens, and underscores"
                    .to_string(),
            );
        }
        if let Some(error) = validate_subnet_prefix(&self.subnet_prefix) {
            errors.push(error);
        }
        errors
    }
}

impl NodeSettings {
    /// Backend rules for the node section
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !NODE_COUNT_RANGE.contains(&self.count) {
            errors.push(format!(
                "Node count must be between {} and {}",
                NODE_COUNT_RANGE.start(),
                NODE_COUNT_RANGE.end()
            ));
        }
        errors.extend(one_of(
            "consensus protocol",
            &self.consensus_protocol,
            CONSENSUS_PROTOCOLS,
        ));
        errors
    }
}

impl MonitoringSettings {
    /// Backend rules for the monitoring section; skipped when disabled
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.enabled {
            return errors;
        }
        if !self.retention.is_some_and(|r| RETENTION_RANGE.contains(&r)) {
            errors.push(format!(
                "Retention period must be between {} and {} days",
                RETENTION_RANGE.start(),
                RETENTION_RANGE.end()
            ));
        }
        if let Some(email) = &self.alert_email {
            if !EMAIL.is_match(email) {
                errors.push("Invalid email address format".to_string());
            }
        }
        errors
    }
}

impl ExpertDeployment {
    /// Backend rules for expert mode
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.network.validate();
        errors.extend(self.nodes.validate());
        errors.extend(self.monitoring.validate());
        errors
    }
}

/// Check a CIDR subnet prefix, returning the first problem found
fn validate_subnet_prefix(prefix: &str) -> Option<String> {
    if !SUBNET_PREFIX.is_match(prefix) {
        return Some("Invalid subnet prefix format (e.g., 10.0.0.0/24)".to_string());
    }

    let (address, length) = prefix.split_once('/')?;
    let not_a_network = || format!("'{prefix}' does not appear to be an IPv4 network");
    let Ok(address) = address.parse::<Ipv4Addr>() else {
        return Some(not_a_network());
    };
    let Ok(length) = length.parse::<u8>() else {
        return Some(not_a_network());
    };
    if length > 32 {
        return Some(not_a_network());
    }

    let mask = u32::MAX.checked_shl(u32::from(32 - length)).unwrap_or(0);
    if u32::from(address) & !mask != 0 {
        return Some(format!("{prefix} has host bits set"));
    }

    if !PREFIX_LENGTH_RANGE.contains(&length) {
        return Some(format!(
            "Subnet prefix must be between /{} and /{}",
            PREFIX_LENGTH_RANGE.start(),
            PREFIX_LENGTH_RANGE.end()
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn constant_patterns_compile() {
        Lazy::force(&RESOURCE_NAME);
        Lazy::force(&SUBNET_PREFIX);
        Lazy::force(&EMAIL);
    }

    fn simple(resource_group: &str, location: &str, node_type: &str, vm_size: &str) -> SimpleDeployment {
        SimpleDeployment {
            resource_group: resource_group.into(),
            location: location.into(),
            node_type: node_type.into(),
            vm_size: vm_size.into(),
        }
    }

    fn expert() -> ExpertDeployment {
        ExpertDeployment {
            network: NetworkSettings {
                vnet_name: "test-network".into(),
                subnet_prefix: "10.0.0.0/24".into(),
            },
            nodes: NodeSettings {
                count: 3,
                consensus_protocol: "ibft2".into(),
            },
            monitoring: MonitoringSettings {
                enabled: true,
                retention: Some(30),
                alert_email: Some("test@example.com".into()),
            },
        }
    }

    #[test]
    fn resource_group_names() {
        let too_long = "a".repeat(65);
        let cases = [
            ("valid-name-123", true),
            (too_long.as_str(), false),
            ("ab", false),
            ("invalid@name", false),
            ("VALID_NAME_123", true),
            ("123-start-with-number", true),
            ("", false),
            (" space-name", false),
            ("valid-name ", false),
        ];
        for (name, ok) in cases {
            let errors = simple(name, "eastus", "validator", "Standard_D2s_v3").validate();
            assert_eq!(errors.is_empty(), ok, "resource group '{name}'");
        }
    }

    #[test]
    fn selects_are_case_sensitive() {
        assert!(!simple("test-group", "EASTUS", "validator", "Standard_D2s_v3")
            .validate()
            .is_empty());
        assert!(!simple("test-group", "eastus", "VALIDATOR", "Standard_D2s_v3")
            .validate()
            .is_empty());
        assert!(!simple("test-group", "eastus", "validator", "standard_d2s_v3")
            .validate()
            .is_empty());
        assert!(!simple("test-group", "eastus", "validator", "Standard_D16s_v3")
            .validate()
            .is_empty());
    }

    #[test]
    fn location_error_lists_regions() {
        let errors = simple("test-group", "invalid", "validator", "Standard_D2s_v3").validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Invalid location. Must be one of: eastus"));
    }

    #[test]
    fn subnet_prefixes() {
        assert_eq!(validate_subnet_prefix("10.0.0.0/24"), None);
        assert_eq!(
            validate_subnet_prefix("invalid").as_deref(),
            Some("Invalid subnet prefix format (e.g., 10.0.0.0/24)")
        );
        assert!(validate_subnet_prefix("10.0.0.0").is_some());
        assert!(validate_subnet_prefix("256.0.0.0/24").is_some());
        assert!(validate_subnet_prefix("10.0.0.0/33").is_some());
        assert_eq!(
            validate_subnet_prefix("10.0.0.1/24").as_deref(),
            Some("10.0.0.1/24 has host bits set")
        );
        assert_eq!(
            validate_subnet_prefix("10.0.0.0/8").as_deref(),
            Some("Subnet prefix must be between /16 and /29")
        );
    }

    #[test]
    fn node_and_monitoring_rules() {
        let mut config = expert();
        assert!(config.validate().is_empty());

        config.nodes.count = 0;
        assert_eq!(config.validate(), vec!["Node count must be between 1 and 10"]);
        config.nodes.count = 11;
        assert_eq!(config.validate().len(), 1);
        config.nodes.count = 3;

        config.nodes.consensus_protocol = "invalid".into();
        assert_eq!(config.validate().len(), 1);
        config.nodes.consensus_protocol = "qbft".into();

        config.monitoring.retention = Some(91);
        assert_eq!(
            config.validate(),
            vec!["Retention period must be between 1 and 90 days"]
        );
        config.monitoring.retention = Some(30);

        config.monitoring.alert_email = Some("invalid-email".into());
        assert_eq!(config.validate(), vec!["Invalid email address format"]);

        config.monitoring = MonitoringSettings::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn serializes_with_mode_tag() {
        let request = DeploymentRequest::Simple(simple(
            "test-group",
            "eastus",
            "validator",
            "Standard_D2s_v3",
        ));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "mode": "simple",
                "resourceGroup": "test-group",
                "location": "eastus",
                "nodeType": "validator",
                "vmSize": "Standard_D2s_v3"
            })
        );
    }

    #[test]
    fn expert_payload_from_form() {
        let mut form = Form::expert();
        form.set_value("vnetName", "test-network").unwrap();
        form.set_value("subnetPrefix", "10.0.0.0/24").unwrap();
        form.set_value("monitoringEnabled", "true").unwrap();
        form.set_value("retention", "30").unwrap();

        let request = DeploymentRequest::from_form(&form).unwrap();
        assert_eq!(request.mode(), ValidationMode::Expert);
        let DeploymentRequest::Expert(expert) = &request else {
            panic!("expected expert payload");
        };
        assert_eq!(expert.nodes.count, 3);
        assert_eq!(expert.monitoring.retention, Some(30));
        assert_eq!(expert.monitoring.alert_email, None);
        assert!(request.validate().is_empty());
    }

    #[test]
    fn non_numeric_node_count_rejected() {
        let mut form = Form::expert();
        form.set_value("nodeCount", "three").unwrap();
        assert!(matches!(
            DeploymentRequest::from_form(&form),
            Err(FormError::InvalidValue { .. })
        ));
    }

    #[test]
    fn whole_numbers_in_float_notation() {
        assert_eq!(parse_whole("nodeCount", "1e1").unwrap(), 10);
        assert_eq!(parse_whole("nodeCount", "4.0").unwrap(), 4);
        for raw in ["3.5", "NaN", "inf", "-2", "1e20"] {
            assert!(parse_whole("nodeCount", raw).is_err(), "{raw}");
        }
    }
}
