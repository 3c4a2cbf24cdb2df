//! Attribution of remote error strings to fields
//!
//! The backend answers with a flat list of messages. A message belongs to a
//! field when the field's name occurs in it, compared case-insensitively.
//! Messages that match no field are shown at form level.
//!
//! Plain substring containment means a field whose name is contained in
//! another's ("email" in "alertEmail") also claims the longer field's errors.

use crate::field::FieldName;
use indexmap::IndexMap;

/// First error mentioning `field`, if any
#[must_use]
pub fn message_for_field<'a>(field: &str, errors: &'a [String]) -> Option<&'a str> {
    let needle = field.to_lowercase();
    errors
        .iter()
        .find(|e| e.to_lowercase().contains(&needle))
        .map(String::as_str)
}

/// Errors split into per-field messages and form-level leftovers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribution {
    /// First matching message per field, in field order
    pub per_field: IndexMap<FieldName, String>,
    /// Messages that matched no field, in response order
    pub unattributed: Vec<String>,
}

impl Attribution {
    /// Whether any error ended up at form level
    #[inline]
    #[must_use]
    pub fn has_form_errors(&self) -> bool {
        !self.unattributed.is_empty()
    }
}

/// Attribute every error against a set of field names
pub fn attribute_errors<'a, I>(fields: I, errors: &[String]) -> Attribution
where
    I: IntoIterator<Item = &'a FieldName>,
{
    let fields: Vec<(&FieldName, String)> = fields
        .into_iter()
        .map(|f| (f, f.as_str().to_lowercase()))
        .collect();

    let mut attribution = Attribution::default();
    for error in errors {
        let lowered = error.to_lowercase();
        let mut matched = false;
        for (name, needle) in &fields {
            if lowered.contains(needle.as_str()) {
                matched = true;
                attribution
                    .per_field
                    .entry((*name).clone())
                    .or_insert_with(|| error.clone());
            }
        }
        if !matched {
            attribution.unattributed.push(error.clone());
        }
    }
    attribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn names(list: &[&str]) -> Vec<FieldName> {
        list.iter().map(|n| FieldName::new(*n).unwrap()).collect()
    }

    #[test]
    fn first_match_wins_case_insensitively() {
        let errors = vec![
            "Retention period must be between 1 and 90 days".to_string(),
            "RETENTION is required".to_string(),
        ];
        assert_eq!(
            message_for_field("retention", &errors),
            Some("Retention period must be between 1 and 90 days")
        );
        assert_eq!(message_for_field("location", &errors), None);
    }

    #[test]
    fn unmatched_errors_go_to_form_level() {
        let fields = names(&["location", "vmSize"]);
        let errors = vec![
            "Invalid location. Must be one of: eastus, westus".to_string(),
            "Backend unavailable".to_string(),
        ];

        let attribution = attribute_errors(&fields, &errors);
        assert_eq!(attribution.per_field.len(), 1);
        assert_eq!(
            attribution.per_field.get("location").map(String::as_str),
            Some("Invalid location. Must be one of: eastus, westus")
        );
        assert_eq!(attribution.unattributed, vec!["Backend unavailable".to_string()]);
        assert!(attribution.has_form_errors());
    }

    #[test]
    fn shorter_name_also_claims_longer_names_errors() {
        let fields = names(&["email", "alertEmail"]);
        let errors = vec!["alertEmail is not a valid address".to_string()];

        let attribution = attribute_errors(&fields, &errors);
        assert!(attribution.per_field.contains_key("email"));
        assert!(attribution.per_field.contains_key("alertEmail"));
        assert!(attribution.unattributed.is_empty());
    }

    proptest! {
        #[test]
        fn prop_every_error_is_accounted_for(errors in proptest::collection::vec("[a-z ]{0,16}", 0..8)) {
            let fields = names(&["node", "size"]);
            let attribution = attribute_errors(&fields, &errors);
            let attributed = errors
                .iter()
                .filter(|e| e.contains("node") || e.contains("size"))
                .count();
            prop_assert_eq!(attributed + attribution.unattributed.len(), errors.len());
        }
    }
}
