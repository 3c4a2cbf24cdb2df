//! Local constraint checks
//!
//! Runs the same checks a browser's constraint validation would
//! (required, type, pattern, min/max, minlength/maxlength) without any
//! network involvement. Submission is blocked while any check fails.

use crate::field::{Constraints, FieldName, InputKind};
use crate::form::Form;
use once_cell::sync::Lazy;
use regex::Regex;

// Same grammar the HTML living standard uses for type=email.
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email grammar compiles")
});

/// Which check failed, named after the browser `ValidityState` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// Required value is empty
    ValueMissing,
    /// Value does not parse as the input type
    TypeMismatch,
    /// Value does not match the pattern
    PatternMismatch,
    /// Number below `min`
    RangeUnderflow,
    /// Number above `max`
    RangeOverflow,
    /// Number off the `step` grid
    StepMismatch,
    /// Number input holds something that is not a finite number
    BadInput,
    /// Fewer characters than `min_length`
    TooShort,
    /// More characters than `max_length`
    TooLong,
}

/// A failed local check for one field
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// Offending field
    pub field: FieldName,
    /// Failed check
    pub kind: ViolationKind,
    /// Message shown inline
    pub message: String,
}

/// Check one value against its constraints
///
/// Returns the first failing check, in browser precedence order.
/// An empty optional value passes every other check.
#[must_use]
pub fn check_value(constraints: &Constraints, value: &str) -> Option<(ViolationKind, String)> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        if constraints.required && constraints.kind != InputKind::Checkbox {
            let message = match constraints.kind {
                InputKind::Select => "Please select an item in the list",
                _ => "Please fill out this field",
            };
            return Some((ViolationKind::ValueMissing, message.to_string()));
        }
        return None;
    }

    match constraints.kind {
        InputKind::Email if !EMAIL.is_match(trimmed) => {
            return Some((
                ViolationKind::TypeMismatch,
                "Please enter a valid email address".to_string(),
            ));
        }
        InputKind::Number => {
            let Some(number) = trimmed.parse::<f64>().ok().filter(|n| n.is_finite()) else {
                return Some((ViolationKind::BadInput, "Please enter a number".to_string()));
            };
            if let Some(min) = constraints.min {
                if number < min {
                    return Some((
                        ViolationKind::RangeUnderflow,
                        format!("Value must be greater than or equal to {min}"),
                    ));
                }
            }
            if let Some(max) = constraints.max {
                if number > max {
                    return Some((
                        ViolationKind::RangeOverflow,
                        format!("Value must be less than or equal to {max}"),
                    ));
                }
            }
            if let Some(step) = constraints.step.filter(|s| *s > 0.0) {
                let base = constraints.min.unwrap_or(0.0);
                let steps = (number - base) / step;
                if (steps - steps.round()).abs() > 1e-9 {
                    let lower = base + steps.floor() * step;
                    return Some((
                        ViolationKind::StepMismatch,
                        format!(
                            "Please enter a valid value. The two nearest valid values are {lower} and {}",
                            lower + step
                        ),
                    ));
                }
            }
        }
        InputKind::Select if !constraints.options.iter().any(|o| o == value) => {
            return Some((
                ViolationKind::TypeMismatch,
                "Please select an item in the list".to_string(),
            ));
        }
        InputKind::Checkbox if value != "true" && value != "false" => {
            return Some((
                ViolationKind::TypeMismatch,
                "Please check or uncheck this box".to_string(),
            ));
        }
        _ => {}
    }

    let length = value.chars().count();
    if let Some(min) = constraints.min_length {
        if length < min {
            return Some((
                ViolationKind::TooShort,
                format!("Please use at least {min} characters (you are currently using {length})"),
            ));
        }
    }
    if let Some(max) = constraints.max_length {
        if length > max {
            return Some((
                ViolationKind::TooLong,
                format!("Please use no more than {max} characters (you are currently using {length})"),
            ));
        }
    }

    if let Some(pattern) = &constraints.pattern {
        if !pattern.matches(value) {
            let message = match &constraints.title {
                Some(title) => format!("Please match the requested format: {title}"),
                None => "Please match the requested format".to_string(),
            };
            return Some((ViolationKind::PatternMismatch, message));
        }
    }

    None
}

/// Check every field of a form, in form order
#[must_use]
pub fn check_form(form: &Form) -> Vec<ConstraintViolation> {
    form.fields()
        .filter_map(|field| {
            check_value(field.constraints(), field.value()).map(|(kind, message)| {
                ConstraintViolation {
                    field: field.name().clone(),
                    kind,
                    message,
                }
            })
        })
        .collect()
}
