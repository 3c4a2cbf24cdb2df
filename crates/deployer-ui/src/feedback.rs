//! Per-field feedback slots
//!
//! Each field of the form owns exactly one slot, created up front and keyed by
//! field name. Updates for names without a slot are dropped.

use deployer_form::{FieldName, Form};
use deployer_validation::{FeedbackSink, FieldFeedback};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt::Write as _;

/// What one field shows next to its input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackSlot {
    /// Style class on the input, if any
    pub css_class: Option<&'static str>,
    /// Text below the input, if any
    pub text: Option<String>,
}

/// Feedback surface for one form
#[derive(Debug, Default)]
pub struct FeedbackBoard {
    slots: RwLock<IndexMap<FieldName, FeedbackSlot>>,
    form_errors: RwLock<Vec<String>>,
}

impl FeedbackBoard {
    /// One empty slot per field, in form order
    #[must_use]
    pub fn for_form(form: &Form) -> Self {
        Self {
            slots: RwLock::new(
                form.names()
                    .map(|name| (name.clone(), FeedbackSlot::default()))
                    .collect(),
            ),
            form_errors: RwLock::new(Vec::new()),
        }
    }

    /// Current slot of a field
    #[must_use]
    pub fn slot(&self, field: &str) -> Option<FeedbackSlot> {
        self.slots.read().get(field).cloned()
    }

    /// Current form-level errors
    #[must_use]
    pub fn form_errors(&self) -> Vec<String> {
        self.form_errors.read().clone()
    }

    /// Reset every slot and the form-level errors
    pub fn clear(&self) {
        for slot in self.slots.write().values_mut() {
            *slot = FeedbackSlot::default();
        }
        self.form_errors.write().clear();
    }

    /// Plain-text rendering, one line per field with feedback
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, slot) in self.slots.read().iter() {
            let Some(class) = slot.css_class else {
                continue;
            };
            let _ = write!(out, "{name} [{class}]");
            if let Some(text) = &slot.text {
                let _ = write!(out, " {text}");
            }
            out.push('\n');
        }
        for error in self.form_errors.read().iter() {
            let _ = writeln!(out, "! {error}");
        }
        out
    }
}

impl FeedbackSink for FeedbackBoard {
    fn show_field(&self, field: &FieldName, feedback: &FieldFeedback) {
        match self.slots.write().get_mut(field) {
            Some(slot) => {
                slot.css_class = feedback.css_class();
                slot.text.clone_from(&feedback.message);
            }
            None => tracing::warn!(field = %field, "No feedback slot for field"),
        }
    }

    fn show_form_errors(&self, errors: &[String]) {
        *self.form_errors.write() = errors.to_vec();
    }
}
