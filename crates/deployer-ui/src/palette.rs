//! Command input with suggestions

use crate::error::UiError;

/// Backend actions offered by default
pub const DEFAULT_COMMANDS: [&str; 8] = [
    "create_resource_group",
    "create_network",
    "create_storage_account",
    "deploy_vm",
    "rest_deploy",
    "setup_monitoring",
    "validate_config",
    "predict_optimal_config",
];

/// Command input whose suggestions follow what is typed
///
/// Matching lowercases the input only, then keeps commands containing it.
#[derive(Debug, Clone)]
pub struct CommandPalette {
    commands: Vec<String>,
    input: String,
    suggestions: Vec<String>,
}

impl Default for CommandPalette {
    fn default() -> Self {
        Self::new(DEFAULT_COMMANDS)
    }
}

impl CommandPalette {
    /// Palette over `commands`, in display order
    #[must_use]
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            input: String::new(),
            suggestions: Vec::new(),
        }
    }

    /// Replace the input text and recompute suggestions
    pub fn set_input(&mut self, input: impl Into<String>) -> &[String] {
        self.input = input.into();
        let needle = self.input.to_lowercase();
        self.suggestions = if needle.is_empty() {
            Vec::new()
        } else {
            self.commands
                .iter()
                .filter(|c| c.contains(&needle))
                .cloned()
                .collect()
        };
        &self.suggestions
    }

    /// Current input text
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Current suggestions
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Take suggestion `index` as the input and clear the list
    ///
    /// # Errors
    /// - `UiError::NoSuchSuggestion` if `index` is out of range
    pub fn pick(&mut self, index: usize) -> Result<&str, UiError> {
        let chosen = self
            .suggestions
            .get(index)
            .cloned()
            .ok_or(UiError::NoSuchSuggestion(index))?;
        self.input = chosen;
        self.suggestions.clear();
        Ok(&self.input)
    }
}
