//! Page-level view toggles

use crate::error::UiError;
use deployer_form::ValidationMode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Colour scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light stylesheet
    #[default]
    Day,
    /// Dark stylesheet
    Night,
}

impl Theme {
    /// Name as used in settings
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
        }
    }

    /// The other theme
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Day => Self::Night,
            Self::Night => Self::Day,
        }
    }
}

impl FromStr for Theme {
    type Err = UiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "night" => Ok(Self::Night),
            other => Err(UiError::UnknownTheme(other.to_string())),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme, panel visibility, deployment mode and action feedback
///
/// Sidebars and steps start hidden; the first toggle shows them.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    theme: Theme,
    mode: ValidationMode,
    sidebars: IndexMap<String, bool>,
    steps: IndexMap<String, bool>,
    action_feedback: Option<String>,
}

impl ViewState {
    /// Day theme, simple mode, everything collapsed
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active theme
    #[inline]
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switch to `theme`
    pub fn switch_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Flip between day and night; returns the new theme
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Whether a theme's stylesheet is enabled
    #[inline]
    #[must_use]
    pub fn stylesheet_enabled(&self, theme: Theme) -> bool {
        self.theme == theme
    }

    /// Flip a sidebar; returns whether it is now visible
    pub fn toggle_sidebar(&mut self, id: &str) -> bool {
        toggle(&mut self.sidebars, id)
    }

    /// Whether a sidebar is visible
    #[must_use]
    pub fn sidebar_visible(&self, id: &str) -> bool {
        self.sidebars.get(id).copied().unwrap_or(false)
    }

    /// Flip a step's content; returns whether it is now expanded
    pub fn toggle_step(&mut self, id: &str) -> bool {
        toggle(&mut self.steps, id)
    }

    /// Whether a step is expanded
    #[must_use]
    pub fn step_expanded(&self, id: &str) -> bool {
        self.steps.get(id).copied().unwrap_or(false)
    }

    /// Selected deployment mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Select a deployment mode; returns whether it changed
    pub fn set_mode(&mut self, mode: ValidationMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    /// Whether the configuration section for `mode` is shown
    #[inline]
    #[must_use]
    pub fn section_visible(&self, mode: ValidationMode) -> bool {
        self.mode == mode
    }

    /// Record the chosen action; returns the feedback line
    pub fn select_action(&mut self, action: &str) -> &str {
        self.action_feedback
            .insert(format!("You selected: {action}"))
            .as_str()
    }

    /// Feedback line for the last chosen action
    #[must_use]
    pub fn action_feedback(&self) -> Option<&str> {
        self.action_feedback.as_deref()
    }
}

fn toggle(panels: &mut IndexMap<String, bool>, id: &str) -> bool {
    let visible = panels.entry(id.to_string()).or_insert(false);
    *visible = !*visible;
    *visible
}
