//! Coordinator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Coordinator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Quiet period before a field is validated remotely, in milliseconds
    pub debounce_ms: u64,
    /// Whether transport failures raise a notification
    pub notify_failures: bool,
}

impl CoordinatorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With debounce delay
    #[inline]
    #[must_use]
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With failure notifications on or off
    #[inline]
    #[must_use]
    pub fn with_failure_notifications(mut self, enabled: bool) -> Self {
        self.notify_failures = enabled;
        self
    }

    /// Debounce delay
    #[inline]
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            notify_failures: true,
        }
    }
}
