//! Staged deployment progress
//!
//! The deployment endpoint answers once; the stages shown afterwards are
//! paced locally at a fixed interval.

use deployer_validation::{Notification, Notifier};
use std::fmt;
use std::time::Duration;

/// Stage labels, in order
pub const STAGES: [&str; 6] = [
    "Validating configuration",
    "Creating resource group",
    "Provisioning network",
    "Deploying nodes",
    "Configuring monitoring",
    "Finalizing deployment",
];

/// Default pause between stages
pub const DEFAULT_STEP: Duration = Duration::from_millis(1500);

/// One reported stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStage {
    /// Zero-based position
    pub index: usize,
    /// Stage label
    pub label: &'static str,
}

impl ProgressStage {
    /// Completion after this stage, 1..=100
    #[must_use]
    pub fn percent(&self) -> u8 {
        let done = (self.index + 1) * 100 / STAGES.len();
        u8::try_from(done).unwrap_or(100)
    }

    /// Whether this is the last stage
    #[inline]
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.index + 1 == STAGES.len()
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>3}%] {}", self.percent(), self.label)
    }
}

/// Paces the deployment stages
#[derive(Debug, Clone, Copy)]
pub struct ProgressSimulator {
    step: Duration,
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_STEP)
    }
}

impl ProgressSimulator {
    /// Simulator with `step` between stages
    #[must_use]
    pub fn new(step: Duration) -> Self {
        Self { step }
    }

    /// Every stage, in order
    pub fn stages() -> impl Iterator<Item = ProgressStage> {
        STAGES
            .iter()
            .enumerate()
            .map(|(index, label)| ProgressStage { index, label })
    }

    /// Call `on_stage` for each stage, waiting `step` before each one
    pub async fn run<F>(&self, mut on_stage: F)
    where
        F: FnMut(ProgressStage),
    {
        for stage in Self::stages() {
            tokio::time::sleep(self.step).await;
            tracing::debug!(stage = stage.label, percent = stage.percent(), "Deployment progress");
            on_stage(stage);
        }
    }

    /// Show each stage as a sticky progress alert, then a success alert
    pub async fn run_with_notifier(&self, notifier: &dyn Notifier) {
        let mut current = None;
        self.run(|stage| {
            if let Some(previous) = current.take() {
                notifier.dismiss(previous);
            }
            if stage.is_final() {
                notifier.notify(Notification::success("Deployment complete"));
            } else {
                current = Some(notifier.notify(Notification::progress(stage.to_string())));
            }
        })
        .await;
    }
}
