//! Subcommand implementations
//!
//! Each command returns a report; printing is left to `main`.

use crate::config::DeployerConfig;
use anyhow::Context;
use deployer_client::{
    DeployerClient, Prediction, ProgressSimulator, ProgressStage, StatusChannel, StatusUpdate,
};
use deployer_form::{check_form, ConstraintViolation, DeploymentRequest, Form, ValidationMode};
use deployer_ui::{ChatTranscript, CommandPalette, Screen, ViewState};
use deployer_validation::{SubmitError, ValidationCoordinator};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Result of the offline check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    /// Mode of the checked form
    pub mode: ValidationMode,
    /// Failed per-field constraints
    pub violations: Vec<ConstraintViolation>,
    /// Domain rule failures, as the backend would report them
    pub rule_errors: Vec<String>,
}

impl CheckReport {
    /// Nothing failed
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty() && self.rule_errors.is_empty()
    }

    /// Human-readable summary
    #[must_use]
    pub fn render(&self) -> String {
        if self.is_ok() {
            return format!("{} configuration is valid.\n", self.mode);
        }
        let mut out = String::new();
        for violation in &self.violations {
            let _ = writeln!(out, "{}: {}", violation.field, violation.message);
        }
        for error in &self.rule_errors {
            let _ = writeln!(out, "! {error}");
        }
        out
    }
}

/// Check a form without contacting the backend
///
/// Domain rules only run once every field passes its own constraints.
#[must_use]
pub fn check(form: &Form) -> CheckReport {
    let violations = check_form(form);
    let rule_errors = if violations.is_empty() {
        match DeploymentRequest::from_form(form) {
            Ok(request) => request.validate(),
            Err(error) => vec![error.to_string()],
        }
    } else {
        Vec::new()
    };
    CheckReport {
        mode: form.mode(),
        violations,
        rule_errors,
    }
}

/// Result of validating every field against the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReport {
    /// Every field came back valid
    pub valid: bool,
    /// Feedback board as text
    pub feedback: String,
    /// Alerts raised along the way
    pub alerts: Vec<String>,
    /// Some responses did not arrive in time
    pub timed_out: bool,
}

/// Validate every field of `form` through the coordinator
///
/// # Errors
/// Fails only if the coordinator rejects the form's own fields.
pub async fn validate_remote(
    client: &DeployerClient,
    form: Form,
    config: &DeployerConfig,
    wait: Duration,
) -> anyhow::Result<RemoteReport> {
    let names: Vec<String> = form.names().map(ToString::to_string).collect();
    let screen = Screen::for_form(&form, config.notification_ttl());
    let coordinator = ValidationCoordinator::mount(
        form,
        Arc::new(client.clone()),
        screen.context(),
        config.coordinator_config(),
    );

    for name in &names {
        coordinator
            .on_debounce_elapsed(name)
            .with_context(|| format!("dispatching validation for {name}"))?;
    }

    let settled = tokio::time::timeout(wait, async {
        loop {
            let done = names.iter().all(|name| {
                coordinator
                    .sequences(name)
                    .is_some_and(|(dispatched, applied)| applied >= dispatched)
            });
            if done {
                break;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    })
    .await;
    if settled.is_err() {
        tracing::warn!(?wait, "Validation responses still outstanding");
    }

    let report = RemoteReport {
        valid: coordinator.overall_valid(),
        feedback: screen.board.render(),
        alerts: alert_messages(&screen),
        timed_out: settled.is_err(),
    };
    coordinator.unmount();
    Ok(report)
}

/// Result of a deployment attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Local checks failed; nothing was sent
    Blocked {
        /// Feedback board as text
        feedback: String,
    },
    /// The backend accepted the deployment
    Submitted {
        /// Alerts raised along the way
        alerts: Vec<String>,
    },
}

/// Submit `form` and, once accepted, pace through the deployment stages
///
/// # Errors
/// - the submission endpoint failed or the values do not make a payload
pub async fn deploy<F>(
    client: &DeployerClient,
    form: Form,
    config: &DeployerConfig,
    on_stage: F,
) -> anyhow::Result<DeployOutcome>
where
    F: FnMut(ProgressStage),
{
    let screen = Screen::for_form(&form, config.notification_ttl());
    let coordinator = ValidationCoordinator::mount(
        form,
        Arc::new(client.clone()),
        screen.context(),
        config.coordinator_config(),
    );

    let result = coordinator.submit(client).await;
    coordinator.unmount();
    match result {
        Ok(_) => {
            ProgressSimulator::new(config.progress_step()).run(on_stage).await;
            Ok(DeployOutcome::Submitted {
                alerts: alert_messages(&screen),
            })
        }
        Err(SubmitError::ConstraintViolations(_)) => Ok(DeployOutcome::Blocked {
            feedback: screen.board.render(),
        }),
        Err(error) => Err(error).context("deployment was not accepted"),
    }
}

/// Relay status updates from `base` until the channel closes or Ctrl-C
///
/// # Errors
/// - connecting failed or the connection ended with an error
pub async fn watch<F>(base: &Url, ttl: Duration, mut on_update: F) -> anyhow::Result<()>
where
    F: FnMut(&StatusUpdate),
{
    let screen = Screen::for_form(&Form::simple(), ttl);
    let mut channel = StatusChannel::connect(base, Arc::new(screen.notifications.clone()))
        .await
        .with_context(|| format!("connecting status channel at {base}"))?;

    loop {
        tokio::select! {
            update = channel.recv() => match update {
                Some(update) => on_update(&update),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                channel.close();
                return Ok(());
            }
        }
    }
    channel.join().await.context("status channel failed")
}

/// Score configuration text
///
/// # Errors
/// - the prediction endpoint failed
pub async fn predict(client: &DeployerClient, config_text: &str) -> anyhow::Result<Prediction> {
    client
        .predict(config_text)
        .await
        .context("prediction request failed")
}

/// Send one chat message; returns the transcript of the exchange
///
/// Blank messages are not sent.
///
/// # Errors
/// - the chat endpoint failed
pub async fn chat(client: &DeployerClient, message: &str) -> anyhow::Result<ChatTranscript> {
    let mut transcript = ChatTranscript::new();
    let mut input = message.to_string();
    if let Some(text) = transcript.submit_input(&mut input) {
        let reply = client.chat(&text).await.context("chat request failed")?;
        transcript.push_reply(reply);
    }
    Ok(transcript)
}

/// Run a named backend action against configuration text
///
/// Returns the selection feedback followed by the action's result text.
///
/// # Errors
/// - the action endpoint failed
pub async fn run_action(
    client: &DeployerClient,
    action: &str,
    config_text: &str,
) -> anyhow::Result<(String, String)> {
    let mut view = ViewState::new();
    let selected = view.select_action(action).to_string();
    let result = client
        .execute(action, config_text)
        .await
        .with_context(|| format!("action {action} failed"))?;
    Ok((selected, result))
}

/// Known backend actions matching `query`, all of them when empty
#[must_use]
pub fn suggest_actions(query: &str) -> Vec<String> {
    if query.is_empty() {
        return deployer_ui::DEFAULT_COMMANDS.iter().map(ToString::to_string).collect();
    }
    CommandPalette::default().set_input(query).to_vec()
}

fn alert_messages(screen: &Screen) -> Vec<String> {
    screen
        .notifications
        .active()
        .into_iter()
        .map(|(_, notification)| notification.message)
        .collect()
}
