//! Validation coordinator
//!
//! Lifecycle of one field edit:
//! 1. `on_field_changed` records the value and restarts the field's timer
//! 2. `on_debounce_elapsed` bumps the field's sequence, snapshots the form,
//!    marks the field `Pending` and spawns the remote call
//! 3. `on_validation_response` / `on_transport_failure` apply the outcome
//!    unless a response with an equal or higher sequence was already applied
//!
//! Sequence numbers are the only guard against reordering. Requests are never
//! aborted; stale results are dropped when they land.

use crate::config::CoordinatorConfig;
use crate::context::{FieldFeedback, Notification, UiContext};
use crate::debounce::Debouncer;
use crate::error::{CoordinatorError, SubmitError, TransportError};
use crate::protocol::{ValidationRequest, ValidationResponse};
use crate::remote::{DeploymentSubmitter, RemoteValidator, SubmitReceipt};
use dashmap::DashMap;
use deployer_form::{
    attribute_errors, check_form, message_for_field, DeploymentRequest, FieldName, FieldState,
    Form, FormSnapshot, ValidationMode,
};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of offering a result to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Application {
    /// The result updated the field
    Applied,
    /// An equal or newer sequence was already applied
    Stale,
    /// The coordinator is unmounted
    Ignored,
}

/// Per-field sequence bookkeeping
#[derive(Debug, Default, Clone, Copy)]
struct SequenceTrack {
    dispatched: u64,
    applied: u64,
}

/// Holds the submission flag; releases it when dropped, including when the
/// submitting future is cancelled
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        (!flag.swap(true, Ordering::SeqCst)).then_some(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct Inner {
    config: CoordinatorConfig,
    form: RwLock<Form>,
    tracks: DashMap<FieldName, SequenceTrack>,
    debouncer: Debouncer<FieldName>,
    validator: Arc<dyn RemoteValidator>,
    ui: UiContext,
    mounted: AtomicBool,
    submitting: AtomicBool,
    /// Fields left `Invalid` by the last local submission check; lock after `form`
    local_failures: Mutex<HashSet<FieldName>>,
}

/// Coordinates debounced remote validation for one mounted form
///
/// Dropping the coordinator unmounts it.
pub struct ValidationCoordinator {
    inner: Arc<Inner>,
}

impl ValidationCoordinator {
    /// Mount a coordinator over `form`
    ///
    /// Every field of the form gets its own sequence track. Must be called
    /// from within a tokio runtime before any edit is reported.
    #[must_use]
    pub fn mount(
        form: Form,
        validator: Arc<dyn RemoteValidator>,
        ui: UiContext,
        config: CoordinatorConfig,
    ) -> Self {
        let tracks = form
            .names()
            .map(|name| (name.clone(), SequenceTrack::default()))
            .collect();
        tracing::debug!(mode = %form.mode(), fields = form.len(), "Mounting validation coordinator");

        Self {
            inner: Arc::new(Inner {
                debouncer: Debouncer::new(config.debounce()),
                config,
                form: RwLock::new(form),
                tracks,
                validator,
                ui,
                mounted: AtomicBool::new(true),
                submitting: AtomicBool::new(false),
                local_failures: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Unmount: cancel pending timers and ignore late results
    pub fn unmount(&self) {
        if self.inner.mounted.swap(false, Ordering::SeqCst) {
            self.inner.debouncer.cancel_all();
            tracing::debug!("Validation coordinator unmounted");
        }
    }

    /// Whether the coordinator still reacts to events
    #[inline]
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::SeqCst)
    }

    /// Record an edit and restart the field's quiet period
    ///
    /// # Errors
    /// - `CoordinatorError::Unmounted` after `unmount`
    /// - `CoordinatorError::Form` if the field is not part of the form
    pub fn on_field_changed(
        &self,
        field: &str,
        value: impl Into<String>,
    ) -> Result<(), CoordinatorError> {
        self.ensure_mounted()?;
        self.inner.form.write().set_value(field, value)?;
        let name = self.field_name(field)?;

        let inner = Arc::clone(&self.inner);
        let target = name.clone();
        self.inner.debouncer.schedule(name, move || {
            inner.on_debounce_elapsed(&target);
        });
        Ok(())
    }

    /// Dispatch a validation request for `field` now
    ///
    /// Also what the debounce timer calls once the quiet period elapses.
    /// Returns the sequence number of the dispatched request.
    ///
    /// # Errors
    /// - `CoordinatorError::Unmounted` after `unmount`
    /// - `CoordinatorError::Form` if the field is not part of the form
    pub fn on_debounce_elapsed(&self, field: &str) -> Result<u64, CoordinatorError> {
        self.ensure_mounted()?;
        let name = self.field_name(field)?;
        self.inner.debouncer.cancel(&name);
        self.inner
            .on_debounce_elapsed(&name)
            .ok_or(CoordinatorError::Unmounted)
    }

    /// Offer a remote verdict for request `sequence` of `field`
    ///
    /// # Errors
    /// - `CoordinatorError::Form` if the field is not part of the form
    pub fn on_validation_response(
        &self,
        field: &str,
        response: &ValidationResponse,
        sequence: u64,
    ) -> Result<Application, CoordinatorError> {
        let name = self.field_name(field)?;
        Ok(self.inner.on_validation_response(&name, response, sequence))
    }

    /// Offer a transport failure for request `sequence` of `field`
    ///
    /// # Errors
    /// - `CoordinatorError::Form` if the field is not part of the form
    pub fn on_transport_failure(
        &self,
        field: &str,
        error: &TransportError,
        sequence: u64,
    ) -> Result<Application, CoordinatorError> {
        let name = self.field_name(field)?;
        Ok(self.inner.on_transport_failure(&name, error, sequence))
    }

    /// Check locally, then submit the whole form
    ///
    /// Local constraint failures mark the offending fields invalid and
    /// return without any network call. Transport failures raise a
    /// notification; the form stays editable and may be resubmitted.
    ///
    /// # Errors
    /// - `SubmitError::ConstraintViolations` if any local check fails
    /// - `SubmitError::Form` if the values do not make a payload
    /// - `SubmitError::Transport` if the endpoint fails
    /// - `SubmitError::InFlight` while another submission runs
    /// - `SubmitError::Unmounted` after `unmount`
    pub async fn submit(
        &self,
        submitter: &dyn DeploymentSubmitter,
    ) -> Result<SubmitReceipt, SubmitError> {
        if !self.is_mounted() {
            return Err(SubmitError::Unmounted);
        }
        let Some(_guard) = InFlightGuard::acquire(&self.inner.submitting) else {
            return Err(SubmitError::InFlight);
        };
        self.submit_inner(submitter).await
    }

    async fn submit_inner(
        &self,
        submitter: &dyn DeploymentSubmitter,
    ) -> Result<SubmitReceipt, SubmitError> {
        let request = {
            let mut form = self.inner.form.write();
            let violations = check_form(&form);
            let mut local_failures = self.inner.local_failures.lock();
            for field in local_failures.drain() {
                if violations.iter().all(|v| v.field != field) {
                    form.set_state(field.as_str(), FieldState::Untouched, None)?;
                    self.inner
                        .ui
                        .feedback()
                        .show_field(&field, &FieldFeedback::state(FieldState::Untouched));
                }
            }
            if !violations.is_empty() {
                tracing::info!(count = violations.len(), "Submission blocked by local checks");
                for violation in &violations {
                    form.set_state(
                        violation.field.as_str(),
                        FieldState::Invalid,
                        Some(violation.message.clone()),
                    )?;
                    self.inner.ui.feedback().show_field(
                        &violation.field,
                        &FieldFeedback::invalid(Some(violation.message.clone())),
                    );
                    local_failures.insert(violation.field.clone());
                }
                return Err(SubmitError::ConstraintViolations(violations));
            }
            DeploymentRequest::from_form(&form)?
        };

        tracing::info!(mode = %request.mode(), "Submitting deployment");
        match submitter.submit(&request).await {
            Ok(receipt) => {
                let message = receipt.message().unwrap_or("Deployment submitted");
                self.inner.ui.notifier().notify(Notification::success(message));
                Ok(receipt)
            }
            Err(error) => {
                tracing::warn!(%error, "Deployment submission failed");
                self.inner
                    .ui
                    .notifier()
                    .notify(Notification::error(format!("Deployment failed: {error}")));
                Err(SubmitError::Transport(error))
            }
        }
    }

    /// Validation mode of the mounted form
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        self.inner.form.read().mode()
    }

    /// Current state of a field
    #[must_use]
    pub fn field_state(&self, field: &str) -> Option<FieldState> {
        self.inner.form.read().field(field).map(|f| f.state())
    }

    /// Message shown for a field while invalid
    #[must_use]
    pub fn field_message(&self, field: &str) -> Option<String> {
        self.inner
            .form
            .read()
            .field(field)
            .and_then(|f| f.message().map(str::to_string))
    }

    /// `(dispatched, applied)` sequence numbers of a field
    #[must_use]
    pub fn sequences(&self, field: &str) -> Option<(u64, u64)> {
        self.inner
            .tracks
            .get(field)
            .map(|t| (t.dispatched, t.applied))
    }

    /// Current values of all fields
    #[must_use]
    pub fn snapshot(&self) -> FormSnapshot {
        self.inner.form.read().snapshot()
    }

    /// True when every field is `Valid`
    #[must_use]
    pub fn overall_valid(&self) -> bool {
        self.inner.form.read().overall_valid()
    }

    /// Whether a debounce timer is running for `field`
    #[must_use]
    pub fn is_debouncing(&self, field: &str) -> bool {
        FieldName::new(field).is_ok_and(|name| self.inner.debouncer.is_pending(&name))
    }

    fn ensure_mounted(&self) -> Result<(), CoordinatorError> {
        if self.is_mounted() {
            Ok(())
        } else {
            Err(CoordinatorError::Unmounted)
        }
    }

    fn field_name(&self, field: &str) -> Result<FieldName, CoordinatorError> {
        self.inner
            .tracks
            .get(field)
            .map(|entry| entry.key().clone())
            .ok_or_else(|| deployer_form::FormError::UnknownField(field.to_string()).into())
    }
}

impl Drop for ValidationCoordinator {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for ValidationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationCoordinator")
            .field("mode", &self.mode())
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Returns the dispatched sequence, or `None` when unmounted
    fn on_debounce_elapsed(self: &Arc<Self>, field: &FieldName) -> Option<u64> {
        if !self.is_mounted() {
            return None;
        }

        let request = {
            let mut track = self.tracks.entry(field.clone()).or_default();
            track.dispatched += 1;
            let sequence = track.dispatched;

            let mut form = self.form.write();
            // Field membership is fixed at mount.
            let _ = form.set_state(field.as_str(), FieldState::Pending, None);
            self.local_failures.lock().remove(field);
            self.ui
                .feedback()
                .show_field(field, &FieldFeedback::state(FieldState::Pending));

            ValidationRequest {
                mode: form.mode(),
                field: field.clone(),
                sequence,
                config: form.snapshot(),
            }
        };

        let sequence = request.sequence;
        tracing::debug!(field = %field, sequence, "Dispatching validation request");

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            match inner.validator.validate(&request).await {
                Ok(response) => {
                    inner.on_validation_response(&request.field, &response, request.sequence);
                }
                Err(error) => {
                    inner.on_transport_failure(&request.field, &error, request.sequence);
                }
            }
        });

        Some(sequence)
    }

    fn on_validation_response(
        &self,
        field: &FieldName,
        response: &ValidationResponse,
        sequence: u64,
    ) -> Application {
        if !self.is_mounted() {
            return Application::Ignored;
        }

        let mut track = self.tracks.entry(field.clone()).or_default();
        if sequence <= track.applied {
            tracing::debug!(field = %field, sequence, applied = track.applied, "Discarding stale validation response");
            return Application::Stale;
        }
        track.applied = sequence;

        let (state, message) = if response.valid {
            (FieldState::Valid, None)
        } else {
            (
                FieldState::Invalid,
                message_for_field(field.as_str(), &response.errors).map(str::to_string),
            )
        };

        let mut form = self.form.write();
        let _ = form.set_state(field.as_str(), state, message.clone());
        self.local_failures.lock().remove(field);
        let attribution = attribute_errors(form.names(), &response.errors);
        drop(form);

        let feedback = self.ui.feedback();
        feedback.show_field(field, &FieldFeedback { state, message });
        feedback.show_form_errors(&attribution.unattributed);
        drop(track);

        tracing::debug!(field = %field, sequence, valid = response.valid, "Applied validation response");
        Application::Applied
    }

    fn on_transport_failure(
        &self,
        field: &FieldName,
        error: &TransportError,
        sequence: u64,
    ) -> Application {
        if !self.is_mounted() {
            return Application::Ignored;
        }

        tracing::warn!(field = %field, sequence, %error, "Validation request failed");
        if self.config.notify_failures {
            self.ui
                .notifier()
                .notify(Notification::error(format!("Validation failed: {error}")));
        }

        let mut track = self.tracks.entry(field.clone()).or_default();
        if sequence <= track.applied {
            return Application::Stale;
        }
        track.applied = sequence;

        let message = Some(format!("Could not validate: {error}"));
        let mut form = self.form.write();
        let _ = form.set_state(field.as_str(), FieldState::Invalid, message.clone());
        self.local_failures.lock().remove(field);
        drop(form);
        self.ui
            .feedback()
            .show_field(field, &FieldFeedback::invalid(message));
        drop(track);

        Application::Applied
    }
}
