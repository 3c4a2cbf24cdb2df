//! Testing utilities for the deployer workspace
//!
//! Shared fakes for the coordinator's seams:
//! - `ChannelValidator`: every call waits until the test answers it
//! - `ScriptedValidator` / `ScriptedSubmitter`: answer immediately
//! - `RecordingUi`: records everything shown on screen

#![allow(missing_docs)]

use deployer_form::{DeploymentRequest, FieldName, Form};
use deployer_validation::{
    CoordinatorConfig, DeploymentSubmitter, FeedbackSink, FieldFeedback, Notification,
    NotificationId, Notifier, RemoteValidator, SubmitReceipt, TransportError, UiContext,
    ValidationCoordinator, ValidationRequest, ValidationResponse,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// One validation call waiting for the test to answer
#[derive(Debug)]
pub struct PendingCall {
    pub request: ValidationRequest,
    reply: oneshot::Sender<Result<ValidationResponse, TransportError>>,
}

impl PendingCall {
    pub fn respond(self, response: ValidationResponse) {
        let _ = self.reply.send(Ok(response));
    }

    pub fn fail(self, error: TransportError) {
        let _ = self.reply.send(Err(error));
    }
}

/// Validator whose calls are answered by the test, in any order
#[derive(Debug)]
pub struct ChannelValidator {
    calls: mpsc::UnboundedSender<PendingCall>,
}

/// Receiving side of a `ChannelValidator`
#[derive(Debug)]
pub struct CallQueue {
    calls: mpsc::UnboundedReceiver<PendingCall>,
}

impl ChannelValidator {
    pub fn new() -> (Arc<Self>, CallQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { calls: tx }), CallQueue { calls: rx })
    }
}

#[async_trait::async_trait]
impl RemoteValidator for ChannelValidator {
    async fn validate(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationResponse, TransportError> {
        let (reply, answer) = oneshot::channel();
        self.calls
            .send(PendingCall {
                request: request.clone(),
                reply,
            })
            .map_err(|_| TransportError::Closed)?;
        answer.await.map_err(|_| TransportError::Closed)?
    }
}

impl CallQueue {
    /// Wait for the next call
    pub async fn next(&mut self) -> PendingCall {
        self.calls.recv().await.expect("validator dropped")
    }

    /// Next call if one is already queued
    pub fn try_next(&mut self) -> Option<PendingCall> {
        self.calls.try_recv().ok()
    }
}

type Script = dyn Fn(&ValidationRequest) -> Result<ValidationResponse, TransportError> + Send + Sync;

/// Validator answering from a closure, recording every request
pub struct ScriptedValidator {
    script: Box<Script>,
    requests: Mutex<Vec<ValidationRequest>>,
}

impl ScriptedValidator {
    pub fn new<F>(script: F) -> Arc<Self>
    where
        F: Fn(&ValidationRequest) -> Result<ValidationResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Accept everything
    pub fn accepting() -> Arc<Self> {
        Self::new(|_| Ok(ValidationResponse::valid()))
    }

    pub fn requests(&self) -> Vec<ValidationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl RemoteValidator for ScriptedValidator {
    async fn validate(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationResponse, TransportError> {
        self.requests.lock().push(request.clone());
        (self.script)(request)
    }
}

/// Submitter answering from a queue of results
#[derive(Debug, Default)]
pub struct ScriptedSubmitter {
    results: Mutex<VecDeque<Result<SubmitReceipt, TransportError>>>,
    requests: Mutex<Vec<DeploymentRequest>>,
}

impl ScriptedSubmitter {
    pub fn new(results: Vec<Result<SubmitReceipt, TransportError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<DeploymentRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl DeploymentSubmitter for ScriptedSubmitter {
    async fn submit(&self, request: &DeploymentRequest) -> Result<SubmitReceipt, TransportError> {
        self.requests.lock().push(request.clone());
        self.results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(SubmitReceipt(serde_json::json!({ "result": "ok" }))))
    }
}

/// Something the coordinator showed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Field(FieldName, FieldFeedback),
    FormErrors(Vec<String>),
    Notified(NotificationId, Notification),
    Dismissed(NotificationId),
}

/// Feedback sink and notifier that only record
#[derive(Debug, Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn context(self: &Arc<Self>) -> UiContext {
        UiContext::new(self.clone(), self.clone())
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().clone()
    }

    /// Feedback shown for one field, oldest first
    pub fn field_updates(&self, field: &str) -> Vec<FieldFeedback> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                UiEvent::Field(name, feedback) if name.as_str() == field => Some(feedback.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                UiEvent::Notified(_, n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    /// Latest form-level error list
    pub fn form_errors(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .rev()
            .find_map(|e| match e {
                UiEvent::FormErrors(errors) => Some(errors.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

impl FeedbackSink for RecordingUi {
    fn show_field(&self, field: &FieldName, feedback: &FieldFeedback) {
        self.events
            .lock()
            .push(UiEvent::Field(field.clone(), feedback.clone()));
    }

    fn show_form_errors(&self, errors: &[String]) {
        self.events.lock().push(UiEvent::FormErrors(errors.to_vec()));
    }
}

impl Notifier for RecordingUi {
    fn notify(&self, notification: Notification) -> NotificationId {
        let id = NotificationId::new();
        self.events.lock().push(UiEvent::Notified(id, notification));
        id
    }

    fn dismiss(&self, id: NotificationId) {
        self.events.lock().push(UiEvent::Dismissed(id));
    }
}

/// Mount a coordinator with a recording UI and the given debounce
pub fn mount_recording(
    form: Form,
    validator: Arc<dyn RemoteValidator>,
    debounce: Duration,
) -> (ValidationCoordinator, Arc<RecordingUi>) {
    let ui = RecordingUi::new();
    let coordinator = ValidationCoordinator::mount(
        form,
        validator,
        ui.context(),
        CoordinatorConfig::new().with_debounce(debounce),
    );
    (coordinator, ui)
}

/// Let spawned tasks run to quiescence under a paused clock
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// A simple form with every field filled with acceptable values
pub fn filled_simple_form() -> Form {
    let mut form = Form::simple();
    for (name, value) in [
        ("resourceGroup", "test-group"),
        ("location", "eastus"),
        ("nodeType", "validator"),
        ("vmSize", "Standard_D2s_v3"),
    ] {
        form.set_value(name, value).expect("simple form field");
    }
    form
}
