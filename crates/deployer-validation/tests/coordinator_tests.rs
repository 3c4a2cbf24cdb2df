//! Debounce and sequencing behaviour of the validation coordinator.
//!
//! All tests run on a paused clock: sleeping advances virtual time, and the
//! runtime jumps straight to the next timer whenever every task is idle.

use deployer_form::{FieldState, Form};
use deployer_test_utils::{mount_recording, settle, ChannelValidator, UiEvent};
use deployer_validation::{Application, CoordinatorError, TransportError, ValidationResponse};
use pretty_assertions::assert_eq;
use std::time::Duration;

const DEBOUNCE: Duration = Duration::from_millis(300);

#[tokio::test(start_paused = true)]
async fn rapid_edits_dispatch_one_request_with_final_value() {
    let (validator, mut calls) = ChannelValidator::new();
    let (coordinator, _ui) = mount_recording(Form::simple(), validator, DEBOUNCE);

    coordinator.on_field_changed("resourceGroup", "a").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    coordinator.on_field_changed("resourceGroup", "ab").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    coordinator.on_field_changed("resourceGroup", "abc").unwrap();

    // Nothing leaves before the quiet period.
    tokio::time::sleep(Duration::from_millis(299)).await;
    assert!(calls.try_next().is_none());

    let call = calls.next().await;
    assert_eq!(call.request.field.as_str(), "resourceGroup");
    assert_eq!(call.request.sequence, 1);
    assert_eq!(call.request.config.get("resourceGroup"), Some("abc"));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(calls.try_next().is_none(), "exactly one request expected");
}

#[tokio::test(start_paused = true)]
async fn dispatch_marks_field_pending_and_snapshots_whole_form() {
    let (validator, mut calls) = ChannelValidator::new();
    let (coordinator, ui) = mount_recording(Form::simple(), validator, DEBOUNCE);

    coordinator.on_field_changed("location", "eastus").unwrap();
    coordinator.on_field_changed("vmSize", "Standard_D2s_v3").unwrap();

    let first = calls.next().await;
    assert_eq!(coordinator.field_state(first.request.field.as_str()), Some(FieldState::Pending));
    assert_eq!(first.request.config.len(), 4);
    assert_eq!(first.request.config.get("vmSize"), Some("Standard_D2s_v3"));
    assert_eq!(
        ui.field_updates("location").first().map(|f| f.state),
        Some(FieldState::Pending)
    );
}

#[tokio::test(start_paused = true)]
async fn fields_debounce_independently() {
    let (validator, mut calls) = ChannelValidator::new();
    let (coordinator, _ui) = mount_recording(Form::simple(), validator, DEBOUNCE);

    coordinator.on_field_changed("location", "eastus").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    coordinator.on_field_changed("vmSize", "Standard_D4s_v3").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    // Editing vmSize again must not push location back.
    coordinator.on_field_changed("vmSize", "Standard_D8s_v3").unwrap();

    let first = calls.next().await;
    assert_eq!(first.request.field.as_str(), "location");
    assert_eq!(first.request.sequence, 1);

    let second = calls.next().await;
    assert_eq!(second.request.field.as_str(), "vmSize");
    assert_eq!(second.request.sequence, 1);
    assert_eq!(second.request.config.get("vmSize"), Some("Standard_D8s_v3"));
}

#[tokio::test(start_paused = true)]
async fn older_response_arriving_late_is_discarded() {
    let (validator, mut calls) = ChannelValidator::new();
    let (coordinator, ui) = mount_recording(Form::simple(), validator, DEBOUNCE);

    coordinator.on_field_changed("resourceGroup", "a").unwrap();
    let first = calls.next().await;
    coordinator.on_field_changed("resourceGroup", "test-group").unwrap();
    let second = calls.next().await;
    assert_eq!((first.request.sequence, second.request.sequence), (1, 2));

    second.respond(ValidationResponse::valid());
    settle().await;
    assert_eq!(coordinator.field_state("resourceGroup"), Some(FieldState::Valid));

    first.respond(ValidationResponse::invalid([
        "resourceGroup: Resource group name must be 3-64 characters",
    ]));
    settle().await;

    assert_eq!(coordinator.field_state("resourceGroup"), Some(FieldState::Valid));
    assert_eq!(coordinator.field_message("resourceGroup"), None);
    assert_eq!(coordinator.sequences("resourceGroup"), Some((2, 2)));
    assert_eq!(
        ui.field_updates("resourceGroup").last().map(|f| f.state),
        Some(FieldState::Valid)
    );
}

#[tokio::test(start_paused = true)]
async fn in_order_responses_both_apply() {
    let (validator, mut calls) = ChannelValidator::new();
    let (coordinator, _ui) = mount_recording(Form::simple(), validator, DEBOUNCE);

    coordinator.on_field_changed("resourceGroup", "a").unwrap();
    let first = calls.next().await;
    coordinator.on_field_changed("resourceGroup", "test-group").unwrap();
    let second = calls.next().await;

    first.respond(ValidationResponse::invalid(["resourceGroup is too short"]));
    settle().await;
    assert_eq!(coordinator.field_state("resourceGroup"), Some(FieldState::Invalid));
    assert_eq!(
        coordinator.field_message("resourceGroup").as_deref(),
        Some("resourceGroup is too short")
    );

    second.respond(ValidationResponse::valid());
    settle().await;
    assert_eq!(coordinator.field_state("resourceGroup"), Some(FieldState::Valid));
}

#[tokio::test(start_paused = true)]
async fn equal_sequence_is_applied_once() {
    let (validator, _calls) = ChannelValidator::new();
    let (coordinator, ui) = mount_recording(Form::simple(), validator, DEBOUNCE);

    let response = ValidationResponse::valid();
    assert_eq!(
        coordinator.on_validation_response("location", &response, 1).unwrap(),
        Application::Applied
    );
    assert_eq!(
        coordinator.on_validation_response("location", &response, 1).unwrap(),
        Application::Stale
    );
    assert_eq!(ui.field_updates("location").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn errors_attributed_by_field_name() {
    let (validator, mut calls) = ChannelValidator::new();
    let (coordinator, ui) = mount_recording(Form::simple(), validator, DEBOUNCE);

    coordinator.on_field_changed("location", "mars").unwrap();
    calls.next().await.respond(ValidationResponse::invalid([
        "Subscription quota exceeded",
        "Invalid LOCATION. Must be one of: eastus, westus",
    ]));
    settle().await;

    assert_eq!(coordinator.field_state("location"), Some(FieldState::Invalid));
    assert_eq!(
        coordinator.field_message("location").as_deref(),
        Some("Invalid LOCATION. Must be one of: eastus, westus")
    );
    assert_eq!(ui.form_errors(), vec!["Subscription quota exceeded".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn transport_failure_notifies_and_next_edit_retries() {
    let (validator, mut calls) = ChannelValidator::new();
    let (coordinator, ui) = mount_recording(Form::simple(), validator, DEBOUNCE);

    coordinator.on_field_changed("nodeType", "validator").unwrap();
    calls.next().await.fail(TransportError::Status {
        status: 502,
        message: "bad gateway".into(),
    });
    settle().await;

    assert_eq!(coordinator.field_state("nodeType"), Some(FieldState::Invalid));
    let notifications = ui.notifications();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].message.contains("bad gateway"));
    assert!(!notifications[0].sticky);

    // No automatic retry.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(calls.try_next().is_none());

    coordinator.on_field_changed("nodeType", "observer").unwrap();
    let retry = calls.next().await;
    assert_eq!(retry.request.sequence, 2);
    retry.respond(ValidationResponse::valid());
    settle().await;
    assert_eq!(coordinator.field_state("nodeType"), Some(FieldState::Valid));
}

#[tokio::test(start_paused = true)]
async fn stale_failure_does_not_override_newer_result() {
    let (validator, mut calls) = ChannelValidator::new();
    let (coordinator, _ui) = mount_recording(Form::simple(), validator, DEBOUNCE);

    coordinator.on_field_changed("vmSize", "x").unwrap();
    let first = calls.next().await;
    coordinator.on_field_changed("vmSize", "Standard_D2s_v3").unwrap();
    let second = calls.next().await;

    second.respond(ValidationResponse::valid());
    settle().await;
    first.fail(TransportError::Request("timed out".into()));
    settle().await;

    assert_eq!(coordinator.field_state("vmSize"), Some(FieldState::Valid));
}

#[tokio::test(start_paused = true)]
async fn unmount_cancels_timers_and_ignores_late_results() {
    let (validator, mut calls) = ChannelValidator::new();
    let (coordinator, ui) = mount_recording(Form::simple(), validator, DEBOUNCE);

    coordinator.on_field_changed("location", "eastus").unwrap();
    let in_flight = calls.next().await;

    coordinator.on_field_changed("vmSize", "Standard_D2s_v3").unwrap();
    assert!(coordinator.is_debouncing("vmSize"));
    coordinator.unmount();
    assert!(!coordinator.is_mounted());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(calls.try_next().is_none());

    let before = ui.events().len();
    in_flight.respond(ValidationResponse::valid());
    settle().await;
    assert_eq!(ui.events().len(), before);

    assert!(matches!(
        coordinator.on_field_changed("location", "westus"),
        Err(CoordinatorError::Unmounted)
    ));
}

#[tokio::test(start_paused = true)]
async fn unknown_field_is_rejected() {
    let (validator, _calls) = ChannelValidator::new();
    let (coordinator, ui) = mount_recording(Form::simple(), validator, DEBOUNCE);

    assert!(matches!(
        coordinator.on_field_changed("subnetPrefix", "10.0.0.0/24"),
        Err(CoordinatorError::Form(_))
    ));
    assert!(ui
        .events()
        .iter()
        .all(|e| !matches!(e, UiEvent::Field(name, _) if name.as_str() == "subnetPrefix")));
}

#[tokio::test(start_paused = true)]
async fn explicit_dispatch_skips_the_timer() {
    let (validator, mut calls) = ChannelValidator::new();
    let (coordinator, _ui) = mount_recording(Form::simple(), validator, DEBOUNCE);

    coordinator.on_field_changed("location", "westus").unwrap();
    let sequence = coordinator.on_debounce_elapsed("location").unwrap();
    assert_eq!(sequence, 1);
    assert!(!coordinator.is_debouncing("location"));

    let call = calls.next().await;
    assert_eq!(call.request.config.get("location"), Some("westus"));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(calls.try_next().is_none());
}
