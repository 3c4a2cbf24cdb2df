//! Commands against a mock backend

use deployer_cli::commands::{self, DeployOutcome};
use deployer_cli::{DeployerConfig, DeploymentInput};
use deployer_client::DeployerClient;
use deployer_form::ValidationMode;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup(server: &MockServer) -> (DeployerClient, DeployerConfig) {
    let mut config = DeployerConfig::new().with_base_url(server.uri());
    config.progress_step_ms = 1;
    let client = DeployerClient::new(config.client_config().unwrap()).unwrap();
    (client, config)
}

fn simple_input(location: &str) -> DeploymentInput {
    DeploymentInput::from_toml(&format!(
        r#"
        mode = "simple"

        [values]
        resourceGroup = "prod-nodes"
        location = "{location}"
        nodeType = "validator"
        vmSize = "Standard_D2s_v3"
        "#
    ))
    .unwrap()
}

#[tokio::test]
async fn validate_reports_field_feedback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate/simple"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": false,
            "errors": ["Invalid location. Must be one of: eastus, westus", "Quota exceeded"]
        })))
        .expect(4)
        .mount(&server)
        .await;

    let (client, config) = setup(&server);
    let form = simple_input("eastus").into_form(None).unwrap();
    let report = commands::validate_remote(&client, form, &config, Duration::from_secs(5))
        .await
        .unwrap();

    assert!(!report.valid);
    assert!(!report.timed_out);
    assert!(report
        .feedback
        .contains("location [is-invalid] Invalid location. Must be one of: eastus, westus"));
    assert!(report.feedback.contains("! Quota exceeded"));
    assert!(report.alerts.is_empty());
}

#[tokio::test]
async fn validate_all_valid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate/simple"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "valid": true, "errors": [] })),
        )
        .mount(&server)
        .await;

    let (client, config) = setup(&server);
    let form = simple_input("westus").into_form(None).unwrap();
    let report = commands::validate_remote(&client, form, &config, Duration::from_secs(5))
        .await
        .unwrap();

    assert!(report.valid);
    assert_eq!(report.feedback.lines().count(), 4);
}

#[tokio::test]
async fn deploy_submits_then_runs_stages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/deployer/deploy"))
        .and(body_partial_json(json!({ "mode": "simple", "location": "eastus" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Deployment started" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, config) = setup(&server);
    let form = simple_input("eastus").into_form(Some(ValidationMode::Simple)).unwrap();
    let mut stages = Vec::new();
    let outcome = commands::deploy(&client, form, &config, |stage| stages.push(stage.percent()))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DeployOutcome::Submitted {
            alerts: vec!["Deployment started".to_string()]
        }
    );
    assert_eq!(stages, vec![16, 33, 50, 66, 83, 100]);
}

#[tokio::test]
async fn deploy_blocked_locally_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, config) = setup(&server);
    let form = DeploymentInput::default().into_form(None).unwrap();
    let outcome = commands::deploy(&client, form, &config, |_| {}).await.unwrap();

    let DeployOutcome::Blocked { feedback } = outcome else {
        panic!("expected a blocked deployment");
    };
    assert_eq!(feedback.matches("[is-invalid]").count(), 4);
}

#[tokio::test]
async fn deploy_rejected_by_backend_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/deployer/deploy"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "quota exceeded in eastus" })),
        )
        .mount(&server)
        .await;

    let (client, config) = setup(&server);
    let form = simple_input("eastus").into_form(None).unwrap();
    let error = commands::deploy(&client, form, &config, |_| {})
        .await
        .unwrap_err();
    assert!(format!("{error:#}").contains("quota exceeded in eastus"));
}

#[tokio::test]
async fn chat_and_actions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "<b>4</b>" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_string("action=deploy_vm&config=vm_name%3Dnode-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "VM queued" })))
        .mount(&server)
        .await;

    let (client, _) = setup(&server);
    let transcript = commands::chat(&client, "how many validators?").await.unwrap();
    assert_eq!(transcript.render(), "you: how many validators?\nassistant: <b>4</b>\n");

    let blank = commands::chat(&client, "   ").await.unwrap();
    assert!(blank.is_empty());

    let (selected, result) = commands::run_action(&client, "deploy_vm", "vm_name=node-1")
        .await
        .unwrap();
    assert_eq!(selected, "You selected: deploy_vm");
    assert_eq!(result, "VM queued");
}
