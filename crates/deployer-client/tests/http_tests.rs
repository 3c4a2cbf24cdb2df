//! HTTP client against a mock backend

use deployer_client::{ClientConfig, DeployerClient, Prediction, ValidationEndpoint};
use deployer_form::{DeploymentRequest, FieldName, FieldState, Form, ValidationMode};
use deployer_test_utils::{filled_simple_form, mount_recording};
use deployer_validation::{
    DeploymentSubmitter, RemoteValidator, TransportError, ValidationRequest, ValidationResponse,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> DeployerClient {
    DeployerClient::new(ClientConfig::new(&server.uri()).unwrap()).unwrap()
}

fn request_for(form: &Form, field: &str, sequence: u64) -> ValidationRequest {
    ValidationRequest {
        mode: form.mode(),
        field: FieldName::new(field).unwrap(),
        sequence,
        config: form.snapshot(),
    }
}

#[tokio::test]
async fn validation_posts_snapshot_to_mode_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate/simple"))
        .and(body_json(json!({
            "config": {
                "resourceGroup": "test-group",
                "location": "eastus",
                "nodeType": "validator",
                "vmSize": "Standard_D2s_v3"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": false,
            "errors": ["Invalid VM size. Must be one of: Standard_D2s_v3"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let form = filled_simple_form();
    let response = client(&server)
        .validate(&request_for(&form, "vmSize", 1))
        .await
        .unwrap();
    assert_eq!(
        response,
        ValidationResponse::invalid(["Invalid VM size. Must be one of: Standard_D2s_v3"])
    );
}

#[tokio::test]
async fn single_field_endpoint_accepts_error_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate_config"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "valid": false, "error": "Invalid JSON format" })),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::new(&server.uri())
        .unwrap()
        .with_validation_endpoint(ValidationEndpoint::SingleField);
    let client = DeployerClient::new(config).unwrap();

    let response = client
        .validate(&request_for(&Form::simple(), "location", 3))
        .await
        .unwrap();
    assert_eq!(response.first_error(), Some("Invalid JSON format"));

    let text = client.validate_config("{not json").await.unwrap();
    assert_eq!(
        deployer_client::describe_config_check(&text),
        "Invalid configuration: Invalid JSON format"
    );
}

#[tokio::test]
async fn non_2xx_is_a_status_error_with_backend_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate/expert"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "validator crashed" })),
        )
        .mount(&server)
        .await;

    let form = Form::for_mode(ValidationMode::Expert);
    let error = client(&server)
        .validate(&request_for(&form, "nodeCount", 1))
        .await
        .unwrap_err();
    assert_eq!(
        error,
        TransportError::Status {
            status: 500,
            message: "validator crashed".into()
        }
    );
    assert!(error.is_retryable());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate/simple"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = client(&server)
        .validate(&request_for(&Form::simple(), "location", 1))
        .await
        .unwrap_err();
    assert!(matches!(error, TransportError::Decode(_)));
}

#[tokio::test]
async fn unreachable_backend_is_a_request_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let config = ClientConfig::new(&uri)
        .unwrap()
        .with_timeout(Duration::from_secs(2));
    let error = DeployerClient::new(config)
        .unwrap()
        .chat("hello")
        .await
        .unwrap_err();
    assert!(matches!(error, TransportError::Request(_)));
}

#[tokio::test]
async fn deployment_payload_is_mode_tagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/deployer/deploy"))
        .and(body_partial_json(json!({
            "mode": "simple",
            "resourceGroup": "test-group",
            "vmSize": "Standard_D2s_v3"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "queued" })))
        .expect(1)
        .mount(&server)
        .await;

    let request = DeploymentRequest::from_form(&filled_simple_form()).unwrap();
    let receipt = client(&server).submit(&request).await.unwrap();
    assert_eq!(receipt.message(), Some("queued"));
}

#[tokio::test]
async fn predict_and_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_json(json!({ "config": "{\"vm_name\": \"node-1\"}" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "prediction": "Standard_D4s_v3" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({ "message": "how many nodes?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "This is a placeholder response from the LLM."
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let prediction = client.predict("{\"vm_name\": \"node-1\"}").await.unwrap();
    assert_eq!(
        prediction,
        Prediction::Value {
            prediction: json!("Standard_D4s_v3")
        }
    );
    assert_eq!(prediction.to_string(), "Prediction: Standard_D4s_v3");

    let reply = client.chat("how many nodes?").await.unwrap();
    assert_eq!(reply, "This is a placeholder response from the LLM.");
}

#[tokio::test]
async fn execute_posts_action_and_config_as_a_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("action=deploy_vm&config=size%3Dlarge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "VM queued" })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server).execute("deploy_vm", "size=large").await.unwrap();
    assert_eq!(result, "VM queued");
}

#[tokio::test]
async fn coordinator_round_trip_through_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate/simple"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "valid": true })))
        .expect(1)
        .mount(&server)
        .await;

    let validator = Arc::new(client(&server));
    let (coordinator, ui) =
        mount_recording(Form::simple(), validator, Duration::from_millis(20));

    for value in ["t", "te", "test-group"] {
        coordinator.on_field_changed("resourceGroup", value).unwrap();
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while coordinator.field_state("resourceGroup") != Some(FieldState::Valid) {
        assert!(tokio::time::Instant::now() < deadline, "validation never applied");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(coordinator.sequences("resourceGroup"), Some((1, 1)));
    assert_eq!(
        ui.field_updates("resourceGroup")
            .iter()
            .map(|f| f.state)
            .collect::<Vec<_>>(),
        vec![FieldState::Pending, FieldState::Valid]
    );
}
