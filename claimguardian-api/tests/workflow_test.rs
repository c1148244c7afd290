mod common;

use common::*;
use secrecy::Secret;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn execution_body(id: &str, state: &str) -> serde_json::Value {
    json!({
        "id": id,
        "namespace": "claimguardian",
        "flowId": "bill-analysis",
        "state": {
            "current": state,
            "startDate": "2025-01-10T12:00:00Z",
            "endDate": "2025-01-10T12:00:42Z",
            "duration": "PT42S"
        },
        "taskRunList": [
            {
                "id": "run-1",
                "taskId": "extract_codes",
                "state": { "current": "SUCCESS" },
                "outputs": { "codes": ["99285"] }
            },
            {
                "id": "run-2",
                "taskId": "price_check",
                "state": { "current": "SUCCESS" }
            }
        ],
        "outputs": { "potential_savings": 2800 }
    })
}

fn app_with_orchestrator(server: &MockServer) -> axum::Router {
    let state = test_state().with_orchestrator(orchestrator(orchestrator_settings(&server.uri())));
    app(state)
}

#[tokio::test]
async fn results_require_an_execution_id() {
    let server = MockServer::start().await;
    let app = app_with_orchestrator(&server);

    let response = send(&app, get("/api/workflow/results")).await;
    assert_eq!(response.status(), 400);

    let response = send(&app, get("/api/workflow/results?execution_id=%20")).await;
    assert_eq!(response.status(), 400);

    let response = send(&app, get("/api/workflow/results?execution_id=..%2Fflows")).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn results_without_orchestrator_are_unavailable() {
    let app = app(test_state());

    let response = send(&app, get("/api/workflow/results?execution_id=abc")).await;

    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn successful_execution_is_republished() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/exec42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(execution_body("exec42", "SUCCESS")))
        .expect(1)
        .mount(&server)
        .await;
    let app = app_with_orchestrator(&server);

    let response = send(&app, get("/api/workflow/results?executionId=exec42")).await;

    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["execution_id"], "exec42");
    assert_eq!(body["flow_id"], "bill-analysis");
    assert_eq!(body["state"], "SUCCESS");
    assert_eq!(body["duration"], "PT42S");
    assert_eq!(body["is_terminal"], true);
    assert_eq!(body["is_success"], true);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 2);
    assert_eq!(body["tasks"][0]["task_id"], "extract_codes");
    assert_eq!(body["tasks"][0]["outputs"]["codes"][0], "99285");
    assert_eq!(body["outputs"]["potential_savings"], 2800);
}

#[tokio::test]
async fn running_execution_is_not_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/exec7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(execution_body("exec7", "RUNNING")))
        .mount(&server)
        .await;
    let app = app_with_orchestrator(&server);

    let body = body_json(send(&app, get("/api/workflow/results?execution_id=exec7")).await).await;

    assert_eq!(body["state"], "RUNNING");
    assert_eq!(body["is_terminal"], false);
    assert_eq!(body["is_success"], false);
}

#[tokio::test]
async fn unrecognized_state_is_republished_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/exec8"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(execution_body("exec8", "BREAKPOINT")),
        )
        .mount(&server)
        .await;
    let app = app_with_orchestrator(&server);

    let response = send(&app, get("/api/workflow/results?execution_id=exec8")).await;

    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["state"], "BREAKPOINT");
    assert_eq!(body["is_terminal"], false);
    assert_eq!(body["is_success"], false);
    assert_eq!(body["tasks"][0]["state"], "SUCCESS");
}

#[tokio::test]
async fn upstream_statuses_are_translated() {
    let server = MockServer::start().await;
    for (id, status) in [("missing", 404), ("denied", 401), ("forbidden", 403), ("broken", 500)] {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/executions/{}", id)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }
    let app = app_with_orchestrator(&server);

    let cases = [("missing", 404), ("denied", 500), ("forbidden", 500), ("broken", 502)];
    for (id, expected) in cases {
        let response = send(
            &app,
            get(&format!("/api/workflow/results?execution_id={}", id)),
        )
        .await;
        assert_eq!(response.status(), expected, "execution {}", id);
    }
}

#[tokio::test]
async fn unreachable_orchestrator_is_unavailable() {
    // Nothing listens on port 1.
    let app = app(test_state().with_orchestrator(orchestrator(orchestrator_settings(
        "http://127.0.0.1:1",
    ))));

    let response = send(&app, get("/api/workflow/results?execution_id=abc")).await;

    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn tenant_and_basic_auth_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/main/executions/exec9"))
        .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(execution_body("exec9", "FAILED")))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = orchestrator_settings(&server.uri());
    settings.tenant = Some("main".to_string());
    settings.username = Some("admin".to_string());
    settings.password = Some(Secret::new("secret".to_string()));
    let app = app(test_state().with_orchestrator(orchestrator(settings)));

    let response = send(&app, get("/api/workflow/results?execution_id=exec9")).await;

    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["is_terminal"], true);
    assert_eq!(body["is_success"], false);
}

#[tokio::test]
async fn trigger_starts_the_configured_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/executions/claimguardian/bill-analysis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "new-exec",
            "namespace": "claimguardian",
            "flowId": "bill-analysis",
            "state": { "current": "CREATED" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let app = app_with_orchestrator(&server);

    let response = send(
        &app,
        post_json(
            "/api/workflow/trigger",
            &json!({ "inputs": { "bill_text": "CPT 99285 $3,200", "patient_age": 54 } }),
        ),
    )
    .await;

    assert_eq!(response.status(), 202);
    let body = body_json(response).await;
    assert_eq!(body["execution_id"], "new-exec");
    assert_eq!(body["flow_id"], "bill-analysis");
    assert_eq!(body["state"], "CREATED");
}

#[tokio::test]
async fn trigger_for_missing_flow_is_404() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/executions/claimguardian/bill-analysis"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let app = app_with_orchestrator(&server);

    let response = send(&app, post_json("/api/workflow/trigger", &json!({}))).await;

    assert_eq!(response.status(), 404);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Flow claimguardian/bill-analysis not found");
}
