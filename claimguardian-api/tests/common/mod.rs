//! Shared helpers for the claimguardian-api router tests.
//!
//! Every test drives `build_router` in-process through `tower::ServiceExt`;
//! outbound collaborators are either mocks or `wiremock` servers.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response},
    Router,
};
use claimguardian_api::{
    build_router,
    config::{InferenceSettings, OrchestratorSettings, Settings},
    services::{HostedModelClient, OrchestratorClient},
    AppState,
};
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub fn test_state() -> AppState {
    AppState::new(Settings::default())
}

pub fn app(state: AppState) -> Router {
    build_router(state)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone()
        .oneshot(request)
        .await
        .expect("router never fails")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Adds `Cookie: claimguardian_session={session_id}`.
pub fn with_session(mut request: Request<Body>, session_id: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::COOKIE,
        format!("claimguardian_session={}", session_id)
            .parse()
            .unwrap(),
    );
    request
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn orchestrator_settings(url: &str) -> OrchestratorSettings {
    OrchestratorSettings {
        url: url.to_string(),
        namespace: "claimguardian".to_string(),
        flow_id: "bill-analysis".to_string(),
        tenant: None,
        username: None,
        password: None,
        timeout_secs: 5,
    }
}

pub fn orchestrator(settings: OrchestratorSettings) -> Arc<OrchestratorClient> {
    Arc::new(OrchestratorClient::new(settings).expect("Failed to build orchestrator client"))
}

pub fn hosted_model(endpoint: &str) -> Arc<HostedModelClient> {
    Arc::new(
        HostedModelClient::new(InferenceSettings {
            endpoint: endpoint.to_string(),
            api_key: Some(Secret::new("test-key".to_string())),
            model: "claimguardian-test-model".to_string(),
            timeout_secs: 5,
        })
        .expect("Failed to build inference client"),
    )
}
