mod common;

use claimguardian_api::config::{ChatMode, Settings};
use claimguardian_api::services::inference::InferenceError;
use claimguardian_api::services::{ChatProxyClient, MockTextGenerator};
use claimguardian_api::AppState;
use common::*;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state_in_mode(mode: ChatMode) -> AppState {
    let mut settings = Settings::default();
    settings.chat.mode = mode;
    AppState::new(settings)
}

#[tokio::test]
async fn disabled_chat_is_not_implemented() {
    let app = app(test_state());

    let response = send(&app, post_json("/api/chat", &json!({ "message": "hi" }))).await;
    assert_eq!(response.status(), 501);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Chat is not implemented");

    // The stub answers the same whatever the body holds.
    let response = send(&app, post_json("/api/chat", &json!({ "nope": true }))).await;
    assert_eq!(response.status(), 501);
}

#[tokio::test]
async fn status_reports_mode_and_availability() {
    let disabled = app(test_state());
    let body = body_json(send(&disabled, get("/api/chat")).await).await;
    assert_eq!(body["mode"], "disabled");
    assert_eq!(body["available"], false);

    let inference = app(state_in_mode(ChatMode::Inference)
        .with_generator(Arc::new(MockTextGenerator::replying("hi"))));
    let body = body_json(send(&inference, get("/api/chat")).await).await;
    assert_eq!(body["mode"], "inference");
    assert_eq!(body["available"], true);
}

#[tokio::test]
async fn inference_chat_replies_with_model_output() {
    let generator = Arc::new(MockTextGenerator::replying("  A moderate complexity visit.  "));
    let app = app(state_in_mode(ChatMode::Inference).with_generator(generator.clone()));

    let response = send(
        &app,
        post_json(
            "/api/chat",
            &json!({
                "message": "What is 99214?",
                "history": [{ "role": "user", "content": "Hello" }]
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["reply"], "A moderate complexity visit.");
    assert_eq!(body["model"], "mock-billing-model");

    let prompt = generator.last_prompt().unwrap();
    assert!(prompt.contains("User: Hello\nUser: What is 99214?\nAssistant:"));
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let app = app(state_in_mode(ChatMode::Inference)
        .with_generator(Arc::new(MockTextGenerator::replying("unused"))));

    let response = send(&app, post_json("/api/chat", &json!({ "message": "  " }))).await;
    assert_eq!(response.status(), 400);

    let response = send(&app, post_json("/api/chat", &json!({}))).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn inference_chat_without_generator_is_unavailable() {
    let app = app(state_in_mode(ChatMode::Inference));

    let response = send(&app, post_json("/api/chat", &json!({ "message": "hi" }))).await;

    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn inference_chat_surfaces_rate_limits() {
    let app = app(state_in_mode(ChatMode::Inference)
        .with_generator(Arc::new(MockTextGenerator::failing(|| InferenceError::RateLimited))));

    let response = send(&app, post_json("/api/chat", &json!({ "message": "hi" }))).await;

    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn proxy_chat_republishes_upstream_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({ "message": "Is this bill fair?" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "reply": "Probably not." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let proxy = ChatProxyClient::new(format!("{}/api/chat", server.uri()), 5).unwrap();
    let app = app(state_in_mode(ChatMode::Proxy).with_chat_proxy(Arc::new(proxy)));

    let response = send(
        &app,
        post_json("/api/chat", &json!({ "message": "Is this bill fair?" })),
    )
    .await;

    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["reply"], "Probably not.");
}

#[tokio::test]
async fn proxy_chat_forwards_fields_it_does_not_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "message": "Why was 70450 billed twice?",
            "analysis_id": "a1",
            "context": { "insurer": "Aetna" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "Duplicate." })))
        .expect(1)
        .mount(&server)
        .await;

    let proxy = ChatProxyClient::new(format!("{}/api/chat", server.uri()), 5).unwrap();
    let app = app(state_in_mode(ChatMode::Proxy).with_chat_proxy(Arc::new(proxy)));

    let response = send(
        &app,
        post_json(
            "/api/chat",
            &json!({
                "message": "Why was 70450 billed twice?",
                "analysis_id": "a1",
                "context": { "insurer": "Aetna" }
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["reply"], "Duplicate.");
}

#[tokio::test]
async fn proxy_chat_keeps_upstream_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "error": "message too vague" })),
        )
        .mount(&server)
        .await;

    let proxy = ChatProxyClient::new(format!("{}/api/chat", server.uri()), 5).unwrap();
    let app = app(state_in_mode(ChatMode::Proxy).with_chat_proxy(Arc::new(proxy)));

    let response = send(&app, post_json("/api/chat", &json!({ "message": "hm" }))).await;

    assert_eq!(response.status(), 422);
    let body = body_json(response).await;
    assert_eq!(body["error"], "message too vague");
}

#[tokio::test]
async fn unreachable_proxy_is_unavailable() {
    let proxy = ChatProxyClient::new("http://127.0.0.1:1/api/chat".to_string(), 5).unwrap();
    let app = app(state_in_mode(ChatMode::Proxy).with_chat_proxy(Arc::new(proxy)));

    let response = send(&app, post_json("/api/chat", &json!({ "message": "hi" }))).await;

    assert_eq!(response.status(), 503);
}
