mod common;

use claimguardian_api::services::inference::InferenceError;
use claimguardian_api::services::MockTextGenerator;
use common::*;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VERDICTS: &str = r#"Assessment follows.
[
  {"claim": "CPT 99285 was billed", "status": "SUPPORTED", "confidence": 0.96},
  {"claim": "The bill is 8x the Medicare rate", "status": "SUPPORTED", "confidence": 0.74},
  {"claim": "The patient was admitted", "status": "UNSUPPORTED", "confidence": 0.9}
]"#;

async fn model_server(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn app_with_model(server: &MockServer) -> axum::Router {
    let endpoint = format!("{}/generate", server.uri());
    app(test_state().with_generator(hosted_model(&endpoint)))
}

#[tokio::test]
async fn generated_text_is_extracted_from_every_shape() {
    let shapes = [
        json!([{ "generated_text": "Overcharge likely." }]),
        json!({ "generated_text": "Overcharge likely." }),
        json!({ "choices": [{ "text": "Overcharge likely." }] }),
        json!({ "choices": [{ "message": { "role": "assistant", "content": "Overcharge likely." } }] }),
        json!({ "output": "Overcharge likely." }),
        json!({ "outputs": "Overcharge likely." }),
        json!("Overcharge likely."),
    ];

    for shape in shapes {
        let server = model_server(ResponseTemplate::new(200).set_body_json(shape.clone())).await;
        let app = app_with_model(&server);

        let response = send(&app, post_json("/api/oumi", &json!({ "text": "CPT 99285 $3,200" }))).await;

        assert_eq!(response.status(), 200, "shape {}", shape);
        let body = body_json(response).await;
        assert_eq!(body["generated_text"], "Overcharge likely.");
        assert_eq!(body["model"], "claimguardian-test-model");
    }
}

#[tokio::test]
async fn request_carries_clamped_parameters_and_token() {
    let cases = [
        (json!(100000), 2048),
        (json!(-5), 1),
        (json!(5000000000u64), 2048),
    ];

    for (requested, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "inputs": "Is 99214 at $450 fair?",
                "parameters": { "max_new_tokens": expected, "return_full_text": false }
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "generated_text": "ok" }])),
            )
            .expect(1)
            .mount(&server)
            .await;
        let app = app_with_model(&server);

        let response = send(
            &app,
            post_json(
                "/api/oumi",
                &json!({ "prompt": "Is 99214 at $450 fair?", "max_new_tokens": requested }),
            ),
        )
        .await;

        assert_eq!(response.status(), 200, "max_new_tokens {requested}");
    }
}

#[tokio::test]
async fn upstream_failures_are_translated() {
    let cases = [
        (ResponseTemplate::new(503).set_body_string("loading"), 503),
        (ResponseTemplate::new(429), 503),
        (ResponseTemplate::new(500), 502),
        (ResponseTemplate::new(200).set_body_json(json!({ "error": "no" })), 502),
        (ResponseTemplate::new(200).set_body_string("not json"), 502),
    ];

    for (template, expected) in cases {
        let server = model_server(template).await;
        let app = app_with_model(&server);

        let response = send(&app, post_json("/api/oumi", &json!({ "input": "hello" }))).await;

        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn unreachable_model_is_unavailable() {
    let app = app(test_state().with_generator(hosted_model("http://127.0.0.1:1/generate")));

    let response = send(&app, post_json("/api/oumi", &json!({ "text": "hello" }))).await;

    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn blank_or_missing_text_is_rejected() {
    let app = app(test_state().with_generator(Arc::new(MockTextGenerator::replying("unused"))));

    let response = send(&app, post_json("/api/oumi", &json!({ "text": "   " }))).await;
    assert_eq!(response.status(), 400);

    let response = send(&app, post_json("/api/oumi", &json!({ "max_new_tokens": 10 }))).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn inference_without_endpoint_is_unavailable() {
    let app = app(test_state());

    let response = send(&app, post_json("/api/oumi", &json!({ "text": "hello" }))).await;

    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn verification_counts_supported_claims() {
    let generator = Arc::new(MockTextGenerator::replying(VERDICTS));
    let app = app(test_state().with_generator(generator.clone()));

    let response = send(
        &app,
        post_json(
            "/api/oumi/verify",
            &json!({
                "context": "ER visit. CPT 99285 billed at $3,200.",
                "analysis": "CPT 99285 was billed. The bill is 8x the Medicare rate.",
                "threshold": 0.8
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["claims_verified"], 3);
    assert_eq!(body["claims_supported"], 1);
    assert_eq!(body["claims_unsupported"], 2);
    assert_eq!(body["threshold"], 0.8);
    assert_eq!(body["details"][2]["status"], "UNSUPPORTED");

    let prompt = generator.last_prompt().unwrap();
    assert!(prompt.contains("<context>\nER visit. CPT 99285 billed at $3,200.\n</context>"));
    assert!(prompt.contains("<claims>"));
}

#[tokio::test]
async fn verification_uses_default_threshold() {
    let app = app(test_state().with_generator(Arc::new(MockTextGenerator::replying(VERDICTS))));

    let response = send(
        &app,
        post_json(
            "/api/oumi/verify",
            &json!({ "context": "bill", "analysis": "claims" }),
        ),
    )
    .await;

    let body = body_json(response).await;
    assert_eq!(body["threshold"], 0.7);
    assert_eq!(body["claims_supported"], 2);
}

#[tokio::test]
async fn verification_rejects_blank_inputs() {
    let app = app(test_state().with_generator(Arc::new(MockTextGenerator::replying(VERDICTS))));

    let response = send(
        &app,
        post_json("/api/oumi/verify", &json!({ "context": " ", "analysis": "claims" })),
    )
    .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn unparsable_verdicts_are_a_bad_gateway() {
    let app = app(test_state().with_generator(Arc::new(MockTextGenerator::replying(
        "Everything looks supported to me.",
    ))));

    let response = send(
        &app,
        post_json("/api/oumi/verify", &json!({ "context": "bill", "analysis": "claims" })),
    )
    .await;

    assert_eq!(response.status(), 502);
}

#[tokio::test]
async fn verification_surfaces_model_loading() {
    let app = app(test_state().with_generator(Arc::new(MockTextGenerator::failing(|| {
        InferenceError::ModelLoading("estimated_time 20s".to_string())
    }))));

    let response = send(
        &app,
        post_json("/api/oumi/verify", &json!({ "context": "bill", "analysis": "claims" })),
    )
    .await;

    assert_eq!(response.status(), 503);
}
