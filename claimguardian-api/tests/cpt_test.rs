mod common;

use common::*;
use serde_json::json;

#[tokio::test]
async fn malformed_codes_are_rejected() {
    let app = app(test_state());

    for code in ["9921", "992145", "99214-", "ABCDE", "99214-ABC", ""] {
        let response = send(&app, post_json("/api/cpt/lookup", &json!({ "code": code }))).await;
        assert_eq!(response.status(), 400, "code {:?}", code);
    }
}

#[tokio::test]
async fn missing_code_is_rejected() {
    let app = app(test_state());

    let response = send(&app, post_json("/api/cpt/lookup", &json!({}))).await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn known_code_returns_fixed_description() {
    let app = app(test_state());

    let response = send(&app, post_json("/api/cpt/lookup", &json!({ "code": "99214" }))).await;

    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["code"], "99214");
    assert_eq!(body["found"], true);
    assert_eq!(body["category"], "Evaluation and Management");
    assert_eq!(
        body["description"],
        "Office or other outpatient visit for the evaluation and management of an established patient, moderate complexity"
    );
    assert!(body.get("modifier").is_none());
}

#[tokio::test]
async fn unknown_code_gets_fallback() {
    let app = app(test_state());

    let response = send(&app, post_json("/api/cpt/lookup", &json!({ "code": "12345" }))).await;

    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["found"], false);
    assert_eq!(body["category"], "Unknown");
    assert_eq!(
        body["description"],
        "Procedure code 12345 (description unavailable)"
    );
}

#[tokio::test]
async fn modifier_is_normalized_and_reported() {
    let app = app(test_state());

    let response = send(
        &app,
        post_json("/api/cpt/lookup", &json!({ "code": " 70553-tc " })),
    )
    .await;

    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["code"], "70553-TC");
    assert_eq!(body["modifier"], "TC");
    assert_eq!(body["category"], "Radiology");
    assert_eq!(body["found"], true);
}
