//! Tests for the HTTP trigger routes, exercised over a real socket.

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::{alice_and_bob, app::TestApp, HOUSEHOLD};
use household_notify::{
    server::AUTHENTICATED_UID_HEADER,
    test_utils::{CountingStore, FailingStore},
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_contribution_route_fans_out() {
    // Arrange
    let app = TestApp::spawn(Arc::new(alice_and_bob())).await.unwrap();

    // Act
    let response = app
        .client
        .post(app.url(&format!("/households/{}/contributions/c-42", HOUSEHOLD)))
        .json(&json!({"by": "1", "byDisplayName": "Alice", "amount": 150.5}))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"successCount": 1, "failureCount": 0}));
    let sent = app.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].data["contributionId"], "c-42");

    app.shutdown(SHUTDOWN_TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn test_expense_route_reports_null_on_pipeline_failure() {
    let app = TestApp::spawn(Arc::new(FailingStore::new("unavailable")))
        .await
        .unwrap();

    let response = app
        .client
        .post(app.url(&format!("/households/{}/expenses/e-1", HOUSEHOLD)))
        .json(&json!({
            "by": "2",
            "byDisplayName": "Bob",
            "amount": 80,
            "categoryId": "cat-1",
            "categoryName": "Comida"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, Value::Null);
    assert_eq!(app.transport.attempt_count(), 0);

    app.shutdown(SHUTDOWN_TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn test_month_closure_without_identity_is_unauthorized() {
    // Arrange
    let store = Arc::new(CountingStore::new(alice_and_bob()));
    let app = TestApp::spawn(store.clone()).await.unwrap();

    // Act
    let response = app
        .client
        .post(app.url("/month-closure"))
        .json(&json!({"householdId": HOUSEHOLD, "month": "2024-05", "carryOver": 10}))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"code": "unauthenticated", "message": "User must be authenticated"})
    );
    assert_eq!(store.call_count(), 0);
    assert_eq!(app.transport.attempt_count(), 0);

    app.shutdown(SHUTDOWN_TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn test_month_closure_checks_identity_before_body() {
    // Arrange
    let store = Arc::new(CountingStore::new(alice_and_bob()));
    let app = TestApp::spawn(store.clone()).await.unwrap();

    // Act: an anonymous caller with an incomplete body.
    let response = app
        .client
        .post(app.url("/month-closure"))
        .json(&json!({"householdId": HOUSEHOLD}))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "unauthenticated");
    assert_eq!(store.call_count(), 0);

    // The same body from an identified caller is a client error.
    let response = app
        .client
        .post(app.url("/month-closure"))
        .header(AUTHENTICATED_UID_HEADER, "1")
        .json(&json!({"householdId": HOUSEHOLD}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.call_count(), 0);

    app.shutdown(SHUTDOWN_TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn test_month_closure_with_identity_reports_sent_count() {
    let app = TestApp::spawn(Arc::new(alice_and_bob())).await.unwrap();

    let response = app
        .client
        .post(app.url("/month-closure"))
        .header(AUTHENTICATED_UID_HEADER, "1")
        .json(&json!({"householdId": HOUSEHOLD, "month": "2024-05", "carryOver": -25}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "sentCount": 3}));

    app.shutdown(SHUTDOWN_TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn test_month_closure_store_failure_is_internal() {
    let app = TestApp::spawn(Arc::new(FailingStore::new("unavailable")))
        .await
        .unwrap();

    let response = app
        .client
        .post(app.url("/month-closure"))
        .header(AUTHENTICATED_UID_HEADER, "1")
        .json(&json!({"householdId": HOUSEHOLD, "month": "2024-05", "carryOver": 0}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "internal");

    app.shutdown(SHUTDOWN_TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn test_malformed_body_is_a_client_error() {
    let app = TestApp::spawn(Arc::new(alice_and_bob())).await.unwrap();

    let response = app
        .client
        .post(app.url(&format!("/households/{}/contributions/c-1", HOUSEHOLD)))
        .json(&json!({"by": "1"}))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(app.transport.attempt_count(), 0);

    app.shutdown(SHUTDOWN_TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn test_health_and_shutdown() {
    let app = TestApp::spawn(Arc::new(alice_and_bob())).await.unwrap();

    let response = app.client.get(app.url("/healthz")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");

    // Without a Prometheus handle the metrics route is not mounted.
    let response = app.client.get(app.url("/metrics")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.shutdown(SHUTDOWN_TIMEOUT).await.unwrap();
}
