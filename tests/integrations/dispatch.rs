//! Integration tests for the per-token fan-out.

use household_notify::{
    dispatch::DispatchEngine, test_utils::RecordingTransport, DispatchSummary, EventKind,
    NotificationPayload, PushData,
};
use std::sync::Arc;

fn payload(targets: &[&str]) -> NotificationPayload {
    let mut data = PushData::new();
    data.insert("type".to_string(), "expense".to_string());
    NotificationPayload {
        kind: EventKind::Expense,
        title: "💸 Nuevo gasto".to_string(),
        body: "Bob gastó $10.00 en Casa".to_string(),
        data,
        targets: targets.iter().map(|t| t.to_string()).collect(),
    }
}

#[tokio::test]
async fn test_sends_run_concurrently() {
    // Arrange
    let transport = RecordingTransport::new();
    let engine = DispatchEngine::new(Arc::new(transport.clone()));
    let targets = ["t1", "t2", "t3", "t4", "t5"];

    // Act
    let report = engine.dispatch_all(&payload(&targets)).await;

    // Assert: every send was pending before any of them completed.
    assert_eq!(report.summary().success_count, targets.len());
    assert_eq!(transport.max_in_flight(), targets.len());
}

#[tokio::test]
async fn test_every_target_is_accounted_for() {
    let transport = RecordingTransport::new();
    transport.fail_token("t2");
    transport.fail_token("t4");
    let engine = DispatchEngine::new(Arc::new(transport.clone()));

    let report = engine
        .dispatch_all(&payload(&["t1", "t2", "t3", "t4"]))
        .await;

    assert_eq!(
        report.summary(),
        DispatchSummary {
            success_count: 2,
            failure_count: 2
        }
    );
    assert_eq!(report.failed_tokens().collect::<Vec<_>>(), vec!["t2", "t4"]);
    let outcome_tokens: Vec<_> = report.outcomes.iter().map(|o| o.token.as_str()).collect();
    assert_eq!(outcome_tokens, vec!["t1", "t2", "t3", "t4"]);
    assert_eq!(transport.attempt_count(), 4);
}

#[tokio::test]
async fn test_payload_is_delivered_unchanged() {
    let transport = RecordingTransport::new();
    let engine = DispatchEngine::new(Arc::new(transport.clone()));
    let payload = payload(&["t1"]);

    engine.dispatch_all(&payload).await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, payload.title);
    assert_eq!(sent[0].body, payload.body);
    assert_eq!(sent[0].data, payload.data);
}

#[tokio::test]
async fn test_empty_target_list_is_a_no_op() {
    let transport = RecordingTransport::new();
    let engine = DispatchEngine::new(Arc::new(transport.clone()));

    let report = engine.dispatch_all(&payload(&[])).await;

    assert_eq!(report.kind, EventKind::Expense);
    assert!(report.outcomes.is_empty());
    assert_eq!(transport.attempt_count(), 0);
}
