//! Per-token fan-out of a composed notification.
//!
//! Each target gets its own transport call. All calls run concurrently and are
//! joined before the report is built, so one stale token never blocks or
//! cancels delivery to the others.

use crate::domain::{DispatchSummary, EventKind, NotificationPayload, PushTransport, Token};
use crate::error::TransportError;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Number of leading token characters included in log lines.
const TOKEN_LOG_PREFIX: usize = 20;

/// The result of delivering to one token.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub token: Token,
    /// The delivery error, kept for logging only.
    pub error: Option<TransportError>,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Every per-token outcome of one dispatch, in target order.
#[derive(Debug)]
pub struct DispatchReport {
    pub kind: EventKind,
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchReport {
    pub fn empty(kind: EventKind) -> Self {
        Self {
            kind,
            outcomes: Vec::new(),
        }
    }

    pub fn summary(&self) -> DispatchSummary {
        let success_count = self.outcomes.iter().filter(|o| o.is_success()).count();
        DispatchSummary {
            success_count,
            failure_count: self.outcomes.len() - success_count,
        }
    }

    pub fn failed_tokens(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.token.as_str())
    }
}

/// Delivers payloads through a [`PushTransport`].
#[derive(Clone)]
pub struct DispatchEngine {
    transport: Arc<dyn PushTransport>,
}

impl DispatchEngine {
    pub fn new(transport: Arc<dyn PushTransport>) -> Self {
        Self { transport }
    }

    /// Sends `payload` to each of its targets.
    ///
    /// Never fails: delivery errors are recorded in the report. An empty
    /// target list returns an empty report without touching the transport.
    #[instrument(skip_all, fields(kind = %payload.kind, targets = payload.targets.len()))]
    pub async fn dispatch_all(&self, payload: &NotificationPayload) -> DispatchReport {
        if payload.targets.is_empty() {
            debug!("No targets, skipping dispatch");
            return DispatchReport::empty(payload.kind);
        }

        let start = Instant::now();
        info!(
            transport = self.transport.name(),
            "Sending notification to {} tokens",
            payload.targets.len()
        );

        let sends = payload
            .targets
            .iter()
            .map(|token| self.send_one(token, payload));
        let outcomes = join_all(sends).await;

        let report = DispatchReport {
            kind: payload.kind,
            outcomes,
        };
        let summary = report.summary();
        let kind = payload.kind.as_str();
        metrics::counter!("notifications_sent_total", "kind" => kind)
            .increment(summary.success_count as u64);
        metrics::counter!("notifications_failed_total", "kind" => kind)
            .increment(summary.failure_count as u64);
        metrics::histogram!("dispatch_duration_seconds", "kind" => kind)
            .record(start.elapsed().as_secs_f64());

        info!(
            success_count = summary.success_count,
            failure_count = summary.failure_count,
            "Dispatch finished"
        );
        report
    }

    async fn send_one(&self, token: &str, payload: &NotificationPayload) -> DispatchOutcome {
        let result = self
            .transport
            .send(token, &payload.title, &payload.body, &payload.data)
            .await;
        match result {
            Ok(()) => {
                debug!(token = %token_prefix(token), "Notification delivered");
                DispatchOutcome {
                    token: token.to_string(),
                    error: None,
                }
            }
            Err(e) => {
                warn!(token = %token_prefix(token), error = %e, "Notification delivery failed");
                DispatchOutcome {
                    token: token.to_string(),
                    error: Some(e),
                }
            }
        }
    }
}

/// Shortens a token for logging, followed by an ellipsis when truncated.
pub(crate) fn token_prefix(token: &str) -> String {
    match token.char_indices().nth(TOKEN_LOG_PREFIX) {
        Some((end, _)) => format!("{}...", &token[..end]),
        None => token.to_string(),
    }
}
