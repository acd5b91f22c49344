//! # Trigger Server
//!
//! An `axum` server that lets the hosting infrastructure invoke the event
//! handlers over HTTP:
//!
//! - `POST /households/{household_id}/contributions/{contribution_id}`
//! - `POST /households/{household_id}/expenses/{expense_id}`
//! - `POST /month-closure`, authenticated through the `x-authenticated-uid`
//!   header set by the gateway in front of this service
//! - `GET /healthz`
//! - `GET /metrics` when a Prometheus handle is configured
//!
//! The server shuts down gracefully when the shutdown channel changes.

use crate::domain::{Caller, Contribution, DispatchSummary, Expense, MonthClosure, TriggerEvent};
use crate::error::HandlerError;
use crate::handlers::EventHandlers;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Header carrying the uid verified by the authenticating gateway.
pub const AUTHENTICATED_UID_HEADER: &str = "x-authenticated-uid";

/// Shared state for the request handlers.
#[derive(Clone)]
pub struct ServerState {
    pub handlers: Arc<EventHandlers>,
    pub prometheus: Option<PrometheusHandle>,
}

/// Builds the router with every trigger route.
pub fn router(state: ServerState) -> Router {
    let mut router = Router::new()
        .route(
            "/households/{household_id}/contributions/{contribution_id}",
            post(contribution_created),
        )
        .route(
            "/households/{household_id}/expenses/{expense_id}",
            post(expense_created),
        )
        .route("/month-closure", post(month_closure))
        .route("/healthz", get(|| async { "ok" }));

    if let Some(handle) = state.prometheus.clone() {
        router = router.route(
            "/metrics",
            get(move || {
                let handle = handle.clone();
                async move { handle.render() }
            }),
        );
    }

    router.with_state(state)
}

async fn contribution_created(
    State(state): State<ServerState>,
    Path((household_id, event_id)): Path<(String, String)>,
    Json(data): Json<Contribution>,
) -> (StatusCode, Json<Option<DispatchSummary>>) {
    let event = TriggerEvent {
        household_id,
        event_id,
        data,
    };
    let summary = state.handlers.on_contribution_created(&event).await;
    (StatusCode::ACCEPTED, Json(summary))
}

async fn expense_created(
    State(state): State<ServerState>,
    Path((household_id, event_id)): Path<(String, String)>,
    Json(data): Json<Expense>,
) -> (StatusCode, Json<Option<DispatchSummary>>) {
    let event = TriggerEvent {
        household_id,
        event_id,
        data,
    };
    let summary = state.handlers.on_expense_created(&event).await;
    (StatusCode::ACCEPTED, Json(summary))
}

async fn month_closure(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Result<Json<MonthClosure>, JsonRejection>,
) -> Response {
    let caller = headers
        .get(AUTHENTICATED_UID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(Caller::authenticated)
        .unwrap_or_default();

    // Identity is checked before the body is looked at.
    if caller.uid().is_none() {
        warn!("Rejected month closure request without caller identity");
        return HandlerError::Unauthenticated.into_response();
    }
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection.into_response(),
    };

    match state
        .handlers
        .request_month_closure_notification(&caller, &request)
        .await
    {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = match self {
            HandlerError::Unauthenticated => StatusCode::UNAUTHORIZED,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({ "code": self.code(), "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Serves the trigger routes on an already-bound listener.
pub struct TriggerServer {
    listener: TcpListener,
    router: Router,
    shutdown_rx: watch::Receiver<bool>,
}

impl TriggerServer {
    pub fn new(listener: TcpListener, state: ServerState, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            listener,
            router: router(state),
            shutdown_rx,
        }
    }

    /// Returns a future that runs the server until a shutdown signal is received.
    pub fn run(self) -> impl Future<Output = ()> {
        let mut shutdown_rx = self.shutdown_rx;
        let addr = self.listener.local_addr().ok();
        async move {
            info!(?addr, "Trigger server listening");
            let shutdown = async move {
                shutdown_rx.changed().await.ok();
                info!("Trigger server received shutdown signal");
            };
            if let Err(e) = axum::serve(self.listener, self.router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("Trigger server error: {}", e);
            }
            info!("Trigger server finished");
        }
    }
}
