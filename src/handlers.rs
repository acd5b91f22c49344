//! Entry points invoked by the trigger infrastructure.
//!
//! All three handlers run the same fan-out flow: resolve recipients, compose
//! the message, dispatch it. They differ only in how a failure of that flow is
//! reported. Passive triggers (a contribution or expense was created) log and
//! swallow it so the infrastructure never retries; the month-closure request
//! has a caller waiting and gets a typed error back.

use crate::{
    dispatch::{DispatchEngine, DispatchReport},
    domain::{
        Caller, ClosureResponse, Contribution, DispatchSummary, DomainEvent, EventKind, Expense,
        MembershipStore, MonthClosure, PushTransport, TriggerEvent,
    },
    error::{HandlerError, NotifyError},
    formatting::AmountFormatter,
    message::MessageComposer,
    recipients::RecipientResolver,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// The notification pipeline and its three entry points.
#[derive(Clone)]
pub struct EventHandlers {
    resolver: RecipientResolver,
    composer: MessageComposer,
    engine: DispatchEngine,
}

impl EventHandlers {
    pub fn new(
        store: Arc<dyn MembershipStore>,
        transport: Arc<dyn PushTransport>,
        formatter: AmountFormatter,
    ) -> Self {
        Self {
            resolver: RecipientResolver::new(store),
            composer: MessageComposer::new(formatter),
            engine: DispatchEngine::new(transport),
        }
    }

    /// Notifies the other members of a household about a new contribution.
    ///
    /// Returns `None` when the pipeline failed; the failure is logged.
    #[instrument(skip_all, fields(household_id = %event.household_id, contribution_id = %event.event_id))]
    pub async fn on_contribution_created(
        &self,
        event: &TriggerEvent<Contribution>,
    ) -> Option<DispatchSummary> {
        self.notify_passive(DomainEvent::Contribution(event)).await
    }

    /// Notifies the other members of a household about a new expense.
    ///
    /// Returns `None` when the pipeline failed; the failure is logged.
    #[instrument(skip_all, fields(household_id = %event.household_id, expense_id = %event.event_id))]
    pub async fn on_expense_created(&self, event: &TriggerEvent<Expense>) -> Option<DispatchSummary> {
        self.notify_passive(DomainEvent::Expense(event)).await
    }

    /// Announces a month closure to every member of the household, the caller
    /// included.
    ///
    /// # Errors
    /// * [`HandlerError::Unauthenticated`] if the caller has no verified identity.
    ///   Nothing is resolved or sent in that case.
    /// * [`HandlerError::Internal`] if recipients could not be resolved or the
    ///   message could not be composed.
    #[instrument(skip_all, fields(household_id = %request.household_id, month = %request.month))]
    pub async fn request_month_closure_notification(
        &self,
        caller: &Caller,
        request: &MonthClosure,
    ) -> Result<ClosureResponse, HandlerError> {
        let Some(uid) = caller.uid() else {
            warn!("Rejected month closure notification from unauthenticated caller");
            record_trigger(EventKind::MonthClosure, "unauthenticated");
            return Err(HandlerError::Unauthenticated);
        };
        info!(caller = uid, "Month closure notification requested");

        match self.fan_out(DomainEvent::MonthClosure(request)).await {
            Ok(report) => {
                let summary = report.summary();
                info!(
                    success_count = summary.success_count,
                    failure_count = summary.failure_count,
                    "Month closure notification sent"
                );
                record_trigger(EventKind::MonthClosure, "ok");
                Ok(ClosureResponse {
                    success: true,
                    sent_count: summary.success_count,
                })
            }
            Err(e) => {
                error!(error = %e, "Error sending month closure notification");
                record_trigger(EventKind::MonthClosure, "failed");
                Err(HandlerError::Internal(e.to_string()))
            }
        }
    }

    /// Runs the pipeline and converts any failure into a logged no-op.
    async fn notify_passive(&self, event: DomainEvent<'_>) -> Option<DispatchSummary> {
        info!(kind = %event.kind(), "Trigger started");
        match self.fan_out(event).await {
            Ok(report) => {
                let summary = report.summary();
                info!(
                    success_count = summary.success_count,
                    failure_count = summary.failure_count,
                    "Trigger finished"
                );
                record_trigger(event.kind(), "ok");
                Some(summary)
            }
            Err(e) => {
                error!(error = %e, kind = %event.kind(), "Trigger failed, no notifications sent");
                record_trigger(event.kind(), "failed");
                None
            }
        }
    }

    /// Resolves, composes and dispatches the notification for one event.
    async fn fan_out(&self, event: DomainEvent<'_>) -> Result<DispatchReport, NotifyError> {
        let kind = event.kind();
        let exclude_uid = if kind.profile().exclude_actor {
            event.actor()
        } else {
            None
        };

        let targets = self
            .resolver
            .resolve(event.household_id(), exclude_uid)
            .await?;
        if targets.is_empty() {
            warn!(kind = %kind, "No tokens to send notifications to");
            return Ok(DispatchReport::empty(kind));
        }

        let mut payload = self.composer.compose(&event)?;
        payload.targets = targets;
        Ok(self.engine.dispatch_all(&payload).await)
    }
}

fn record_trigger(kind: EventKind, outcome: &'static str) {
    metrics::counter!("triggers_total", "kind" => kind.as_str(), "outcome" => outcome).increment(1);
}
