//! Builds notification payloads from domain events.
//!
//! Every event kind is described by a [`KindProfile`]: whether the actor is
//! excluded from the recipients and the fixed notification title. Bodies are
//! rendered with the configured [`AmountFormatter`]; metadata carries the raw
//! numeric values so downstream consumers keep full precision.

use crate::domain::{DomainEvent, EventKind, NotificationPayload, PushData};
use crate::error::NotifyError;
use crate::formatting::AmountFormatter;

/// Per-kind configuration for the generic fan-out flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindProfile {
    /// Whether the member who caused the event is left out of the recipients.
    pub exclude_actor: bool,
    pub title: &'static str,
}

impl EventKind {
    pub fn profile(self) -> KindProfile {
        match self {
            EventKind::Contribution => KindProfile {
                exclude_actor: true,
                title: "💰 Nueva aportación",
            },
            EventKind::Expense => KindProfile {
                exclude_actor: true,
                title: "💸 Nuevo gasto",
            },
            EventKind::MonthClosure => KindProfile {
                exclude_actor: false,
                title: "📊 Mes cerrado",
            },
        }
    }
}

/// Composes the title, body and metadata of a notification.
#[derive(Debug, Clone, Default)]
pub struct MessageComposer {
    formatter: AmountFormatter,
}

impl MessageComposer {
    pub fn new(formatter: AmountFormatter) -> Self {
        Self { formatter }
    }

    /// Builds the payload for an event. The returned payload has no targets;
    /// the caller fills them in.
    ///
    /// Fails with [`NotifyError::InvalidAmount`] when the event's amount is
    /// NaN or infinite.
    pub fn compose(&self, event: &DomainEvent<'_>) -> Result<NotificationPayload, NotifyError> {
        let kind = event.kind();
        let mut data = PushData::new();
        data.insert("type".to_string(), kind.as_str().to_string());
        data.insert("householdId".to_string(), event.household_id().to_string());

        let body = match event {
            DomainEvent::Contribution(event) => {
                let contribution = &event.data;
                let amount = finite("amount", contribution.amount)?;
                data.insert("contributionId".to_string(), event.event_id.clone());
                data.insert("amount".to_string(), stringify_amount(amount));
                format!(
                    "{} aportó {}",
                    contribution.by_display_name,
                    self.formatter.format(amount)
                )
            }
            DomainEvent::Expense(event) => {
                let expense = &event.data;
                let amount = finite("amount", expense.amount)?;
                data.insert("expenseId".to_string(), event.event_id.clone());
                data.insert("categoryId".to_string(), expense.category_id.clone());
                data.insert("amount".to_string(), stringify_amount(amount));
                format!(
                    "{} gastó {} en {}",
                    expense.by_display_name,
                    self.formatter.format(amount),
                    expense.category_name
                )
            }
            DomainEvent::MonthClosure(closure) => {
                let carry_over = finite("carryOver", closure.carry_over)?;
                data.insert("month".to_string(), closure.month.clone());
                data.insert("carryOver".to_string(), stringify_amount(carry_over));
                format!(
                    "Se cerró el mes {}. Saldo para el siguiente mes: {}",
                    closure.month,
                    self.formatter.format(carry_over)
                )
            }
        };

        Ok(NotificationPayload {
            kind,
            title: kind.profile().title.to_string(),
            body,
            data,
            targets: Vec::new(),
        })
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, NotifyError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NotifyError::InvalidAmount { field, value })
    }
}

/// Stringifies a raw amount for metadata: shortest round-trip digits, no
/// grouping, no trailing ".0", and negative zero as "0".
pub fn stringify_amount(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}
