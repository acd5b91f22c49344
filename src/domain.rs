//! Core domain types and collaborator traits for household-notify
//!
//! This module defines the records the notification pipeline reads, the
//! payloads it produces, and the trait contracts for the two external
//! collaborators it depends on: the household membership store and the
//! push-delivery transport.

use crate::error::{StoreError, TransportError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An opaque device delivery address understood by the push transport.
pub type Token = String;

/// String-only metadata attached to a push notification.
pub type PushData = BTreeMap<String, String>;

/// A participant of a household, as stored by the membership collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdMember {
    /// Unique actor identifier
    pub uid: String,
    #[serde(default)]
    pub display_name: String,
    /// Device tokens registered by this member, in registration order.
    /// Absent and `null` are both accepted.
    #[serde(default)]
    pub fcm_tokens: Option<Vec<Token>>,
}

impl HouseholdMember {
    /// Returns the member's registered tokens, empty when none are registered.
    pub fn tokens(&self) -> &[Token] {
        self.fcm_tokens.as_deref().unwrap_or_default()
    }
}

/// A monetary contribution recorded by a member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub by: String,
    pub by_display_name: String,
    pub amount: f64,
}

/// An expense recorded by a member against a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub by: String,
    pub by_display_name: String,
    pub amount: f64,
    pub category_id: String,
    pub category_name: String,
}

/// A request to announce that a monthly ledger was closed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthClosure {
    pub household_id: String,
    /// Period label, e.g. "2024-05"
    pub month: String,
    /// Balance carried over into the next month
    pub carry_over: f64,
}

/// The envelope the trigger infrastructure hands to a passive handler when a
/// record is created in a household sub-collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent<T> {
    pub household_id: String,
    /// Identifier of the created record (contribution or expense id)
    pub event_id: String,
    pub data: T,
}

/// The three kinds of events that produce notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Contribution,
    Expense,
    MonthClosure,
}

impl EventKind {
    /// The value sent in the `type` metadata field and used as a metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Contribution => "contribution",
            EventKind::Expense => "expense",
            EventKind::MonthClosure => "month_closure",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A borrowed view over any event the pipeline can fan out.
#[derive(Debug, Clone, Copy)]
pub enum DomainEvent<'a> {
    Contribution(&'a TriggerEvent<Contribution>),
    Expense(&'a TriggerEvent<Expense>),
    MonthClosure(&'a MonthClosure),
}

impl DomainEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::Contribution(_) => EventKind::Contribution,
            DomainEvent::Expense(_) => EventKind::Expense,
            DomainEvent::MonthClosure(_) => EventKind::MonthClosure,
        }
    }

    pub fn household_id(&self) -> &str {
        match self {
            DomainEvent::Contribution(event) => &event.household_id,
            DomainEvent::Expense(event) => &event.household_id,
            DomainEvent::MonthClosure(closure) => &closure.household_id,
        }
    }

    /// The member who caused the event. Month closures carry no actor.
    pub fn actor(&self) -> Option<&str> {
        match self {
            DomainEvent::Contribution(event) => Some(&event.data.by),
            DomainEvent::Expense(event) => Some(&event.data.by),
            DomainEvent::MonthClosure(_) => None,
        }
    }
}

/// A composed notification, ready to be delivered to each of its targets.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPayload {
    pub kind: EventKind,
    pub title: String,
    pub body: String,
    /// Transport metadata. Every value is a string.
    pub data: PushData,
    /// Recipient tokens, each present at most once
    pub targets: Vec<Token>,
}

/// Aggregate result of delivering one payload to all of its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub success_count: usize,
    pub failure_count: usize,
}

impl DispatchSummary {
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }
}

/// Response returned to the caller of a month-closure notification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureResponse {
    pub success: bool,
    pub sent_count: usize,
}

/// The identity attached to a direct request, as verified by the hosting layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Caller {
    uid: Option<String>,
}

impl Caller {
    pub fn authenticated(uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { uid: None }
    }

    /// The verified uid, if the caller is authenticated.
    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref().filter(|uid| !uid.is_empty())
    }
}

// =============================================================================
// Collaborator Traits
// =============================================================================

/// Read-only access to household membership
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Returns all members of a household.
    ///
    /// # Returns
    /// * `Ok(members)`, empty for a household without members
    /// * `Err` when the underlying query fails
    async fn members(&self, household_id: &str) -> Result<Vec<HouseholdMember>, StoreError>;
}

/// Delivers a single notification to a single device token
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// A short name for logs (e.g., "fcm", "log").
    fn name(&self) -> &str;

    /// Sends one notification to one token.
    ///
    /// # Returns
    /// * `Ok(())` when the transport accepted the message
    /// * `Err` for an invalid or expired token, a rejected request or a network failure
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &PushData,
    ) -> Result<(), TransportError>;
}
