//! Fake collaborators for exercising the pipeline without real infrastructure.

use crate::{
    domain::{HouseholdMember, MembershipStore, PushData, PushTransport},
    error::{StoreError, TransportError},
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One push captured by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentPush {
    pub token: String,
    pub title: String,
    pub body: String,
    pub data: PushData,
}

/// Fake push transport that records deliveries and fails configured tokens
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<SentPush>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    attempts: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every send to `token` fail as an unregistered device.
    pub fn fail_token(&self, token: &str) {
        self.failing.lock().unwrap().insert(token.to_string());
    }

    /// Successful deliveries, in completion order.
    pub fn sent(&self) -> Vec<SentPush> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_tokens(&self) -> Vec<String> {
        self.sent().into_iter().map(|push| push.token).collect()
    }

    /// Number of `send` calls, successful or not.
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// The highest number of sends that were pending at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushTransport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &PushData,
    ) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        // Give the other sends of the batch a chance to start.
        tokio::task::yield_now().await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(token) {
            return Err(TransportError::Rejected {
                status: 404,
                body: "UNREGISTERED".to_string(),
            });
        }

        self.sent.lock().unwrap().push(SentPush {
            token: token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            data: data.clone(),
        });
        Ok(())
    }
}

/// Wraps a store and counts how often it is queried
pub struct CountingStore<S> {
    inner: S,
    calls: Arc<AtomicUsize>,
}

impl<S: MembershipStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: MembershipStore> MembershipStore for CountingStore<S> {
    async fn members(&self, household_id: &str) -> Result<Vec<HouseholdMember>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.members(household_id).await
    }
}

/// A store whose every query fails
#[derive(Debug, Clone)]
pub struct FailingStore {
    reason: String,
}

impl FailingStore {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl MembershipStore for FailingStore {
    async fn members(&self, household_id: &str) -> Result<Vec<HouseholdMember>, StoreError> {
        Err(StoreError::Query {
            household_id: household_id.to_string(),
            reason: self.reason.clone(),
        })
    }
}
