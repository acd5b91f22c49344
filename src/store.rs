//! A membership store backed by an in-memory snapshot.
//!
//! The snapshot can be loaded from a JSON file mapping household ids to their
//! member records:
//!
//! ```json
//! {
//!   "household-1": [
//!     { "uid": "1", "displayName": "Alice", "fcmTokens": ["t1", "t2"] },
//!     { "uid": "2", "displayName": "Bob" }
//!   ]
//! }
//! ```

use crate::domain::{HouseholdMember, MembershipStore};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tracing::info;

/// Serves household membership from memory.
#[derive(Debug, Default)]
pub struct InMemoryMembershipStore {
    households: RwLock<HashMap<String, Vec<HouseholdMember>>>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a membership snapshot from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Load(format!("{}: {}", path.display(), e)))?;
        let store = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            households = store.household_count(),
            "Loaded membership snapshot"
        );
        Ok(store)
    }

    pub fn from_json_str(content: &str) -> Result<Self, StoreError> {
        let households: HashMap<String, Vec<HouseholdMember>> =
            serde_json::from_str(content).map_err(|e| StoreError::Load(e.to_string()))?;
        Ok(Self {
            households: RwLock::new(households),
        })
    }

    /// Replaces the members of a household.
    pub fn insert_household(&self, household_id: &str, members: Vec<HouseholdMember>) {
        let mut households = self
            .households
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        households.insert(household_id.to_string(), members);
    }

    pub fn household_count(&self) -> usize {
        self.households
            .read()
            .map(|households| households.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn members(&self, household_id: &str) -> Result<Vec<HouseholdMember>, StoreError> {
        let households = self.households.read().map_err(|e| StoreError::Query {
            household_id: household_id.to_string(),
            reason: e.to_string(),
        })?;
        Ok(households.get(household_id).cloned().unwrap_or_default())
    }
}
