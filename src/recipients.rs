//! Resolves the device tokens that should receive a household notification.

use crate::domain::{MembershipStore, Token};
use crate::error::NotifyError;
use itertools::Itertools;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Turns a household scope into a de-duplicated list of delivery tokens.
#[derive(Clone)]
pub struct RecipientResolver {
    store: Arc<dyn MembershipStore>,
}

impl RecipientResolver {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    /// Collects the tokens of every member of `household_id`, skipping the
    /// member whose uid equals `exclude_uid`.
    ///
    /// Members without tokens contribute nothing. A token shared by several
    /// members is returned once, at its first position. A token owned by the
    /// excluded member is never returned, even when another member also
    /// registered it.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        household_id: &str,
        exclude_uid: Option<&str>,
    ) -> Result<Vec<Token>, NotifyError> {
        let members = self.store.members(household_id).await?;
        debug!(members = members.len(), "Fetched household members");

        let actor_tokens: HashSet<&str> = members
            .iter()
            .filter(|member| exclude_uid == Some(member.uid.as_str()))
            .flat_map(|member| member.tokens().iter().map(String::as_str))
            .collect();

        let tokens: Vec<Token> = members
            .iter()
            .filter(|member| {
                if exclude_uid == Some(member.uid.as_str()) {
                    debug!(uid = %member.uid, "Skipping actor");
                    return false;
                }
                if member.tokens().is_empty() {
                    debug!(uid = %member.uid, "Member has no registered tokens");
                    return false;
                }
                true
            })
            .flat_map(|member| member.tokens().iter())
            .filter(|token| !token.is_empty() && !actor_tokens.contains(token.as_str()))
            .unique()
            .cloned()
            .collect();

        debug!(tokens = tokens.len(), "Resolved recipient tokens");
        Ok(tokens)
    }
}
