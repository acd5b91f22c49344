#![allow(dead_code)]
//! Shared fixtures for the integration tests.

pub mod app;

use household_notify::{
    store::InMemoryMembershipStore, Contribution, Expense, HouseholdMember, MonthClosure,
    TriggerEvent,
};

pub const HOUSEHOLD: &str = "household-1";

pub fn member(uid: &str, display_name: &str, tokens: &[&str]) -> HouseholdMember {
    HouseholdMember {
        uid: uid.to_string(),
        display_name: display_name.to_string(),
        fcm_tokens: Some(tokens.iter().map(|t| t.to_string()).collect()),
    }
}

/// A household with Alice (uid 1, tokens t1 and t2) and Bob (uid 2, token t3).
pub fn alice_and_bob() -> InMemoryMembershipStore {
    store_with(vec![
        member("1", "Alice", &["t1", "t2"]),
        member("2", "Bob", &["t3"]),
    ])
}

pub fn store_with(members: Vec<HouseholdMember>) -> InMemoryMembershipStore {
    let store = InMemoryMembershipStore::new();
    store.insert_household(HOUSEHOLD, members);
    store
}

pub fn contribution(by: &str, by_display_name: &str, amount: f64) -> TriggerEvent<Contribution> {
    TriggerEvent {
        household_id: HOUSEHOLD.to_string(),
        event_id: "contribution-1".to_string(),
        data: Contribution {
            by: by.to_string(),
            by_display_name: by_display_name.to_string(),
            amount,
        },
    }
}

pub fn expense(
    by: &str,
    by_display_name: &str,
    amount: f64,
    category_name: &str,
) -> TriggerEvent<Expense> {
    TriggerEvent {
        household_id: HOUSEHOLD.to_string(),
        event_id: "expense-1".to_string(),
        data: Expense {
            by: by.to_string(),
            by_display_name: by_display_name.to_string(),
            amount,
            category_id: format!("cat-{}", category_name.to_lowercase()),
            category_name: category_name.to_string(),
        },
    }
}

pub fn month_closure(month: &str, carry_over: f64) -> MonthClosure {
    MonthClosure {
        household_id: HOUSEHOLD.to_string(),
        month: month.to_string(),
        carry_over,
    }
}
