//! household-notify - Push notifications for shared household finances
//!
//! This library fans out notifications about contributions, expenses and
//! month closures to the other members of a household, delivering to each
//! device token independently.

pub mod app;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod formatting;
pub mod handlers;
pub mod internal_metrics;
pub mod message;
pub mod recipients;
pub mod server;
pub mod store;
#[cfg(feature = "test-utils")]
pub mod test_utils;
pub mod transport;

// Re-export domain types for convenience
pub use domain::*;
