//! Error types for the notification pipeline.

use thiserror::Error;

/// Failure of the household membership collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("membership query for household {household_id} failed: {reason}")]
    Query {
        household_id: String,
        reason: String,
    },

    #[error("failed to load membership snapshot: {0}")]
    Load(String),
}

/// A single push delivery attempt failed.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("push request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("push rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("push credentials unavailable: {0}")]
    Credentials(String),
}

/// Errors raised while resolving recipients or composing a notification.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifyError {
    #[error("recipient resolution failed: {0}")]
    Resolution(#[from] StoreError),

    #[error("{field} must be a finite number, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("unsupported currency format {locale}/{currency}")]
    UnsupportedLocale { locale: String, currency: String },
}

/// Errors surfaced to the caller of a direct (request/response) operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("User must be authenticated")]
    Unauthenticated,

    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    /// The stable error code reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            HandlerError::Unauthenticated => "unauthenticated",
            HandlerError::Internal(_) => "internal",
        }
    }
}
