//! A transport that logs notifications instead of delivering them.
//!
//! Used for dry runs and local development, where no push credentials are
//! available.

use crate::dispatch::token_prefix;
use crate::domain::{PushData, PushTransport};
use crate::error::TransportError;
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTransport;

#[async_trait]
impl PushTransport for LoggingTransport {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &PushData,
    ) -> Result<(), TransportError> {
        info!(token = %token_prefix(token), title, body, ?data, "Push notification (dry run)");
        Ok(())
    }
}
