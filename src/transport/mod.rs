//! Push-delivery transports.
//!
//! Every transport implements [`PushTransport`](crate::domain::PushTransport)
//! and delivers exactly one notification to exactly one token per call.
pub mod fcm;
pub mod logging;

pub use fcm::FcmTransport;
pub use logging::LoggingTransport;

use crate::config::{TransportConfig, TransportKind};
use crate::domain::PushTransport;
use anyhow::{anyhow, Result};
use std::sync::Arc;

/// Builds the transport selected by the configuration.
pub fn from_config(config: &TransportConfig) -> Result<Arc<dyn PushTransport>> {
    match config.kind {
        TransportKind::Log => Ok(Arc::new(LoggingTransport)),
        TransportKind::Fcm => {
            let fcm = config
                .fcm
                .as_ref()
                .ok_or_else(|| anyhow!("transport.fcm is required for the Fcm transport"))?;
            Ok(Arc::new(FcmTransport::new(fcm)?))
        }
    }
}
