//! Configuration management for household-notify
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to layer defaults, a `household-notify.toml` file, environment
//! variables and command-line arguments.

use crate::cli::Cli;
use crate::formatting::AmountFormatter;
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Currency rendering used in notification bodies.
    pub formatting: FormattingConfig,
    /// Where household membership is read from.
    pub store: StoreConfig,
    /// Push delivery settings.
    pub transport: TransportConfig,
    /// The HTTP trigger server.
    pub server: ServerConfig,
    /// Prometheus metrics exposure.
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FormattingConfig {
    pub locale: String,
    pub currency: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct StoreConfig {
    /// Path to a JSON membership snapshot.
    pub members_path: Option<PathBuf>,
}

/// Which push transport delivers notifications.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Firebase Cloud Messaging HTTP v1 API
    Fcm,
    /// Log each push instead of sending it
    Log,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Fcm => write!(f, "FCM"),
            TransportKind::Log => write!(f, "Log"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TransportConfig {
    pub kind: TransportKind,
    /// Required when `kind` is `Fcm`.
    pub fcm: Option<FcmConfig>,
}

/// Configuration for the FCM HTTP v1 client.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FcmConfig {
    /// The Firebase project that owns the device tokens.
    pub project_id: String,
    /// OAuth2 bearer token with the `firebase.messaging` scope.
    #[serde(default)]
    pub access_token: String,
    /// File holding the bearer token, re-read before every send. Takes
    /// precedence over `access_token`. Point it at the output of whatever
    /// refreshes the token, e.g. a metadata-server sidecar.
    #[serde(default)]
    pub access_token_file: Option<PathBuf>,
    /// Base URL of the FCM API.
    #[serde(default = "default_fcm_endpoint")]
    pub endpoint: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_fcm_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_fcm_endpoint() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_fcm_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// The address the trigger server listens on.
    pub listen_addr: SocketAddr,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct MetricsConfig {
    /// Expose Prometheus metrics at `/metrics` on the trigger server.
    pub enabled: bool,
}

impl Config {
    /// Loads the application configuration.
    ///
    /// Sources are merged in order: built-in defaults, the TOML file named by
    /// `--config` (if any), `HOUSEHOLD_NOTIFY_*` environment variables (nested
    /// keys separated by `__`), then command-line arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = &cli.config {
            figment = figment.merge(Toml::file(path));
        }
        let config: Config = figment
            // e.g., HOUSEHOLD_NOTIFY_TRANSPORT__KIND=Fcm
            .merge(Env::prefixed("HOUSEHOLD_NOTIFY_").split("__"))
            .merge(cli.clone())
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.transport.kind == TransportKind::Fcm && self.transport.fcm.is_none() {
            bail!("transport.kind is Fcm but no [transport.fcm] section was provided");
        }
        if let Some(fcm) = &self.transport.fcm {
            if fcm.project_id.is_empty() {
                bail!("transport.fcm.project_id must not be empty");
            }
            if fcm.access_token.is_empty() && fcm.access_token_file.is_none() {
                bail!("transport.fcm needs either access_token or access_token_file");
            }
        }
        AmountFormatter::new(&self.formatting.locale, &self.formatting.currency)?;
        Ok(())
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            formatting: FormattingConfig {
                locale: "es-MX".to_string(),
                currency: "MXN".to_string(),
            },
            store: StoreConfig { members_path: None },
            transport: TransportConfig {
                kind: TransportKind::Log,
                fcm: None,
            },
            server: ServerConfig {
                listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            },
            metrics: MetricsConfig { enabled: false },
        }
    }
}
