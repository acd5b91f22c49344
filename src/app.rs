//! The main application wiring, decoupled from the entry point.

use crate::{
    config::Config,
    domain::{MembershipStore, PushTransport},
    formatting::AmountFormatter,
    handlers::EventHandlers,
    server::{ServerState, TriggerServer},
    store::InMemoryMembershipStore,
    transport,
};
use anyhow::{anyhow, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, instrument};

/// A fully wired application.
pub struct App {
    config: Config,
    handlers: Arc<EventHandlers>,
    prometheus: Option<PrometheusHandle>,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The event handlers, for one-shot invocations.
    pub fn handlers(&self) -> Arc<EventHandlers> {
        self.handlers.clone()
    }

    /// Serves the HTTP trigger routes until the shutdown signal changes.
    pub async fn serve(self, listener: TcpListener, shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        let state = ServerState {
            handlers: self.handlers,
            prometheus: self.prometheus,
        };
        TriggerServer::new(listener, state, shutdown_rx).run().await;
        Ok(())
    }
}

/// Builder for the main application.
///
/// Collaborators are built from the configuration unless an override is
/// supplied, which is how tests substitute fakes.
pub struct AppBuilder {
    config: Config,
    store_override: Option<Arc<dyn MembershipStore>>,
    transport_override: Option<Arc<dyn PushTransport>>,
    prometheus: Option<PrometheusHandle>,
}

impl AppBuilder {
    /// Creates a new `AppBuilder` with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store_override: None,
            transport_override: None,
            prometheus: None,
        }
    }

    /// Overrides the membership store.
    pub fn store_override(mut self, store: Arc<dyn MembershipStore>) -> Self {
        self.store_override = Some(store);
        self
    }

    /// Overrides the push transport.
    pub fn transport_override(mut self, transport: Arc<dyn PushTransport>) -> Self {
        self.transport_override = Some(transport);
        self
    }

    /// Exposes the given Prometheus handle at `/metrics`.
    pub fn prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Builds all application components, returning a runnable `App`.
    #[instrument(skip_all)]
    pub fn build(self) -> Result<App> {
        let config = self.config;

        let formatter = AmountFormatter::new(&config.formatting.locale, &config.formatting.currency)?;

        let store = match self.store_override {
            Some(store) => store,
            None => {
                let path = config
                    .store
                    .members_path
                    .as_deref()
                    .ok_or_else(|| anyhow!("store.members_path is required"))?;
                Arc::new(InMemoryMembershipStore::from_json_file(path)?) as Arc<dyn MembershipStore>
            }
        };

        let transport = match self.transport_override {
            Some(transport) => transport,
            None => transport::from_config(&config.transport)?,
        };
        info!(
            transport = transport.name(),
            locale = formatter.locale(),
            currency = formatter.currency(),
            "Notification pipeline ready"
        );

        let handlers = Arc::new(EventHandlers::new(store, transport, formatter));
        Ok(App {
            config,
            handlers,
            prometheus: self.prometheus,
        })
    }
}
