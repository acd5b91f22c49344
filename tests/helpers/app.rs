#![allow(dead_code)]
//! Test helpers for running the trigger server.

use anyhow::Result;
use household_notify::{
    app::App, config::Config, test_utils::RecordingTransport, MembershipStore,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::{net::TcpListener, sync::watch, task::JoinHandle, time::timeout};

/// A running trigger server bound to an ephemeral port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub transport: RecordingTransport,
    pub client: reqwest::Client,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<Result<()>>,
}

impl TestApp {
    /// Builds the app around `store` and a fresh [`RecordingTransport`], then serves it.
    pub async fn spawn(store: Arc<dyn MembershipStore>) -> Result<Self> {
        let transport = RecordingTransport::new();
        let app = App::builder(Config::default())
            .store_override(store)
            .transport_override(Arc::new(transport.clone()))
            .build()?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(app.serve(listener, shutdown_rx));

        Ok(Self {
            addr,
            transport,
            client: reqwest::Client::new(),
            shutdown_tx,
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Shuts down the server and waits for it to terminate.
    /// Fails if the server does not shut down within the specified timeout.
    pub async fn shutdown(self, timeout_duration: Duration) -> Result<()> {
        self.shutdown_tx.send(true).ok();
        timeout(timeout_duration, self.handle).await???;
        Ok(())
    }
}
