//! A client for sending notifications through Firebase Cloud Messaging.

use crate::config::FcmConfig;
use crate::domain::{PushData, PushTransport};
use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Where the bearer token of each request comes from.
#[derive(Debug, Clone, PartialEq)]
enum AccessToken {
    Static(String),
    /// Re-read before every send, so a rotated token is picked up.
    File(PathBuf),
}

impl AccessToken {
    async fn current(&self) -> Result<String, TransportError> {
        match self {
            AccessToken::Static(token) => Ok(token.clone()),
            AccessToken::File(path) => {
                let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                    TransportError::Credentials(format!("{}: {}", path.display(), e))
                })?;
                let token = content.trim();
                if token.is_empty() {
                    return Err(TransportError::Credentials(format!(
                        "{} is empty",
                        path.display()
                    )));
                }
                Ok(token.to_string())
            }
        }
    }
}

/// Sends one message per token through the FCM HTTP v1 `messages:send` API.
pub struct FcmTransport {
    client: reqwest::Client,
    send_url: String,
    access_token: AccessToken,
}

impl FcmTransport {
    /// Creates a new `FcmTransport` from its configuration.
    pub fn new(config: &FcmConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        let send_url = format!(
            "{}/v1/projects/{}/messages:send",
            config.endpoint.trim_end_matches('/'),
            config.project_id
        );
        Ok(Self {
            client,
            send_url,
            access_token: match &config.access_token_file {
                Some(path) => AccessToken::File(path.clone()),
                None => AccessToken::Static(config.access_token.clone()),
            },
        })
    }

    /// Builds the request body for a single-token message.
    fn message_body(token: &str, title: &str, body: &str, data: &PushData) -> Value {
        json!({
            "message": {
                "token": token,
                "notification": {
                    "title": title,
                    "body": body,
                },
                "data": data,
            }
        })
    }
}

#[async_trait]
impl PushTransport for FcmTransport {
    fn name(&self) -> &str {
        "fcm"
    }

    #[instrument(skip_all)]
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &PushData,
    ) -> Result<(), TransportError> {
        let access_token = self.access_token.current().await.map_err(|e| {
            error!(error = %e, "Could not load FCM access token");
            e
        })?;
        let payload = Self::message_body(token, title, body, data);
        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request to FCM failed");
                e
            })?;

        let status = response.status();
        if status.is_success() {
            debug!("FCM accepted message");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        error!(status = %status, body = %text, "FCM rejected message");
        Err(TransportError::Rejected {
            status: status.as_u16(),
            body: text,
        })
    }
}
