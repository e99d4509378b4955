/**
 * Notification Client
 *
 * HTTP publisher used by workflow components (booking, payment, approval)
 * that run outside the chat server. Publishing is fire-and-forget:
 * failures are logged and never propagated into the caller's workflow.
 *
 * # Example
 *
 * ```rust,no_run
 * use marketchat::backend::notify::NotificationClient;
 * use marketchat::shared::Participant;
 *
 * # async fn example() {
 * let client = NotificationClient::new("http://127.0.0.1:3000").with_bridge_key("secret");
 * client.notify(Participant::Provider(7), "Booking accepted").await;
 * # }
 * ```
 */

use std::time::Duration;

use super::handlers::BRIDGE_KEY_HEADER;
use crate::shared::event::{PublishRequest, PublishResponse};
use crate::shared::participant::Participant;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct NotificationClient {
    http: reqwest::Client,
    endpoint: String,
    bridge_key: Option<String>,
}

impl NotificationClient {
    /// Client for the bridge served at `base_url`
    pub fn new(base_url: impl AsRef<str>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("[Notify] Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            http,
            endpoint: format!("{}/notifications", base_url.as_ref().trim_end_matches('/')),
            bridge_key: None,
        }
    }

    pub fn with_bridge_key(mut self, key: impl Into<String>) -> Self {
        self.bridge_key = Some(key.into());
        self
    }

    /// Publish and report the outcome
    pub async fn publish(
        &self,
        participant: Participant,
        message: impl Into<String>,
    ) -> Result<PublishResponse, reqwest::Error> {
        let request = PublishRequest {
            participant,
            message: message.into(),
        };

        let mut builder = self.http.post(&self.endpoint).json(&request);
        if let Some(key) = &self.bridge_key {
            builder = builder.header(BRIDGE_KEY_HEADER, key);
        }

        builder.send().await?.error_for_status()?.json().await
    }

    /// Publish, logging instead of failing
    ///
    /// Returns how many consumers received the event; 0 on any failure.
    pub async fn notify(&self, participant: Participant, message: impl Into<String>) -> usize {
        match self.publish(participant, message).await {
            Ok(response) => response.delivered,
            Err(e) => {
                tracing::warn!("[Notify] Failed to publish notification to {}: {}", participant, e);
                0
            }
        }
    }
}
