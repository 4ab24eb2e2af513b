//! Outbound email notifications
//!
//! Posts JSON to the configured notification endpoint. When no endpoint is
//! configured the service degrades to a log line; send failures are logged
//! and never propagate to the caller.

use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Notification client (clonable, cheap)
#[derive(Clone)]
pub struct Notifier {
    client: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl Notifier {
    pub fn new(endpoint: Option<String>, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint,
            api_key,
        }
    }

    /// True when an endpoint is configured
    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Send a notification; always returns, never fails the caller
    pub async fn notify(&self, recipient: &str, subject: &str, body: &str) {
        let Some(endpoint) = &self.endpoint else {
            debug!(
                "Notification endpoint not configured, skipping: to={} subject={}",
                recipient, subject
            );
            return;
        };

        let mut request = self.client.post(endpoint).json(&json!({
            "to": recipient,
            "subject": subject,
            "body": body,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Notification sent: to={} subject={}", recipient, subject);
            }
            Ok(response) => {
                warn!(
                    "Notification endpoint returned {}: to={} subject={}",
                    response.status(),
                    recipient,
                    subject
                );
            }
            Err(e) => {
                warn!("Notification send failed: {}", e);
            }
        }
    }
}
