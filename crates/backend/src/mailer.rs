//! Email-sending client.
//!
//! Email delivery is owned by an external endpoint: a single
//! `POST {endpoint}/api/send-email` accepting `{to, template, data}`. The
//! client is fire-and-forget; failures are logged and swallowed, and never
//! block or fail the flow that triggered the send.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use url::Url;

/// Fire-and-forget email client.
///
/// Constructed without an endpoint, sends become debug-logged no-ops, which
/// is how tests and local development run.
#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    endpoint: Option<Url>,
    api_key: Option<SecretString>,
}

impl Mailer {
    /// Create a mailer for the given endpoint base URL.
    #[must_use]
    pub fn new(endpoint: Option<Url>, api_key: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }

    /// A disabled mailer that logs instead of sending.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    /// Send one templated email. Never fails the caller: endpoint errors and
    /// non-success responses are logged at warn and dropped.
    pub async fn send(&self, to: &str, template: &str, data: Value) {
        let Some(endpoint) = &self.endpoint else {
            tracing::debug!(to, template, "email endpoint not configured, skipping send");
            return;
        };

        let url = match endpoint.join("/api/send-email") {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "invalid email endpoint URL");
                return;
            }
        };

        let mut request = self.client.post(url).json(&json!({
            "to": to,
            "template": template,
            "data": data,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(to, template, "email dispatched");
            }
            Ok(response) => {
                tracing::warn!(
                    to,
                    template,
                    status = %response.status(),
                    "email endpoint rejected send"
                );
            }
            Err(e) => {
                tracing::warn!(to, template, error = %e, "email send failed");
            }
        }
    }

    /// Send in a background task so the caller never waits on delivery.
    pub fn send_detached(&self, to: String, template: &'static str, data: Value) {
        let mailer = self.clone();
        tokio::spawn(async move {
            mailer.send(&to, template, data).await;
        });
    }
}
