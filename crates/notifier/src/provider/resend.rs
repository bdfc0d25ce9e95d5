//! Resend HTTP API provider.

use async_trait::async_trait;
use serde_json::json;

use super::EmailSender;

/// Default Resend send endpoint.
pub const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Delivers plain-text email through the Resend API.
#[derive(Debug, Clone)]
pub struct ResendSender {
    client: reqwest::Client,
    api_key: String,
    from: String,
    endpoint: String,
}

impl ResendSender {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            from: from.into(),
            endpoint: RESEND_API_URL.to_string(),
        }
    }

    /// Point the sender at a different endpoint (e.g. a local stub).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_body(&self, recipient: &str, subject: &str, content: &str) -> serde_json::Value {
        json!({
            "from": self.from,
            "to": [recipient],
            "subject": subject,
            "text": content,
        })
    }
}

#[async_trait]
impl EmailSender for ResendSender {
    async fn send(&self, recipient: &str, subject: &str, content: &str) -> anyhow::Result<bool> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(recipient, subject, content))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(recipient, "Email accepted by Resend");
            return Ok(true);
        }

        let detail = response.text().await.unwrap_or_default();
        tracing::warn!(
            recipient,
            status = %status,
            detail = %detail,
            "Resend rejected email"
        );
        Ok(false)
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}
