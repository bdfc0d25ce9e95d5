//! Notification dispatcher.
//!
//! Resolves a notification, renders it once and fans the content out to every
//! recipient through the configured `EmailSender`:
//! 1. Unknown id → `AppError::NotFound`, nothing is sent
//! 2. Every list entry gets exactly one attempt; `n` is the length of the list
//! 3. At most `max_concurrency` sends are in flight; each is bounded by `send_timeout`
//! 4. Provider errors, rejections and timeouts are recorded as `false`, never escalated

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use pulse_common::config::AppConfig;
use pulse_common::error::AppError;
use pulse_common::types::DispatchReport;
use pulse_notifier::EmailSender;
use pulse_store::NotificationStore;

/// Default number of sends in flight per dispatch.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Default per-recipient send timeout.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Fans a stored notification out to a list of recipients.
#[derive(Clone)]
pub struct Dispatcher {
    sender: Arc<dyn EmailSender>,
    max_concurrency: usize,
    send_timeout: Duration,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn EmailSender>) -> Self {
        Self {
            sender,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn from_config(sender: Arc<dyn EmailSender>, config: &AppConfig) -> Self {
        Self::new(sender)
            .with_max_concurrency(config.dispatch_max_concurrency)
            .with_send_timeout(Duration::from_millis(config.dispatch_send_timeout_ms))
    }

    /// Clamped to at least 1.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Send notification `notification_id` to every recipient and report per-recipient outcomes.
    pub async fn dispatch(
        &self,
        store: &NotificationStore,
        notification_id: &str,
        recipients: &[String],
    ) -> Result<DispatchReport, AppError> {
        let notification = store
            .get(notification_id)
            .await
            .ok_or_else(|| AppError::NotFound("unknown notification id".to_string()))?;

        let content: Arc<str> = notification.render().into();
        let subject: Arc<str> = notification.subject().into();

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (index, recipient) in recipients.iter().cloned().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Internal(format!("dispatch semaphore closed: {}", e)))?;
            let sender = self.sender.clone();
            let subject = subject.clone();
            let content = content.clone();
            let send_timeout = self.send_timeout;

            tasks.spawn(async move {
                let _permit = permit;
                let outcome =
                    tokio::time::timeout(send_timeout, sender.send(&recipient, &subject, &content))
                        .await;

                let delivered = match outcome {
                    Ok(Ok(delivered)) => delivered,
                    Ok(Err(e)) => {
                        tracing::warn!(recipient = %recipient, error = %e, "Email send failed");
                        false
                    }
                    Err(_) => {
                        tracing::warn!(
                            recipient = %recipient,
                            timeout_ms = send_timeout.as_millis() as u64,
                            "Email send timed out"
                        );
                        false
                    }
                };
                (index, delivered)
            });
        }

        // Anything that never reports back (e.g. a panicked send) stays `false`.
        let mut outcomes = vec![false; recipients.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, delivered)) => outcomes[index] = delivered,
                Err(e) => tracing::error!(error = %e, "Send task aborted"),
            }
        }

        // A repeated recipient reports the outcome of its last entry.
        let email_status: HashMap<String, bool> = recipients
            .iter()
            .cloned()
            .zip(outcomes)
            .collect();

        let report = DispatchReport {
            notification_id: notification.id.clone(),
            total: recipients.len(),
            email_status,
        };

        tracing::info!(
            notification_id = %notification.id,
            provider = self.sender.name(),
            delivered = report.delivered(),
            total = report.total,
            "Notification dispatched"
        );

        Ok(report)
    }
}
