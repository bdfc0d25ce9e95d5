//! Email delivery for dispatched notifications.
//!
//! Providers implement `EmailSender`; `build_sender` picks one from configuration.

pub mod provider;

use std::sync::Arc;

use pulse_common::config::{AppConfig, EmailProviderKind};

pub use provider::{EmailSender, LogSender, MockOutcome, MockSender, ResendSender};

/// Build the configured email provider.
pub fn build_sender(config: &AppConfig) -> anyhow::Result<Arc<dyn EmailSender>> {
    let sender: Arc<dyn EmailSender> = match config.email_provider {
        EmailProviderKind::Log => Arc::new(LogSender),
        EmailProviderKind::Resend => {
            let api_key = config
                .resend_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("RESEND_API_KEY is required for the resend provider"))?;
            let from = config
                .email_from
                .clone()
                .ok_or_else(|| anyhow::anyhow!("EMAIL_FROM is required for the resend provider"))?;
            Arc::new(ResendSender::new(api_key, from))
        }
    };

    tracing::info!(provider = sender.name(), "Email provider configured");
    Ok(sender)
}
