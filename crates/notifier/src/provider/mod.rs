//! Email delivery providers.

pub mod log;
pub mod mock;
pub mod resend;

pub use log::LogSender;
pub use mock::{MockOutcome, MockSender};
pub use resend::ResendSender;

use async_trait::async_trait;

/// The external send capability.
///
/// `Ok(true)` means the message was handed off, `Ok(false)` means the provider
/// declined it. Callers treat `Err` the same as `Ok(false)`.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver `content` to one recipient.
    async fn send(&self, recipient: &str, subject: &str, content: &str) -> anyhow::Result<bool>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;
}
