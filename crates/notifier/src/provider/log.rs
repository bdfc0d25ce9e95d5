use async_trait::async_trait;

use super::EmailSender;

/// Writes each delivery to the log instead of sending it.
///
/// Succeeds whenever there is something to deliver.
#[derive(Debug, Clone, Default)]
pub struct LogSender;

#[async_trait]
impl EmailSender for LogSender {
    async fn send(&self, recipient: &str, subject: &str, content: &str) -> anyhow::Result<bool> {
        tracing::info!(recipient, subject, content, "Sending payload");
        Ok(!content.is_empty())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_non_empty_content_is_delivered() {
        assert!(LogSender.send("a@x.com", "s", "BTC +5%").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_content_is_not_delivered() {
        assert!(!LogSender.send("a@x.com", "s", "").await.unwrap());
    }
}
