//! Scripted sender for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::EmailSender;

/// What `MockSender` does for a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOutcome {
    Deliver,
    Reject,
    Error,
    /// Sleep this long, then deliver.
    Stall(Duration),
}

/// Sender with per-recipient outcomes that records every call.
#[derive(Debug, Default)]
pub struct MockSender {
    outcomes: HashMap<String, MockOutcome>,
    calls: Mutex<Vec<String>>,
}

impl MockSender {
    /// Delivers to everyone.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(mut self, recipient: impl Into<String>, outcome: MockOutcome) -> Self {
        self.outcomes.insert(recipient.into(), outcome);
        self
    }

    /// Recipients passed to `send`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl EmailSender for MockSender {
    async fn send(&self, recipient: &str, _subject: &str, _content: &str) -> anyhow::Result<bool> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(recipient.to_string());

        match self
            .outcomes
            .get(recipient)
            .copied()
            .unwrap_or(MockOutcome::Deliver)
        {
            MockOutcome::Deliver => Ok(true),
            MockOutcome::Reject => Ok(false),
            MockOutcome::Error => Err(anyhow::anyhow!("mock delivery error for {}", recipient)),
            MockOutcome::Stall(delay) => {
                tokio::time::sleep(delay).await;
                Ok(true)
            }
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
