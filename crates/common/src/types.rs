use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A registered notification.
///
/// `id` is empty until the store assigns one; after that the record is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub payload: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub id: String,
}

impl Notification {
    /// Content delivered to recipients.
    pub fn render(&self) -> String {
        self.payload.clone()
    }

    /// Subject line used by providers that need one.
    pub fn subject(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("Notification")
    }
}

/// Caller-supplied fields for a notification that has not been stored yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewNotification {
    pub payload: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl NewNotification {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach an assigned id, producing the stored form.
    pub fn into_notification(self, id: String) -> Notification {
        Notification {
            payload: self.payload,
            name: self.name,
            description: self.description,
            id,
        }
    }
}

/// Outcome of dispatching one notification to a set of recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub notification_id: String,
    /// Number of entries in the recipient list, duplicates included.
    pub total: usize,
    /// Recipient → whether the send succeeded.
    pub email_status: HashMap<String, bool>,
}

impl DispatchReport {
    /// Number of distinct recipients whose send succeeded.
    pub fn delivered(&self) -> usize {
        self.email_status.values().filter(|ok| **ok).count()
    }

    /// Human-readable `"<k>/<n> emails sent"`.
    pub fn summary(&self) -> String {
        format!("{}/{} emails sent", self.delivered(), self.total)
    }
}
