//! Notification store — the canonical, durable collection of registered notifications.
//!
//! Every successful `create` is persisted through the configured `StorageBackend` before
//! it returns. Creates are serialized by a write lock held across the whole
//! insert-and-persist sequence; a failed persist removes the provisional insert again.

use std::collections::HashMap;
use std::path::Path;

use tokio::sync::RwLock;

use pulse_common::config::StoreBackendKind;
use pulse_common::error::AppError;
use pulse_common::types::{NewNotification, Notification};

use crate::backend::{DocumentBackend, JournalBackend, MemoryBackend, StorageBackend};
use crate::id::generate_id;

/// Keyed, durable collection of notifications.
pub struct NotificationStore {
    notifications: RwLock<HashMap<String, Notification>>,
    backend: Box<dyn StorageBackend>,
}

impl NotificationStore {
    /// Open a store over `backend`, loading whatever it already holds.
    pub async fn open<B>(backend: B) -> Result<Self, AppError>
    where
        B: StorageBackend + 'static,
    {
        let notifications = backend.load().await?;

        tracing::info!(
            backend = backend.name(),
            count = notifications.len(),
            "Notification store loaded"
        );

        Ok(Self {
            notifications: RwLock::new(notifications),
            backend: Box::new(backend),
        })
    }

    /// Open a file-backed store of the given kind.
    pub async fn open_path(kind: StoreBackendKind, path: &Path) -> Result<Self, AppError> {
        match kind {
            StoreBackendKind::Document => Self::open(DocumentBackend::new(path)).await,
            StoreBackendKind::Journal => Self::open(JournalBackend::new(path)).await,
        }
    }

    /// A store that persists nothing.
    pub fn in_memory() -> Self {
        Self {
            notifications: RwLock::new(HashMap::new()),
            backend: Box::new(MemoryBackend),
        }
    }

    /// Register a notification and return its newly assigned id.
    ///
    /// Rejects an empty payload before an id is generated. If persistence fails the
    /// notification is removed from memory and the error is returned.
    pub async fn create(&self, new: NewNotification) -> Result<String, AppError> {
        if new.payload.is_empty() {
            return Err(AppError::Validation("payload is required".to_string()));
        }

        let mut notifications = self.notifications.write().await;

        let mut id = generate_id(&new.payload);
        while notifications.contains_key(&id) {
            id = generate_id(&new.payload);
        }

        let notification = new.into_notification(id.clone());
        notifications.insert(id.clone(), notification.clone());

        if let Err(e) = self.backend.persist(&notifications, &notification).await {
            notifications.remove(&id);
            tracing::error!(
                notification_id = %id,
                backend = self.backend.name(),
                error = %e,
                "Failed to persist notification, insert rolled back"
            );
            return Err(e);
        }

        tracing::info!(
            notification_id = %id,
            total = notifications.len(),
            "Notification created"
        );

        Ok(id)
    }

    /// Look up a notification by id.
    pub async fn get(&self, id: &str) -> Option<Notification> {
        self.notifications.read().await.get(id).cloned()
    }

    /// Snapshot of every stored notification, in no particular order.
    pub async fn list(&self) -> Vec<Notification> {
        self.notifications.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.notifications.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notifications.read().await.is_empty()
    }
}
