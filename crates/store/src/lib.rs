//! Durable notification store.

pub mod backend;
pub mod id;
pub mod store;

pub use backend::{DocumentBackend, JournalBackend, MemoryBackend, StorageBackend};
pub use store::NotificationStore;
