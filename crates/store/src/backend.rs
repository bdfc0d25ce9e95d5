//! Durable storage backends for the notification store.
//!
//! - `DocumentBackend`: one JSON object `{id: record}` rewritten on every create.
//!   Writes go to a sibling `.tmp` file which is then renamed over the target.
//! - `JournalBackend`: append-only JSON lines, one `created` event per line, replayed on load.
//! - `MemoryBackend`: nothing is persisted.

use std::collections::HashMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use pulse_common::error::AppError;
use pulse_common::types::Notification;

/// Storage contract used by `NotificationStore`.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Restore every stored notification, keyed by id.
    async fn load(&self) -> Result<HashMap<String, Notification>, AppError>;

    /// Make `created` durable. `snapshot` is the full mapping, `created` included.
    async fn persist(
        &self,
        snapshot: &HashMap<String, Notification>,
        created: &Notification,
    ) -> Result<(), AppError>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Re-key records by their document key, dropping records with an empty key.
fn restore_ids(raw: HashMap<String, Notification>) -> HashMap<String, Notification> {
    raw.into_iter()
        .filter_map(|(key, mut notification)| {
            if key.is_empty() {
                tracing::warn!("Skipping stored notification with empty id");
                return None;
            }
            notification.id = key.clone();
            Some((key, notification))
        })
        .collect()
}

async fn ensure_parent(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Whole-document JSON file.
#[derive(Debug, Clone)]
pub struct DocumentBackend {
    path: PathBuf,
}

impl DocumentBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl StorageBackend for DocumentBackend {
    async fn load(&self) -> Result<HashMap<String, Notification>, AppError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(HashMap::new());
        }

        let raw: HashMap<String, Notification> = serde_json::from_slice(&bytes)?;
        Ok(restore_ids(raw))
    }

    async fn persist(
        &self,
        snapshot: &HashMap<String, Notification>,
        _created: &Notification,
    ) -> Result<(), AppError> {
        let body = serde_json::to_vec(snapshot)?;
        ensure_parent(&self.path).await?;

        let tmp = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&body).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "document"
    }
}

/// One line of the journal.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JournalEntry {
    Created {
        recorded_at: DateTime<Utc>,
        notification: Notification,
    },
}

/// Append-only JSON lines log.
#[derive(Debug, Clone)]
pub struct JournalBackend {
    path: PathBuf,
}

impl JournalBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StorageBackend for JournalBackend {
    async fn load(&self) -> Result<HashMap<String, Notification>, AppError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        let mut raw = HashMap::new();
        let mut offset = 0usize;
        let mut torn_at = None;

        for segment in contents.split_inclusive('\n') {
            let start = offset;
            offset += segment.len();

            let line = segment.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<JournalEntry>(line) {
                Ok(JournalEntry::Created { notification, .. }) => {
                    raw.insert(notification.id.clone(), notification);
                }
                // Only an unterminated final segment can be a torn append.
                Err(e) if !segment.ends_with('\n') => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Discarding incomplete trailing journal entry"
                    );
                    torn_at = Some(start);
                }
                Err(e) => return Err(e.into()),
            }
        }

        // Cut the fragment so the next append starts on a fresh line.
        if let Some(len) = torn_at {
            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .open(&self.path)
                .await?;
            file.set_len(len as u64).await?;
            file.sync_all().await?;
        }

        Ok(restore_ids(raw))
    }

    async fn persist(
        &self,
        _snapshot: &HashMap<String, Notification>,
        created: &Notification,
    ) -> Result<(), AppError> {
        let entry = JournalEntry::Created {
            recorded_at: Utc::now(),
            notification: created.clone(),
        };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        ensure_parent(&self.path).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await?;

        // Never glue an entry onto an unterminated previous line.
        let len = file.metadata().await?.len();
        if len > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::Start(len - 1)).await?;
            file.read_exact(&mut last).await?;
            if last[0] != b'\n' {
                line.insert(0, b'\n');
            }
        }

        file.write_all(&line).await?;
        file.sync_data().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "journal"
    }
}

/// No durability. Used for tests and throwaway runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend;

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn load(&self) -> Result<HashMap<String, Notification>, AppError> {
        Ok(HashMap::new())
    }

    async fn persist(
        &self,
        _snapshot: &HashMap<String, Notification>,
        _created: &Notification,
    ) -> Result<(), AppError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use pulse_common::types::NewNotification;

    use super::*;

    fn record(id: &str, payload: &str) -> Notification {
        NewNotification::new(payload)
            .with_name("alert")
            .into_notification(id.to_string())
    }

    #[tokio::test]
    async fn test_document_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = DocumentBackend::new(dir.path().join("absent.json"));
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_document_layout_keys_match_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifications.json");
        let backend = DocumentBackend::new(&path);

        let created = record("id-1", "BTC +5%");
        let snapshot = HashMap::from([(created.id.clone(), created.clone())]);
        backend.persist(&snapshot, &created).await.unwrap();

        let doc: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(doc["id-1"]["id"], "id-1");
        assert_eq!(doc["id-1"]["payload"], "BTC +5%");
        assert_eq!(doc["id-1"]["name"], "alert");
        assert!(doc["id-1"]["description"].is_null());
        assert!(!backend.temp_path().exists());
    }

    #[tokio::test]
    async fn test_document_load_restores_id_from_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifications.json");
        std::fs::write(
            &path,
            r#"{"key-a": {"payload": "p", "name": null, "description": "d", "id": "stale"},
                "": {"payload": "orphan", "name": null, "description": null, "id": ""}}"#,
        )
        .unwrap();

        let loaded = DocumentBackend::new(&path).load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["key-a"].id, "key-a");
        assert_eq!(loaded["key-a"].description.as_deref(), Some("d"));
    }

    #[tokio::test]
    async fn test_document_corrupt_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifications.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = DocumentBackend::new(&path).load().await.unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_journal_replays_appends() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JournalBackend::new(dir.path().join("nested").join("journal.log"));
        let empty = HashMap::new();

        for (id, payload) in [("a", "one"), ("b", "two")] {
            backend.persist(&empty, &record(id, payload)).await.unwrap();
        }

        let contents = std::fs::read_to_string(backend.path()).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.lines().all(|l| l.contains(r#""event":"created""#)));

        let loaded = backend.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["b"].payload, "two");
    }

    #[tokio::test]
    async fn test_journal_drops_torn_tail() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JournalBackend::new(dir.path().join("journal.log"));
        backend
            .persist(&HashMap::new(), &record("a", "one"))
            .await
            .unwrap();

        let mut contents = std::fs::read_to_string(backend.path()).unwrap();
        contents.push_str(r#"{"event":"created","recorded_at":"#);
        std::fs::write(backend.path(), contents).unwrap();

        let loaded = backend.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("a"));
    }

    #[tokio::test]
    async fn test_journal_appends_after_torn_tail_survive() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JournalBackend::new(dir.path().join("journal.log"));
        let empty = HashMap::new();
        backend.persist(&empty, &record("a", "one")).await.unwrap();

        let mut contents = std::fs::read_to_string(backend.path()).unwrap();
        contents.push_str(r#"{"event":"created","recorded_at":"#);
        std::fs::write(backend.path(), contents).unwrap();

        let ids = |map: HashMap<String, Notification>| {
            let mut ids: Vec<String> = map.into_keys().collect();
            ids.sort();
            ids
        };

        assert_eq!(ids(backend.load().await.unwrap()), ["a"]);
        backend.persist(&empty, &record("b", "two")).await.unwrap();
        assert_eq!(ids(backend.load().await.unwrap()), ["a", "b"]);
        backend.persist(&empty, &record("c", "three")).await.unwrap();
        assert_eq!(ids(backend.load().await.unwrap()), ["a", "b", "c"]);

        let contents = std::fs::read_to_string(backend.path()).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_journal_append_after_unterminated_entry() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JournalBackend::new(dir.path().join("journal.log"));
        let empty = HashMap::new();
        backend.persist(&empty, &record("a", "one")).await.unwrap();

        let contents = std::fs::read_to_string(backend.path()).unwrap();
        std::fs::write(backend.path(), contents.trim_end()).unwrap();

        backend.persist(&empty, &record("b", "two")).await.unwrap();
        let loaded = backend.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["a"].payload, "one");
        assert_eq!(loaded["b"].payload, "two");
    }

    #[tokio::test]
    async fn test_journal_corrupt_middle_errors() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JournalBackend::new(dir.path().join("journal.log"));
        std::fs::write(backend.path(), "garbage\n").unwrap();
        backend
            .persist(&HashMap::new(), &record("a", "one"))
            .await
            .unwrap();

        assert!(backend.load().await.is_err());
    }
}
