use crate::session::SessionRecord;
use chrono::Utc;
use confab_core::{RelayError, RelayResult, Role, StoredMessage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Durable ordered append log per session.
///
/// Sequence numbers are assigned here, on append, under the store's own
/// serialization discipline (never by the caller), so concurrent writers
/// get unique, ordered ids without clock-skew bugs.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Mints a new session and persists its metadata.
    async fn create_session(
        &self,
        is_demo: bool,
        ttl: Option<Duration>,
    ) -> RelayResult<SessionRecord>;

    /// Looks up session metadata; `None` if the id is unknown.
    async fn get_session(&self, session_id: &str) -> RelayResult<Option<SessionRecord>>;

    /// Appends a message, assigning the next sequence number for the
    /// session. Fails with [`RelayError::NotFound`] for unknown sessions.
    async fn append(&self, session_id: &str, role: Role, content: &str)
        -> RelayResult<StoredMessage>;

    /// Reads the full transcript in ascending append order. Fails with
    /// [`RelayError::NotFound`] for unknown sessions.
    async fn read_all(&self, session_id: &str) -> RelayResult<Vec<StoredMessage>>;
}

/// File-based transcript store: one metadata JSON file plus one JSONL
/// append log per session.
pub struct FileTranscriptStore {
    dir: PathBuf,
    // Next sequence number per session, lazily recovered from the log on
    // first append after startup. The lock also serializes appends so a
    // sequence number is never reused.
    next_seq: Mutex<HashMap<String, u64>>,
}

impl FileTranscriptStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    pub async fn new(dir: PathBuf) -> RelayResult<Self> {
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| RelayError::Persistence(format!("create data dir: {e}")))?;
        Ok(Self {
            dir,
            next_seq: Mutex::new(HashMap::new()),
        })
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}.session.json"))
    }

    fn log_path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}.jsonl"))
    }

    async fn load_messages(&self, session_id: &str) -> RelayResult<Vec<StoredMessage>> {
        let path = self.log_path(session_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| RelayError::Persistence(format!("read transcript: {e}")))?;
        let mut messages: Vec<StoredMessage> = data
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RelayError::Persistence(format!("parse transcript: {e}")))?;
        // Append order and seq order coincide; sort anyway so a log that
        // was compacted or hand-edited still reads back ascending.
        messages.sort_by_key(|m| m.id);
        Ok(messages)
    }
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn create_session(
        &self,
        is_demo: bool,
        ttl: Option<Duration>,
    ) -> RelayResult<SessionRecord> {
        let record = SessionRecord::mint(is_demo, ttl);
        let json = serde_json::to_string_pretty(&record)?;
        tokio::fs::write(self.session_path(&record.id), json)
            .await
            .map_err(|e| RelayError::Persistence(format!("write session: {e}")))?;
        tracing::debug!(session_id = %record.id, is_demo, "session created");
        Ok(record)
    }

    async fn get_session(&self, session_id: &str) -> RelayResult<Option<SessionRecord>> {
        let path = self.session_path(session_id);
        if !path.exists() {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| RelayError::Persistence(format!("read session: {e}")))?;
        let record: SessionRecord = serde_json::from_str(&data)
            .map_err(|e| RelayError::Persistence(format!("parse session: {e}")))?;
        Ok(Some(record))
    }

    async fn append(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> RelayResult<StoredMessage> {
        if !self.session_path(session_id).exists() {
            return Err(RelayError::NotFound(session_id.to_string()));
        }

        // Held across the file write so seq assignment and the append are
        // one atomic step with respect to other writers in this process.
        let mut seqs = self.next_seq.lock().await;
        let next = match seqs.get(session_id) {
            Some(n) => *n,
            None => self
                .load_messages(session_id)
                .await?
                .last()
                .map(|m| m.id + 1)
                .unwrap_or(1),
        };

        let message = StoredMessage {
            id: next,
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(session_id))
            .await
            .map_err(|e| RelayError::Persistence(format!("open transcript: {e}")))?;
        let mut line = serde_json::to_string(&message)?;
        line.push('\n');
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| RelayError::Persistence(format!("append transcript: {e}")))?;
        file.flush()
            .await
            .map_err(|e| RelayError::Persistence(format!("flush transcript: {e}")))?;

        seqs.insert(session_id.to_string(), next + 1);
        Ok(message)
    }

    async fn read_all(&self, session_id: &str) -> RelayResult<Vec<StoredMessage>> {
        if !self.session_path(session_id).exists() {
            return Err(RelayError::NotFound(session_id.to_string()));
        }
        self.load_messages(session_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_store(tmp: &TempDir) -> FileTranscriptStore {
        FileTranscriptStore::new(tmp.path().to_path_buf())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn append_assigns_ascending_seq() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        let session = store.create_session(true, None).await.unwrap();

        let m1 = store.append(&session.id, Role::User, "hello").await.unwrap();
        let m2 = store
            .append(&session.id, Role::Assistant, "hi there")
            .await
            .unwrap();
        assert_eq!(m1.id, 1);
        assert_eq!(m2.id, 2);

        let all = store.read_all(&session.id).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].content, "hello");
        assert_eq!(all[1].content, "hi there");
    }

    #[tokio::test]
    async fn append_to_unknown_session_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        let err = store.append("nope", Role::User, "x").await.unwrap_err();
        assert!(matches!(err, RelayError::NotFound(_)));
        let err = store.read_all("nope").await.unwrap_err();
        assert!(matches!(err, RelayError::NotFound(_)));
    }

    #[tokio::test]
    async fn seq_numbering_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let session_id = {
            let store = open_store(&tmp).await;
            let session = store.create_session(false, None).await.unwrap();
            store.append(&session.id, Role::User, "one").await.unwrap();
            store
                .append(&session.id, Role::Assistant, "two")
                .await
                .unwrap();
            session.id
        };

        // A fresh instance must continue the sequence, not restart it.
        let store = open_store(&tmp).await;
        let m3 = store.append(&session_id, Role::User, "three").await.unwrap();
        assert_eq!(m3.id, 3);

        let all = store.read_all(&session_id).await.unwrap();
        assert_eq!(
            all.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn get_session_round_trips_metadata() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        let session = store
            .create_session(true, Some(Duration::from_secs(600)))
            .await
            .unwrap();

        let loaded = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, session.id);
        assert!(loaded.is_demo);
        assert!(loaded.expires_at.is_some());

        assert!(store.get_session("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_appends_get_unique_seqs() {
        let tmp = TempDir::new().unwrap();
        let store = std::sync::Arc::new(open_store(&tmp).await);
        let session = store.create_session(false, None).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            let sid = session.id.clone();
            handles.push(tokio::spawn(async move {
                store.append(&sid, Role::User, &format!("m{i}")).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let all = store.read_all(&session.id).await.unwrap();
        let mut ids: Vec<u64> = all.iter().map(|m| m.id).collect();
        ids.dedup();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }
}
