use crate::session::SessionRecord;
use crate::transcript::TranscriptStore;
use chrono::Utc;
use confab_core::{RelayError, RelayResult, Role, StoredMessage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug)]
struct SessionEntry {
    record: SessionRecord,
    messages: Vec<StoredMessage>,
}

/// In-process transcript store for tests and `--in-memory` demo runs.
/// Same contract as the file store, nothing survives a restart.
#[derive(Default)]
pub struct MemoryTranscriptStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl MemoryTranscriptStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages currently held for a session; 0 if unknown.
    /// Test helper, not part of the [`TranscriptStore`] contract.
    pub async fn message_count(&self, session_id: &str) -> usize {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|e| e.messages.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl TranscriptStore for MemoryTranscriptStore {
    async fn create_session(
        &self,
        is_demo: bool,
        ttl: Option<Duration>,
    ) -> RelayResult<SessionRecord> {
        let record = SessionRecord::mint(is_demo, ttl);
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            record.id.clone(),
            SessionEntry {
                record: record.clone(),
                messages: Vec::new(),
            },
        );
        Ok(record)
    }

    async fn get_session(&self, session_id: &str) -> RelayResult<Option<SessionRecord>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).map(|e| e.record.clone()))
    }

    async fn append(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> RelayResult<StoredMessage> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| RelayError::NotFound(session_id.to_string()))?;
        let message = StoredMessage {
            id: entry.messages.last().map(|m| m.id + 1).unwrap_or(1),
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        entry.messages.push(message.clone());
        Ok(message)
    }

    async fn read_all(&self, session_id: &str) -> RelayResult<Vec<StoredMessage>> {
        let sessions = self.sessions.read().await;
        let entry = sessions
            .get(session_id)
            .ok_or_else(|| RelayError::NotFound(session_id.to_string()))?;
        Ok(entry.messages.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_and_read_preserve_order() {
        let store = MemoryTranscriptStore::new();
        let session = store.create_session(true, None).await.unwrap();

        store.append(&session.id, Role::User, "u1").await.unwrap();
        store
            .append(&session.id, Role::Assistant, "a1")
            .await
            .unwrap();
        store.append(&session.id, Role::User, "u2").await.unwrap();

        let all = store.read_all(&session.id).await.unwrap();
        let contents: Vec<&str> = all.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["u1", "a1", "u2"]);
        assert_eq!(all.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = MemoryTranscriptStore::new();
        let err = store.append("ghost", Role::User, "x").await.unwrap_err();
        assert!(matches!(err, RelayError::NotFound(_)));
    }
}
