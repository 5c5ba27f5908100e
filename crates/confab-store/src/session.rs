use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Metadata for one chat session.
///
/// The id is opaque to the relay: minted here as a UUIDv4 string, unique
/// and immutable once created. Expiry is advisory and enforced by the
/// store collaborator, never by the relay core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque session identifier.
    pub id: String,
    /// UTC timestamp of session creation.
    pub created_at: DateTime<Utc>,
    /// Advisory expiry time, if any.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether this is a short-lived demo session.
    pub is_demo: bool,
}

impl SessionRecord {
    /// Mints a new session with a fresh id. Demo sessions get an expiry
    /// `ttl` from now when one is supplied.
    pub fn mint(is_demo: bool, ttl: Option<Duration>) -> Self {
        let now = Utc::now();
        let expires_at = ttl
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| now + d);
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            expires_at,
            is_demo,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn minted_ids_are_unique() {
        let a = SessionRecord::mint(true, None);
        let b = SessionRecord::mint(true, None);
        assert_ne!(a.id, b.id);
        assert!(a.expires_at.is_none());
    }

    #[test]
    fn ttl_sets_expiry_after_creation() {
        let record = SessionRecord::mint(true, Some(Duration::from_secs(600)));
        let expires = record.expires_at.unwrap();
        assert!(expires > record.created_at);
    }
}
