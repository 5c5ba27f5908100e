use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of the participant that authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human end-user.
    User,
    /// The generation backend.
    Assistant,
    /// A system-level instruction.
    System,
}

impl Role {
    /// The wire name of this role, as sent to generation backends.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// A message persisted in a session transcript.
///
/// The `id` is a per-session sequence number assigned by the transcript
/// store on append; within a session, ascending `id` defines the total
/// message order. The relay never assigns ids and never orders by
/// timestamp alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Sequence number within the session, assigned on append.
    pub id: u64,
    /// The session this message belongs to.
    pub session_id: String,
    /// The role of the message author.
    pub role: Role,
    /// The textual content of the message.
    pub content: String,
    /// UTC timestamp of when the message was appended.
    pub created_at: DateTime<Utc>,
}

/// One (role, content) unit of conversation history passed to a
/// generation backend, oldest-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// The role of the turn author.
    pub role: Role,
    /// The textual content of the turn.
    pub content: String,
}

impl Turn {
    /// Creates a turn with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&StoredMessage> for Turn {
    fn from(msg: &StoredMessage) -> Self {
        Turn {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        let role: Role = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(role, Role::System);
    }

    #[test]
    fn stored_message_round_trips() {
        let msg = StoredMessage {
            id: 7,
            session_id: "s1".into(),
            role: Role::Assistant,
            content: "hi there".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: StoredMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, 7);
        assert_eq!(back.session_id, "s1");
        assert_eq!(back.role, Role::Assistant);
        assert_eq!(back.content, "hi there");
    }

    #[test]
    fn turn_from_stored_message() {
        let msg = StoredMessage {
            id: 1,
            session_id: "s1".into(),
            role: Role::User,
            content: "hello".into(),
            created_at: Utc::now(),
        };
        let turn = Turn::from(&msg);
        assert_eq!(turn, Turn::new(Role::User, "hello"));
    }
}
