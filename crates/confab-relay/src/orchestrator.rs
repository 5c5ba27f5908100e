use crate::registry::SessionRegistry;
use confab_core::{RelayError, RelayResult, Role, StoredMessage, Turn};
use confab_provider::ProviderGateway;
use confab_store::TranscriptStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Tunables for the request lifecycle.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Upper bound on one generation call; a timeout is treated the same
    /// as an unavailable provider.
    pub generation_timeout: Duration,
    /// When set, only the most recent N messages are sent as context.
    /// `None` sends the full history since session start.
    pub context_window: Option<usize>,
    /// Advisory TTL for sessions minted on first message.
    pub demo_session_ttl: Option<Duration>,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            generation_timeout: Duration::from_secs(30),
            context_window: None,
            demo_session_ttl: Some(Duration::from_secs(600)),
        }
    }
}

/// Drives one user message through the full lifecycle: persist the user
/// message, load context, call the provider once, persist the reply,
/// fan the reply out to live listeners.
///
/// Concurrent calls for the same session are not mutually exclusive;
/// interleaved user/assistant pairs append in arrival order. The only
/// ordering each call guarantees is read-your-writes within itself: its
/// user append precedes its context read, which precedes its reply
/// append.
pub struct ChatOrchestrator {
    store: Arc<dyn TranscriptStore>,
    provider: Arc<ProviderGateway>,
    registry: Arc<SessionRegistry>,
    settings: OrchestratorSettings,
}

impl ChatOrchestrator {
    /// Wires the orchestrator to its collaborators.
    pub fn new(
        store: Arc<dyn TranscriptStore>,
        provider: Arc<ProviderGateway>,
        registry: Arc<SessionRegistry>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            store,
            provider,
            registry,
            settings,
        }
    }

    /// Handles one inbound user message and returns the persisted
    /// assistant reply.
    ///
    /// With no `session_id` a demo session is minted first; that is the
    /// only point where this core creates session identity. A user message
    /// that cannot be persisted aborts the request before any
    /// generation attempt, so every reply stays traceable to a durable
    /// prompt. Provider failures surface as-is; no placeholder reply is
    /// ever persisted or returned.
    pub async fn handle_message(
        &self,
        session_id: Option<String>,
        content: &str,
    ) -> RelayResult<StoredMessage> {
        let session_id = match session_id {
            Some(id) => id,
            None => {
                let record = self
                    .store
                    .create_session(true, self.settings.demo_session_ttl)
                    .await?;
                info!(session_id = %record.id, "minted session on first message");
                record.id
            }
        };

        self.store
            .append(&session_id, Role::User, content)
            .await?;

        let turns = self.load_context(&session_id).await?;

        let reply = match tokio::time::timeout(
            self.settings.generation_timeout,
            self.provider.generate(&turns, None),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(RelayError::ProviderUnavailable(format!(
                    "generation timed out after {:?}",
                    self.settings.generation_timeout
                )));
            }
        };

        // Generation succeeded but the reply still has to land in the
        // transcript; if that fails the caller must hear about it rather
        // than trust an unpersisted reply.
        let assistant = self
            .store
            .append(&session_id, Role::Assistant, &reply)
            .await?;

        let frame = serde_json::json!({
            "type": "assistant",
            "content": assistant.content,
        });
        let delivered = self
            .registry
            .broadcast(&session_id, &frame.to_string())
            .await;
        debug!(session_id = %session_id, delivered, "reply fanned out");

        Ok(assistant)
    }

    /// Full ascending history, truncated to the configured window (most
    /// recent messages, order preserved) and mapped to turns.
    async fn load_context(&self, session_id: &str) -> RelayResult<Vec<Turn>> {
        let history = self.store.read_all(session_id).await?;
        let start = match self.settings.context_window {
            Some(limit) if history.len() > limit => history.len() - limit,
            _ => 0,
        };
        Ok(history[start..].iter().map(Turn::from).collect())
    }

    /// Creates an explicit (non-demo unless asked) session. Thin
    /// delegation kept here so ingress adapters share one entry point.
    pub async fn create_session(
        &self,
        is_demo: bool,
    ) -> RelayResult<confab_store::SessionRecord> {
        let ttl = if is_demo {
            self.settings.demo_session_ttl
        } else {
            None
        };
        self.store.create_session(is_demo, ttl).await
    }

    /// Registry handle for ingress adapters that attach listeners.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }
}
