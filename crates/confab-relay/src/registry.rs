use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// A live listener attached to one session: an id plus the send half of
/// its outbound frame channel. The ingress adapter holds the receive
/// half and forwards frames onto the wire.
#[derive(Debug)]
pub struct Listener {
    /// Listener identity, unique per connection.
    pub id: Uuid,
    /// Send capability for serialized outbound frames.
    pub tx: mpsc::UnboundedSender<String>,
}

impl Listener {
    /// Creates a listener with a fresh id, returning the receive half
    /// for the adapter to drain.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: Uuid::new_v4(),
                tx,
            },
            rx,
        )
    }
}

/// Maps each session id to its set of live listeners.
///
/// The per-session listener vec is the only state mutated by concurrent
/// callers; the lock is held for map manipulation only, never across
/// I/O or a generation call, so operations on one session never hold up
/// another session's work.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Vec<Listener>>>,
}

impl SessionRegistry {
    /// Creates an empty registry behind an `Arc` for sharing across
    /// handlers.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Registers a listener under a session. Re-attaching an id already
    /// present is a no-op, so the set never holds duplicates.
    pub async fn attach(&self, session_id: &str, listener: Listener) {
        let mut sessions = self.sessions.write().await;
        let listeners = sessions.entry(session_id.to_string()).or_default();
        if listeners.iter().any(|l| l.id == listener.id) {
            return;
        }
        tracing::debug!(session_id, listener_id = %listener.id, "listener attached");
        listeners.push(listener);
    }

    /// Removes a listener. No-op if already removed; removing the last
    /// listener for a session drops the session's entry entirely.
    pub async fn detach(&self, session_id: &str, listener_id: Uuid) {
        let mut sessions = self.sessions.write().await;
        if let Some(listeners) = sessions.get_mut(session_id) {
            listeners.retain(|l| l.id != listener_id);
            if listeners.is_empty() {
                sessions.remove(session_id);
            }
            tracing::debug!(session_id, listener_id = %listener_id, "listener detached");
        }
    }

    /// Sends `payload` to every listener currently attached to the
    /// session and returns how many sends succeeded.
    ///
    /// The listener set is snapshotted before sending: attaches that
    /// race this call may miss the payload. A listener whose send fails
    /// is treated as disconnected: removed from the registry and
    /// excluded from the count, without affecting delivery to the rest.
    pub async fn broadcast(&self, session_id: &str, payload: &str) -> usize {
        let snapshot: Vec<(Uuid, mpsc::UnboundedSender<String>)> = {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                Some(listeners) => listeners.iter().map(|l| (l.id, l.tx.clone())).collect(),
                None => return 0,
            }
        };

        let mut delivered = 0;
        let mut dead = Vec::new();
        for (id, tx) in snapshot {
            if tx.send(payload.to_string()).is_ok() {
                delivered += 1;
            } else {
                dead.push(id);
            }
        }

        for id in dead {
            tracing::debug!(session_id, listener_id = %id, "dropping disconnected listener");
            self.detach(session_id, id).await;
        }

        delivered
    }

    /// Number of sessions with at least one live listener.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Number of live listeners for one session.
    pub async fn listener_count(&self, session_id: &str) -> usize {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_all_attached_listeners() {
        let registry = SessionRegistry::new();
        let (l1, mut rx1) = Listener::new();
        let (l2, mut rx2) = Listener::new();
        registry.attach("s2", l1).await;
        registry.attach("s2", l2).await;

        let (l3, mut rx3) = Listener::new();
        registry.attach("s3", l3).await;

        let delivered = registry.broadcast("s2", "frame").await;
        assert_eq!(delivered, 2);
        assert_eq!(rx1.recv().await.unwrap(), "frame");
        assert_eq!(rx2.recv().await.unwrap(), "frame");
        // The s3 listener receives nothing.
        assert!(rx3.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_send_removes_listener_but_delivery_continues() {
        let registry = SessionRegistry::new();
        let (dead, rx_dead) = Listener::new();
        let (live, mut rx_live) = Listener::new();
        registry.attach("s1", dead).await;
        registry.attach("s1", live).await;

        // Dropping the receiver makes the next send fail.
        drop(rx_dead);

        let delivered = registry.broadcast("s1", "hello").await;
        assert_eq!(delivered, 1);
        assert_eq!(rx_live.recv().await.unwrap(), "hello");
        assert_eq!(registry.listener_count("s1").await, 1);

        // The dead listener is excluded from later broadcasts too.
        let delivered = registry.broadcast("s1", "again").await;
        assert_eq!(delivered, 1);
    }

    #[tokio::test]
    async fn detaching_last_listener_removes_session_entry() {
        let registry = SessionRegistry::new();
        let (listener, _rx) = Listener::new();
        let id = listener.id;
        registry.attach("s1", listener).await;
        assert_eq!(registry.session_count().await, 1);

        registry.detach("s1", id).await;
        assert_eq!(registry.session_count().await, 0);
        assert_eq!(registry.listener_count("s1").await, 0);
    }

    #[tokio::test]
    async fn detach_is_idempotent_and_leaves_others_alone() {
        let registry = SessionRegistry::new();
        let (gone, _rx_gone) = Listener::new();
        let gone_id = gone.id;
        let (stays, mut rx_stays) = Listener::new();
        registry.attach("s1", gone).await;
        registry.attach("s1", stays).await;

        registry.detach("s1", gone_id).await;
        registry.detach("s1", gone_id).await;
        registry.detach("missing-session", gone_id).await;

        assert_eq!(registry.broadcast("s1", "still here").await, 1);
        assert_eq!(rx_stays.recv().await.unwrap(), "still here");
    }

    #[tokio::test]
    async fn reattaching_same_listener_id_does_not_duplicate() {
        let registry = SessionRegistry::new();
        let (listener, mut rx) = Listener::new();
        let dup = Listener {
            id: listener.id,
            tx: listener.tx.clone(),
        };
        registry.attach("s1", listener).await;
        registry.attach("s1", dup).await;

        assert_eq!(registry.listener_count("s1").await, 1);
        assert_eq!(registry.broadcast("s1", "once").await, 1);
        assert_eq!(rx.recv().await.unwrap(), "once");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_to_unknown_session_delivers_nothing() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.broadcast("ghost", "hello").await, 0);
    }

    #[tokio::test]
    async fn concurrent_attach_detach_broadcast_stay_consistent() {
        let registry = SessionRegistry::new();
        let mut handles = Vec::new();
        for i in 0..20 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let sid = format!("s{}", i % 4);
                let (listener, _rx) = Listener::new();
                let id = listener.id;
                registry.attach(&sid, listener).await;
                registry.broadcast(&sid, "ping").await;
                registry.detach(&sid, id).await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        // Every task detached its own listener, so nothing lingers.
        assert_eq!(registry.session_count().await, 0);
    }
}
