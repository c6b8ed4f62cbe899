use crate::session::Session;
use async_trait::async_trait;
use chrono::Utc;
use counselor_core::Message;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Concurrent access to per-user conversation state.
///
/// Implementations are shared between request handling and the background
/// janitor, so every read-modify-write sequence must be atomic per session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a snapshot of the session, creating it (and refreshing its
    /// last-activity timestamp) if absent.
    async fn get_or_create(&self, id: &str) -> Session;

    /// Append messages to a session atomically, creating it if absent.
    async fn append(&self, id: &str, messages: Vec<Message>);

    /// The most recent `n` messages of a session, oldest first. Empty if the
    /// session does not exist. Does not refresh last-activity.
    async fn history(&self, id: &str, n: usize) -> Vec<Message>;

    /// Remove every session idle longer than `threshold`, returning how many
    /// were evicted. Last-activity is re-checked under the write lock so a
    /// session touched mid-sweep is never dropped.
    async fn evict_idle(&self, threshold: Duration) -> usize;

    /// Number of live sessions.
    async fn session_count(&self) -> usize;
}

/// In-memory session store guarded by a single async `RwLock`.
///
/// Explicitly owned and injected into the orchestrator; there is no ambient
/// global map. Suitable for a single-process deployment, which is all this
/// assistant targets.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get_or_create(&self, id: &str) -> Session {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(id.to_string())
            .or_insert_with(|| Session::new(id));
        session.updated_at = Utc::now();
        session.clone()
    }

    async fn append(&self, id: &str, messages: Vec<Message>) {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(id.to_string())
            .or_insert_with(|| Session::new(id));
        for message in messages {
            session.add_message(message);
        }
    }

    async fn history(&self, id: &str, n: usize) -> Vec<Message> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .map(|s| s.recent(n).to_vec())
            .unwrap_or_default()
    }

    async fn evict_idle(&self, threshold: Duration) -> usize {
        // A threshold too large for chrono saturates: nothing is old enough.
        let threshold = chrono::Duration::from_std(threshold).unwrap_or(chrono::Duration::MAX);
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        // updated_at is read under the same write lock that append takes, so
        // a session touched after the sweep started is seen here and retained.
        sessions.retain(|_, s| now - s.updated_at <= threshold);
        before - sessions.len()
    }

    async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_creates_once() {
        let store = MemorySessionStore::new();
        let s1 = store.get_or_create("alice").await;
        assert_eq!(s1.messages.len(), 0);

        store.append("alice", vec![Message::user("hi")]).await;
        let s2 = store.get_or_create("alice").await;
        assert_eq!(s2.messages.len(), 1);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_append_only_ordering() {
        let store = MemorySessionStore::new();
        for i in 0..4 {
            store
                .append("s", vec![Message::user(format!("q{i}")), Message::assistant(format!("a{i}"))])
                .await;
        }
        let history = store.history("s", 100).await;
        assert_eq!(history.len(), 8);
        for pair in history.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        assert_eq!(history[0].content, "q0");
        assert_eq!(history[7].content, "a3");
    }

    #[tokio::test]
    async fn test_history_of_unknown_session_is_empty() {
        let store = MemorySessionStore::new();
        assert!(store.history("ghost", 6).await.is_empty());
    }

    #[tokio::test]
    async fn test_evict_idle_removes_only_stale() {
        let store = MemorySessionStore::new();
        store.append("stale", vec![Message::user("old")]).await;
        store.append("fresh", vec![Message::user("new")]).await;

        // Age the stale session directly.
        {
            let mut sessions = store.sessions.write().await;
            let s = sessions.get_mut("stale").unwrap();
            s.updated_at = Utc::now() - chrono::Duration::minutes(10);
        }

        let evicted = store.evict_idle(Duration::from_secs(300)).await;
        assert_eq!(evicted, 1);
        assert_eq!(store.session_count().await, 1);
        assert!(store.history("stale", 6).await.is_empty());
        assert_eq!(store.history("fresh", 6).await.len(), 1);
    }

    #[tokio::test]
    async fn test_unrepresentable_threshold_evicts_nothing() {
        let store = MemorySessionStore::new();
        store.append("old", vec![Message::user("hello")]).await;
        {
            let mut sessions = store.sessions.write().await;
            let s = sessions.get_mut("old").unwrap();
            s.updated_at = Utc::now() - chrono::Duration::days(365);
        }

        // A threshold beyond chrono's range saturates instead of silently
        // falling back to some shorter cutoff.
        let evicted = store.evict_idle(Duration::MAX).await;
        assert_eq!(evicted, 0);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_evict_idle_keeps_just_touched() {
        let store = MemorySessionStore::new();
        store.append("busy", vec![Message::user("hello")]).await;
        let evicted = store.evict_idle(Duration::from_secs(300)).await;
        assert_eq!(evicted, 0);
        assert_eq!(store.session_count().await, 1);
    }
}
