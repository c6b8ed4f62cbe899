use chrono::{DateTime, Utc};
use counselor_core::Message;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single user's conversation state.
///
/// History is append-only: messages are never edited or removed individually,
/// only the whole session is evicted once idle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque client-supplied identifier; used only as a map key.
    pub id: String,
    /// Ordered exchange history.
    pub messages: Vec<Message>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Last-activity timestamp; refreshed on every touch.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and refresh the last-activity timestamp.
    pub fn add_message(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// Number of messages in the history.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// The most recent `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

/// Normalize an untrusted session identifier.
///
/// Empty or whitespace-only identifiers are replaced with a freshly generated
/// one rather than rejected; anything else is trimmed and used verbatim.
pub fn normalize_session_id(id: &str) -> String {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        trimmed.to_string()
    }
}
