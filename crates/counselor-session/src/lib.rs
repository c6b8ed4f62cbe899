//! Short-lived per-user conversation memory.
//!
//! Sessions are keyed by an opaque client-supplied identifier, hold an
//! append-only exchange history, and are evicted wholesale once idle past a
//! staleness threshold by the background [`Janitor`].

/// Background idle-session eviction.
pub mod janitor;
/// The session type.
pub mod session;
/// Session store trait and in-memory implementation.
pub mod store;

pub use janitor::Janitor;
pub use session::{normalize_session_id, Session};
pub use store::{MemorySessionStore, SessionStore};
