//! Session persistence.
//!
//! The store maps session IDs to session data for the duration of one
//! browser session. `put` replaces the whole entry in one operation, so two
//! racing writes for the same ID resolve last-writer-wins and readers never
//! observe a partial session.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::session::{SessionData, SessionId};

/// Opaque per-browser-session key/value persistence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session for the given ID, or a fresh empty session if
    /// the ID is unknown.
    async fn get(&self, id: &SessionId) -> SessionData;

    /// Replaces the session for the given ID.
    async fn put(&self, id: &SessionId, data: SessionData);

    /// Removes the session for the given ID. Unknown IDs are a no-op.
    async fn clear(&self, id: &SessionId);
}

/// In-memory session store.
///
/// Sessions do not survive a process restart; the browser simply
/// re-authenticates on its next request.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionData>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: &SessionId) -> SessionData {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    async fn put(&self, id: &SessionId, data: SessionData) {
        self.sessions.write().await.insert(id.clone(), data);
    }

    async fn clear(&self, id: &SessionId) {
        self.sessions.write().await.remove(id);
    }
}
