#![deny(missing_docs)]
//! In-memory session store.
//!
//! Each [`SessionId`] owns one ordered conversation history. The map of
//! sessions sits behind a `RwLock` that is only held long enough to find or
//! create an entry; each session has its own `Mutex`, and a run holds that
//! session's guard for its whole duration. Runs on one session therefore
//! take turns, while runs on different sessions proceed independently.
//!
//! Sessions live for the lifetime of the process and are never evicted.

use std::collections::HashMap;
use std::sync::Arc;

use quire_types::{SessionId, Turn};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// One conversation.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    history: Vec<Turn>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            history: Vec::new(),
        }
    }

    /// The session's id.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Committed history, oldest first.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Append turns as one checkpoint.
    pub fn commit(&mut self, turns: impl IntoIterator<Item = Turn>) {
        self.history.extend(turns);
    }

    /// Number of committed turns.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether nothing has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Exclusive access to one session, held for the duration of a run.
pub type SessionGuard = OwnedMutexGuard<Session>;

/// All sessions known to this process.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    async fn entry(&self, id: &SessionId) -> Arc<Mutex<Session>> {
        if let Some(session) = self.sessions.read().await.get(id) {
            return Arc::clone(session);
        }
        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(Session::new(id.clone())))),
        )
    }

    /// Lock a session, creating it on first reference.
    ///
    /// Waits while another run holds the same session.
    pub async fn checkout(&self, id: &SessionId) -> SessionGuard {
        self.entry(id).await.lock_owned().await
    }

    /// A snapshot of a session's committed history, if it exists.
    pub async fn history(&self, id: &SessionId) -> Option<Vec<Turn>> {
        let session = self.sessions.read().await.get(id).cloned()?;
        let session = session.lock().await;
        Some(session.history.clone())
    }

    /// Whether the id has been referenced before.
    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Number of sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no session has been created.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
