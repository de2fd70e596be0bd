//! Storage backends for session snapshots.
//!
//! The session layer never touches storage directly. It hands a
//! [`SessionSnapshot`] to a [`SessionBackend`], which decides where the
//! snapshot lives (process memory, a directory of JSON files, ...).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::store::StoreState;

/// Persisted form of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub id: String,

    /// Store contents, expiry index and duration.
    #[serde(default)]
    pub store: StoreState,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the session was last accessed; drives the session lifetime.
    pub last_accessed: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Create an empty snapshot.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            store: StoreState::default(),
            created_at: now,
            last_accessed: now,
        }
    }

    /// Encode as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Trait for session storage backends.
///
/// Implement this to plug the session layer into a host's storage.
pub trait SessionBackend: Send + Sync {
    /// Load a session. Return `Ok(None)` if it doesn't exist.
    fn load(&self, id: &str) -> Result<Option<SessionSnapshot>>;

    /// Create or replace a session.
    fn save(&self, snapshot: &SessionSnapshot) -> Result<()>;

    /// Delete a session. Returns whether it existed.
    fn delete(&self, id: &str) -> Result<bool>;

    /// List stored session ids.
    fn list(&self) -> Result<Vec<String>>;
}

impl<B: SessionBackend + ?Sized> SessionBackend for Arc<B> {
    fn load(&self, id: &str) -> Result<Option<SessionSnapshot>> {
        (**self).load(id)
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        (**self).save(snapshot)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        (**self).delete(id)
    }

    fn list(&self) -> Result<Vec<String>> {
        (**self).list()
    }
}

/// In-process backend. Sessions live as long as the backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    sessions: RwLock<HashMap<String, SessionSnapshot>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Check if no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl SessionBackend for MemoryBackend {
    fn load(&self, id: &str) -> Result<Option<SessionSnapshot>> {
        Ok(self.sessions.read().get(id).cloned())
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        trace!(session_id = %snapshot.id, "Saving session to memory");
        self.sessions
            .write()
            .insert(snapshot.id.clone(), snapshot.clone());
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.sessions.write().remove(id).is_some())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.sessions.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
