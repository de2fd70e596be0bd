//! Session lifecycle around an [`ExpiringStore`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SessionOptions;
use crate::error::{Error, Result};
use crate::persistence::{SessionBackend, SessionSnapshot};
use crate::store::{ExpiringStore, StoreStats};
use crate::ttl::whole_secs;

/// One logical session: an id, its store, and the backend it came from.
///
/// A session is opened with [`Session::init`], mutated through the store
/// operations, written back with [`Session::commit`] and torn down with
/// [`Session::destroy`]. Dropping a session without committing discards
/// its changes.
#[derive(Debug)]
pub struct Session<B: SessionBackend> {
    id: String,
    store: ExpiringStore,
    options: SessionOptions,
    created_at: DateTime<Utc>,
    last_accessed: DateTime<Utc>,
    resumed: bool,
    backend: B,
}

impl<B: SessionBackend> Session<B> {
    /// Open a session.
    ///
    /// If `id` names a stored session that is still within its lifetime it
    /// is resumed and keeps its id. Otherwise a fresh session with a new id
    /// is created.
    pub fn init(backend: B, options: SessionOptions, id: Option<&str>) -> Result<Self> {
        Self::init_at(backend, options, id, Utc::now())
    }

    /// Like [`init`](Self::init) with an explicit `now`.
    pub fn init_at(
        backend: B,
        options: SessionOptions,
        id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if let Some(id) = id {
            match backend.load(id)? {
                Some(snapshot) if outlived(options.lifetime, snapshot.last_accessed, now) => {
                    if options.read_only {
                        return Err(Error::SessionExpired(id.to_string()));
                    }
                    debug!(session_id = %id, "Stored session outlived its lifetime, discarding");
                    backend.delete(id)?;
                }
                Some(snapshot) => return Ok(Self::resume(backend, options, snapshot, now)),
                None if options.read_only => return Err(Error::NotFound(id.to_string())),
                None => debug!(session_id = %id, "Unknown session id, starting fresh"),
            }
        }

        let mut store = ExpiringStore::new();
        if let Some(duration) = options.default_expiry {
            store.set_default_expiry_duration(duration)?;
        }

        let id = Uuid::new_v4().to_string();
        info!(session_id = %id, read_only = options.read_only, "Session started");

        Ok(Self {
            id,
            store,
            options,
            created_at: now,
            last_accessed: now,
            resumed: false,
            backend,
        })
    }

    fn resume(
        backend: B,
        options: SessionOptions,
        snapshot: SessionSnapshot,
        now: DateTime<Utc>,
    ) -> Self {
        let mut store = ExpiringStore::from_state(snapshot.store);
        if options.sweep_on_init && !options.read_only {
            store.check_expiry_at(now);
        }
        debug!(session_id = %snapshot.id, entries = store.len(), "Session resumed");

        Self {
            id: snapshot.id,
            store,
            options,
            created_at: snapshot.created_at,
            last_accessed: now,
            resumed: true,
            backend,
        }
    }

    /// The session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Options the session was opened with.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Read-only view of the underlying store.
    pub fn store(&self) -> &ExpiringStore {
        &self.store
    }

    /// Whether this session was loaded from the backend.
    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    /// Whether mutations are refused.
    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    /// When the session was first created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the session was last accessed.
    ///
    /// Set by [`init_at`](Self::init_at) and advanced only by
    /// [`touch_at`](Self::touch_at) and [`check_expiry_at`](Self::check_expiry_at),
    /// so it always follows the clock the caller opened the session with.
    pub fn last_accessed(&self) -> DateTime<Utc> {
        self.last_accessed
    }

    /// Record an access at `now`. Never moves `last_accessed` backwards.
    pub fn touch_at(&mut self, now: DateTime<Utc>) {
        self.last_accessed = self.last_accessed.max(now);
    }

    /// Whether the session has outlived its lifetime at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        outlived(self.options.lifetime, self.last_accessed, now)
    }

    /// Store a value. See [`ExpiringStore::set`].
    pub fn set(
        &mut self,
        key: impl AsRef<str>,
        value: impl Into<Value>,
        with_expiry: bool,
    ) -> Result<()> {
        self.writable()?.set(key, value, with_expiry)
    }

    /// Look up a value.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&Value> {
        self.store.get(key)
    }

    /// Look up a value, falling back to `default`.
    pub fn get_or(&self, key: impl AsRef<str>, default: impl Into<Value>) -> Value {
        self.store.get_or(key, default)
    }

    /// Remove a key. See [`ExpiringStore::remove`].
    pub fn remove(&mut self, key: impl AsRef<str>) -> Result<Option<Value>> {
        self.writable()?.remove(key)
    }

    /// Record the creation time used to expire a key.
    pub fn set_time_to_expiry(&mut self, key: impl AsRef<str>, at: DateTime<Utc>) -> Result<()> {
        self.writable()?.set_time_to_expiry(key, at)
    }

    /// Mark a key for expiry as of now.
    pub fn mark_for_expiry(&mut self, key: impl AsRef<str>) -> Result<()> {
        self.writable()?.mark_for_expiry(key)
    }

    /// Replace the expiry duration.
    pub fn set_default_expiry_duration(&mut self, duration: Duration) -> Result<()> {
        self.writable()?.set_default_expiry_duration(duration)
    }

    /// Evict expired keys, returning them.
    pub fn check_expiry(&mut self) -> Result<Vec<String>> {
        Ok(self.writable()?.check_expiry())
    }

    /// Like [`check_expiry`](Self::check_expiry) with an explicit `now`.
    pub fn check_expiry_at(&mut self, now: DateTime<Utc>) -> Result<Vec<String>> {
        let expired = self.writable()?.check_expiry_at(now);
        self.touch_at(now);
        Ok(expired)
    }

    /// Store statistics.
    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Persisted form of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            store: self.store.to_state(),
            created_at: self.created_at,
            last_accessed: self.last_accessed,
        }
    }

    /// Write the session to the backend.
    pub fn commit(&mut self) -> Result<()> {
        if self.options.read_only {
            return Err(Error::ReadOnly(self.id.clone()));
        }
        self.backend.save(&self.snapshot())?;
        debug!(session_id = %self.id, entries = self.store.len(), "Session committed");
        Ok(())
    }

    /// Delete the session from the backend and end it.
    ///
    /// Returns whether the backend held the session.
    pub fn destroy(self) -> Result<bool> {
        if self.options.read_only {
            return Err(Error::ReadOnly(self.id));
        }
        let existed = self.backend.delete(&self.id)?;
        info!(session_id = %self.id, "Session destroyed");
        Ok(existed)
    }

    fn writable(&mut self) -> Result<&mut ExpiringStore> {
        if self.options.read_only {
            return Err(Error::ReadOnly(self.id.clone()));
        }
        Ok(&mut self.store)
    }
}

fn outlived(lifetime: Option<Duration>, last_accessed: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match lifetime {
        Some(lifetime) => now.timestamp() - last_accessed.timestamp() > whole_secs(lifetime),
        None => false,
    }
}
