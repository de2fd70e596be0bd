//! Thread-safe handle to a session.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::Result;
use crate::persistence::SessionBackend;
use crate::session::Session;

/// A session shared between threads.
///
/// The store and its expiry index sit behind one lock, so a sweep never
/// observes a value without its expiry entry or the other way around.
pub struct SharedSession<B: SessionBackend> {
    inner: Arc<Mutex<Session<B>>>,
}

impl<B: SessionBackend> SharedSession<B> {
    /// Wrap a session.
    pub fn new(session: Session<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// The session id.
    pub fn id(&self) -> String {
        self.inner.lock().id().to_string()
    }

    /// Store a value.
    pub fn set(
        &self,
        key: impl AsRef<str>,
        value: impl Into<Value>,
        with_expiry: bool,
    ) -> Result<()> {
        self.inner.lock().set(key, value, with_expiry)
    }

    /// Look up a value (cloned out of the lock).
    pub fn get(&self, key: impl AsRef<str>) -> Option<Value> {
        self.inner.lock().get(key).cloned()
    }

    /// Look up a value, falling back to `default`.
    pub fn get_or(&self, key: impl AsRef<str>, default: impl Into<Value>) -> Value {
        self.inner.lock().get_or(key, default)
    }

    /// Remove a key.
    pub fn remove(&self, key: impl AsRef<str>) -> Result<Option<Value>> {
        self.inner.lock().remove(key)
    }

    /// Replace the expiry duration.
    pub fn set_default_expiry_duration(&self, duration: Duration) -> Result<()> {
        self.inner.lock().set_default_expiry_duration(duration)
    }

    /// Evict expired keys.
    pub fn check_expiry(&self) -> Result<Vec<String>> {
        self.inner.lock().check_expiry()
    }

    /// Write the session to its backend.
    pub fn commit(&self) -> Result<()> {
        self.inner.lock().commit()
    }

    /// Run a closure with exclusive access to the session.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Session<B>) -> R,
    {
        f(&mut self.inner.lock())
    }
}

impl<B: SessionBackend> Clone for SharedSession<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
