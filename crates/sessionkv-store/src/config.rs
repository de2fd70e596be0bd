//! Options for opening a session.

use std::time::Duration;

/// Default session lifetime (none - sessions live until destroyed).
pub const DEFAULT_LIFETIME: Option<Duration> = None;

/// Options applied when a session is initialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionOptions {
    /// Idle lifetime of the whole session.
    /// A stored session not accessed within this duration is discarded on init.
    pub lifetime: Option<Duration>,

    /// Open the session for reading only. Mutations fail with `ReadOnly`
    /// and nothing is written back.
    pub read_only: bool,

    /// Expiry duration seeded into newly created sessions.
    pub default_expiry: Option<Duration>,

    /// Run an expiry sweep when a stored session is resumed.
    pub sweep_on_init: bool,
}

impl SessionOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the idle lifetime of the session.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Clear the idle lifetime; sessions live until destroyed.
    pub fn without_lifetime(mut self) -> Self {
        self.lifetime = DEFAULT_LIFETIME;
        self
    }

    /// Open the session read-only.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Seed new sessions with an expiry duration.
    pub fn with_default_expiry(mut self, duration: Duration) -> Self {
        self.default_expiry = Some(duration);
        self
    }

    /// Sweep expired keys when a session is resumed.
    pub fn with_sweep_on_init(mut self, enabled: bool) -> Self {
        self.sweep_on_init = enabled;
        self
    }
}
