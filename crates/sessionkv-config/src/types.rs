//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [session]
//! lifetime_secs = 3600
//! read_only = false
//! default_expiry_secs = 300
//! sweep_on_load = true
//!
//! [storage]
//! dir = "/var/lib/sessionkv"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so partial configs (e.g. project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionkvConfig {
    /// Session defaults.
    pub session: Option<SessionConfig>,

    /// Where sessions are persisted.
    pub storage: Option<StorageConfig>,

    /// Console logging.
    pub logging: Option<LoggingConfig>,
}

impl SessionkvConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole, not merged field by field.
    pub fn merge(&mut self, other: SessionkvConfig) {
        if other.session.is_some() {
            self.session = other.session;
        }

        if other.storage.is_some() {
            self.storage = other.storage;
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Reject values that can never be honored.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref session) = self.session {
            if session.lifetime_secs == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "session.lifetime_secs".to_string(),
                    reason: "must be at least 1 second".to_string(),
                });
            }
            if session.default_expiry_secs == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "session.default_expiry_secs".to_string(),
                    reason: "must be at least 1 second".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Session section, or defaults.
    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }

    /// Storage section, or defaults.
    pub fn storage(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }

    /// Logging section, or defaults.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// Session defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle lifetime of a whole session, in seconds.
    pub lifetime_secs: Option<u64>,
    /// Open sessions read-only.
    pub read_only: bool,
    /// Expiry duration for keys marked with `--expire`, in seconds.
    pub default_expiry_secs: Option<u64>,
    /// Sweep expired keys whenever a session is loaded.
    pub sweep_on_load: bool,
}

/// Storage location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding session files. Defaults to the user data dir.
    pub dir: Option<PathBuf>,
}

/// Console logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used when `--verbose` is not given.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}
