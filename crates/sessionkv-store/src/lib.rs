//! Session key-value store with per-key TTL expiry.
//!
//! This crate provides:
//! - [`ExpiringStore`]: a string-keyed map of JSON values with an opt-in
//!   expiry index and a caller-driven sweep
//! - [`Session`]: one store plus an id, options and a backend, with an
//!   init / commit / destroy lifecycle
//! - Storage backends for session snapshots (memory, JSON files)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use sessionkv_store::{MemoryBackend, Session, SessionOptions};
//!
//! let options = SessionOptions::new().with_default_expiry(Duration::from_secs(300));
//! let mut session = Session::init(MemoryBackend::new(), options, None)?;
//!
//! session.set("user", "alice", false)?;
//! session.set("otp", "123456", true)?;
//! session.check_expiry()?;
//! session.commit()?;
//! ```

mod config;
mod error;
mod file;
mod key;
mod persistence;
mod session;
mod shared;
mod store;
mod ttl;

pub use config::{DEFAULT_LIFETIME, SessionOptions};
pub use error::{Error, Result};
pub use file::FileBackend;
pub use key::SessionKey;
pub use persistence::{MemoryBackend, SessionBackend, SessionSnapshot};
pub use serde_json::Value;
pub use session::Session;
pub use shared::SharedSession;
pub use store::{ExpiringStore, StoreState, StoreStats};
pub use ttl::{ExpiryIndex, parse_duration_secs, validate_duration};
