//! Key-value store with opt-in per-key expiry.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::key::SessionKey;
use crate::ttl::{ExpiryIndex, validate_duration};

/// Serializable form of an [`ExpiringStore`].
///
/// Expiry timestamps are unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreState {
    /// Stored values by key.
    pub entries: HashMap<String, Value>,

    /// Creation time of each key marked for expiry.
    pub expiry_index: HashMap<String, i64>,

    /// Expiry duration in seconds.
    pub default_expiry_secs: Option<u64>,
}

/// In-memory key-value store with an expiry index.
///
/// Values are stored forever unless their key was marked for expiry
/// (`set(.., true)` or [`set_time_to_expiry`](Self::set_time_to_expiry))
/// *and* a default expiry duration is configured. Expired keys are only
/// evicted when [`check_expiry`](Self::check_expiry) is called.
#[derive(Debug, Default, Clone)]
pub struct ExpiringStore {
    entries: HashMap<String, Value>,
    expiry: ExpiryIndex,
}

impl ExpiringStore {
    /// Create an empty store with no expiry duration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given expiry duration.
    pub fn with_default_expiry(duration: Duration) -> Result<Self> {
        let mut store = Self::new();
        store.set_default_expiry_duration(duration)?;
        Ok(store)
    }

    /// Store a value, overwriting any previous value for the key.
    ///
    /// With `with_expiry`, the key is also marked for expiry as of now.
    /// Null and `false` are rejected, and nothing is mutated on failure.
    pub fn set(
        &mut self,
        key: impl AsRef<str>,
        value: impl Into<Value>,
        with_expiry: bool,
    ) -> Result<()> {
        self.set_at(key, value, with_expiry, Utc::now())
    }

    /// Like [`set`](Self::set) with an explicit marking time.
    pub fn set_at(
        &mut self,
        key: impl AsRef<str>,
        value: impl Into<Value>,
        with_expiry: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let key = SessionKey::parse(key)?;
        let value = value.into();
        if matches!(value, Value::Null | Value::Bool(false)) {
            return Err(Error::InvalidValue(key.into_string()));
        }

        if with_expiry {
            self.expiry.mark(key.as_str(), now);
        }
        trace!(key = %key, with_expiry, "Value stored");
        self.entries.insert(key.into_string(), value);
        Ok(())
    }

    /// Record (or reset) the creation time used to expire a key.
    ///
    /// The key does not need to be present; an index entry for a missing key
    /// is simply dropped at the next sweep.
    pub fn set_time_to_expiry(&mut self, key: impl AsRef<str>, at: DateTime<Utc>) -> Result<()> {
        let key = SessionKey::parse(key)?;
        self.expiry.mark(key.as_str(), at);
        Ok(())
    }

    /// Mark a key for expiry as of now.
    pub fn mark_for_expiry(&mut self, key: impl AsRef<str>) -> Result<()> {
        self.set_time_to_expiry(key, Utc::now())
    }

    /// Set the expiry duration applied to every marked key.
    ///
    /// Replaces any previous duration.
    pub fn set_default_expiry_duration(&mut self, duration: Duration) -> Result<()> {
        let duration = validate_duration(duration)?;
        debug!(secs = duration.as_secs(), "Default expiry duration set");
        self.expiry.set_duration(Some(duration));
        Ok(())
    }

    /// Remove the expiry duration; sweeps become no-ops.
    pub fn clear_default_expiry_duration(&mut self) {
        self.expiry.set_duration(None);
    }

    /// The configured expiry duration.
    pub fn default_expiry_duration(&self) -> Option<Duration> {
        self.expiry.duration()
    }

    /// Evict every marked key older than the expiry duration.
    ///
    /// Returns the keys removed from the store.
    pub fn check_expiry(&mut self) -> Vec<String> {
        self.check_expiry_at(Utc::now())
    }

    /// Like [`check_expiry`](Self::check_expiry) with an explicit `now`.
    pub fn check_expiry_at(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut evicted = Vec::new();
        for key in self.expiry.drain_expired(now) {
            if self.entries.remove(&key).is_some() {
                debug!(key = %key, "Evicting expired key");
                evicted.push(key);
            } else {
                trace!(key = %key, "Dropped stale expiry entry");
            }
        }

        if !evicted.is_empty() {
            debug!(count = evicted.len(), "Expired keys evicted");
        }
        evicted
    }

    /// Look up a value. Invalid or absent keys yield `None`.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&Value> {
        self.entries.get(key.as_ref())
    }

    /// Look up a value, falling back to `default` when the key is invalid or
    /// absent.
    ///
    /// Stored values are returned as stored, including `""`, `0` and `[]`.
    pub fn get_or(&self, key: impl AsRef<str>, default: impl Into<Value>) -> Value {
        self.get(key).cloned().unwrap_or_else(|| default.into())
    }

    /// Remove a key, returning its value if it was present.
    ///
    /// The key's expiry entry is dropped with it.
    pub fn remove(&mut self, key: impl AsRef<str>) -> Result<Option<Value>> {
        let key = SessionKey::parse(key)?;
        self.expiry.remove(key.as_str());
        let value = self.entries.remove(key.as_str());
        if value.is_some() {
            trace!(key = %key, "Value removed");
        }
        Ok(value)
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: impl AsRef<str>) -> bool {
        self.entries.contains_key(key.as_ref())
    }

    /// Creation time recorded for a key marked for expiry.
    pub fn expiry_of(&self, key: impl AsRef<str>) -> Option<DateTime<Utc>> {
        self.expiry.created_at(key.as_ref())
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store holds no values.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Iterate over stored entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Drop every value and expiry entry. The duration is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.expiry.clear();
    }

    /// Store statistics.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.entries.len(),
            expiry_tracked: self.expiry.len(),
            default_expiry: self.expiry.duration(),
        }
    }

    /// Export the store for persistence.
    pub fn to_state(&self) -> StoreState {
        StoreState {
            entries: self.entries.clone(),
            expiry_index: self
                .expiry
                .iter()
                .map(|(key, at)| (key.to_string(), at.timestamp()))
                .collect(),
            default_expiry_secs: self.expiry.duration().map(|d| d.as_secs()),
        }
    }

    /// Rebuild a store from persisted state.
    ///
    /// Entries that could not have been written by [`set`](Self::set)
    /// (empty keys, null or `false` values) and out-of-range timestamps are
    /// skipped. A zero duration is treated as unset.
    pub fn from_state(state: StoreState) -> Self {
        let mut store = Self::new();

        for (key, value) in state.entries {
            if let Err(e) = store.set(&key, value, false) {
                warn!(error = %e, "Skipping invalid persisted entry");
            }
        }

        for (key, secs) in state.expiry_index {
            match DateTime::from_timestamp(secs, 0) {
                Some(at) => {
                    if let Err(e) = store.set_time_to_expiry(&key, at) {
                        warn!(error = %e, "Skipping invalid expiry entry");
                    }
                }
                None => warn!(key = %key, secs, "Skipping out-of-range expiry timestamp"),
            }
        }

        if let Some(secs) = state.default_expiry_secs.filter(|s| *s > 0) {
            store.expiry.set_duration(Some(Duration::from_secs(secs)));
        }

        store
    }
}

/// Store statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStats {
    /// Number of stored values.
    pub entries: usize,

    /// Number of keys in the expiry index.
    pub expiry_tracked: usize,

    /// Configured expiry duration.
    pub default_expiry: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use serde_json::json;

    #[test]
    fn test_set_and_get() {
        let mut store = ExpiringStore::new();
        store.set("user", "alice", false).unwrap();
        store.set("roles", json!(["admin", "dev"]), false).unwrap();
        store.set("prefs", json!({"theme": "dark"}), false).unwrap();

        assert_eq!(store.get("user"), Some(&json!("alice")));
        assert_eq!(store.get_or("roles", false), json!(["admin", "dev"]));
        assert_eq!(store.get("prefs").unwrap()["theme"], "dark");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = ExpiringStore::new();
        store.set("count", 1, false).unwrap();
        store.set("count", 2, false).unwrap();

        assert_eq!(store.get("count"), Some(&json!(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_rejects_invalid_key() {
        let mut store = ExpiringStore::new();
        let result = store.set("", "value", true);

        assert!(matches!(result, Err(Error::InvalidKey(_))));
        assert!(store.is_empty());
        assert_eq!(store.stats().expiry_tracked, 0);
    }

    #[test]
    fn test_set_rejects_null_and_false() {
        let mut store = ExpiringStore::new();
        store.set("flag", true, false).unwrap();

        assert!(matches!(
            store.set("flag", Value::Null, true),
            Err(Error::InvalidValue(_))
        ));
        assert!(matches!(
            store.set("flag", false, true),
            Err(Error::InvalidValue(_))
        ));

        // Prior value untouched, nothing marked
        assert_eq!(store.get("flag"), Some(&json!(true)));
        assert!(store.expiry_of("flag").is_none());
    }

    #[test]
    fn test_falsy_values_are_not_confused_with_absence() {
        let mut store = ExpiringStore::new();
        store.set("empty", "", false).unwrap();
        store.set("zero", 0, false).unwrap();
        store.set("list", json!([]), false).unwrap();

        assert_eq!(store.get_or("empty", "default"), json!(""));
        assert_eq!(store.get_or("zero", "default"), json!(0));
        assert_eq!(store.get_or("list", "default"), json!([]));
        assert_eq!(store.get_or("missing", "default"), json!("default"));
    }

    #[test]
    fn test_get_invalid_key_returns_default() {
        let store = ExpiringStore::new();
        assert_eq!(store.get(""), None);
        assert_eq!(store.get_or("", 7), json!(7));
    }

    #[test]
    fn test_remove() {
        let mut store = ExpiringStore::new();
        store.set("a", "v", true).unwrap();

        assert_eq!(store.remove("a").unwrap(), Some(json!("v")));
        assert_eq!(store.remove("a").unwrap(), None);
        assert_eq!(store.get_or("a", "gone"), json!("gone"));
        assert!(store.expiry_of("a").is_none());
        assert!(matches!(store.remove(""), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_check_expiry_without_duration_is_noop() {
        let mut store = ExpiringStore::new();
        store.set("a", "v", true).unwrap();

        let evicted = store.check_expiry_at(Utc::now() + TimeDelta::days(30));
        assert!(evicted.is_empty());
        assert!(store.contains("a"));
    }

    #[test]
    fn test_check_expiry_immediately_after_set_keeps_key() {
        let mut store = ExpiringStore::with_default_expiry(Duration::from_secs(60)).unwrap();
        store.set("a", "v", true).unwrap();

        assert!(store.check_expiry().is_empty());
        assert!(store.contains("a"));
    }

    #[test]
    fn test_check_expiry_evicts_old_keys_and_index_entries() {
        let mut store = ExpiringStore::new();
        store.set_default_expiry_duration(Duration::from_secs(5)).unwrap();

        let start = Utc::now();
        store.set_at("a", "v", true, start).unwrap();
        store.set_at("b", "w", true, start).unwrap();

        assert!(store.check_expiry_at(start + TimeDelta::seconds(5)).is_empty());

        let mut evicted = store.check_expiry_at(start + TimeDelta::seconds(6));
        evicted.sort();
        assert_eq!(evicted, vec!["a", "b"]);
        assert_eq!(store.get_or("a", "default"), json!("default"));
        assert_eq!(store.stats().expiry_tracked, 0);
    }

    #[test]
    fn test_unmarked_keys_never_expire() {
        let mut store = ExpiringStore::with_default_expiry(Duration::from_secs(1)).unwrap();
        let start = Utc::now();
        store.set_at("sticky", "v", false, start).unwrap();
        store.set_at("fleeting", "v", true, start).unwrap();

        let evicted = store.check_expiry_at(start + TimeDelta::days(365));
        assert_eq!(evicted, vec!["fleeting"]);
        assert!(store.contains("sticky"));
    }

    #[test]
    fn test_latest_duration_wins() {
        let mut store = ExpiringStore::new();
        let start = Utc::now();
        store.set_at("a", "v", true, start).unwrap();

        store.set_default_expiry_duration(Duration::from_secs(5)).unwrap();
        store.set_default_expiry_duration(Duration::from_secs(100)).unwrap();

        assert!(store.check_expiry_at(start + TimeDelta::seconds(50)).is_empty());
        assert_eq!(store.default_expiry_duration(), Some(Duration::from_secs(100)));

        store.set_default_expiry_duration(Duration::from_secs(10)).unwrap();
        assert_eq!(store.check_expiry_at(start + TimeDelta::seconds(50)), vec!["a"]);
    }

    #[test]
    fn test_maximum_duration_keeps_fresh_keys() {
        let mut store = ExpiringStore::new();
        store
            .set_default_expiry_duration(Duration::from_secs(u64::MAX))
            .unwrap();
        let now = Utc::now();
        store.set_at("a", "v", true, now).unwrap();

        assert!(store.check_expiry_at(now).is_empty());
        assert!(store.check_expiry_at(now + TimeDelta::days(3650)).is_empty());
        assert_eq!(store.get("a"), Some(&json!("v")));
    }

    #[test]
    fn test_invalid_duration_keeps_previous() {
        let mut store = ExpiringStore::with_default_expiry(Duration::from_secs(30)).unwrap();
        assert!(matches!(
            store.set_default_expiry_duration(Duration::ZERO),
            Err(Error::InvalidDuration(_))
        ));
        assert_eq!(store.default_expiry_duration(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_set_time_to_expiry_backdates() {
        let mut store = ExpiringStore::with_default_expiry(Duration::from_secs(5)).unwrap();
        store.set("a", "v", false).unwrap();

        let past = Utc::now() - TimeDelta::seconds(60);
        store.set_time_to_expiry("a", past).unwrap();
        assert_eq!(store.expiry_of("a").map(|t| t.timestamp()), Some(past.timestamp()));

        assert_eq!(store.check_expiry(), vec!["a"]);
        assert!(matches!(
            store.set_time_to_expiry("", past),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_stale_index_entry_is_dropped_by_sweep() {
        let mut store = ExpiringStore::with_default_expiry(Duration::from_secs(5)).unwrap();
        let past = Utc::now() - TimeDelta::seconds(60);
        store.set_time_to_expiry("ghost", past).unwrap();

        assert_eq!(store.stats().expiry_tracked, 1);
        assert!(store.check_expiry().is_empty());
        assert_eq!(store.stats().expiry_tracked, 0);
    }

    #[test]
    fn test_keys_sorted() {
        let mut store = ExpiringStore::new();
        store.set("b", 1, false).unwrap();
        store.set("a", 2, false).unwrap();
        assert_eq!(store.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_state_round_trip() {
        let mut store = ExpiringStore::with_default_expiry(Duration::from_secs(90)).unwrap();
        store.set("user", "alice", true).unwrap();
        store.set("cart", json!([1, 2]), false).unwrap();

        let restored = ExpiringStore::from_state(store.to_state());
        assert_eq!(restored.get("user"), Some(&json!("alice")));
        assert_eq!(restored.get("cart"), Some(&json!([1, 2])));
        assert_eq!(
            restored.expiry_of("user").map(|t| t.timestamp()),
            store.expiry_of("user").map(|t| t.timestamp())
        );
        assert_eq!(restored.default_expiry_duration(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_from_state_skips_invalid_entries() {
        let mut state = StoreState::default();
        state.entries.insert("ok".into(), json!("v"));
        state.entries.insert("".into(), json!("v"));
        state.entries.insert("nil".into(), Value::Null);
        state.expiry_index.insert("ok".into(), i64::MAX);
        state.default_expiry_secs = Some(0);

        let store = ExpiringStore::from_state(state);
        assert_eq!(store.keys(), vec!["ok"]);
        assert!(store.expiry_of("ok").is_none());
        assert_eq!(store.default_expiry_duration(), None);
    }
}
