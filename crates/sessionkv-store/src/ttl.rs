//! Expiry index for per-key TTL.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Validate an expiry duration.
///
/// Durations are tracked in whole seconds, so anything shorter than one
/// second coerces to zero and is rejected.
pub fn validate_duration(duration: Duration) -> Result<Duration> {
    match duration.as_secs() {
        0 => Err(Error::InvalidDuration(format!("{duration:?}"))),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/// Parse a textual expiry duration in seconds (e.g. `"300"`).
pub fn parse_duration_secs(input: &str) -> Result<Duration> {
    let secs: u64 = input
        .trim()
        .parse()
        .map_err(|_| Error::InvalidDuration(input.to_string()))?;
    validate_duration(Duration::from_secs(secs))
}

/// Tracks creation times of keys marked for expiry.
///
/// Only keys explicitly marked are tracked; everything else is immune to
/// sweeps. A single duration applies to every tracked key.
#[derive(Debug, Default, Clone)]
pub struct ExpiryIndex {
    /// Creation time for each tracked key.
    created_at: HashMap<String, DateTime<Utc>>,

    /// Expiry duration (None means sweeps are no-ops).
    duration: Option<Duration>,
}

impl ExpiryIndex {
    /// Create an empty index with the given duration.
    pub fn new(duration: Option<Duration>) -> Self {
        Self {
            created_at: HashMap::new(),
            duration,
        }
    }

    /// Record (or reset) the creation time for a key.
    pub fn mark(&mut self, key: &str, at: DateTime<Utc>) {
        self.created_at.insert(key.to_string(), at);
    }

    /// Stop tracking a key.
    pub fn remove(&mut self, key: &str) -> Option<DateTime<Utc>> {
        self.created_at.remove(key)
    }

    /// Creation time recorded for a key.
    pub fn created_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.created_at.get(key).copied()
    }

    /// Whether a tracked key has outlived the duration at `now`.
    ///
    /// Comparison is in whole unix seconds: a key created at `t` expires once
    /// `now - t` strictly exceeds the duration.
    pub fn is_expired(&self, key: &str, now: DateTime<Utc>) -> bool {
        match (self.duration, self.created_at.get(key)) {
            (Some(ttl), Some(created)) => elapsed_secs(*created, now) > whole_secs(ttl),
            _ => false,
        }
    }

    /// All tracked keys that have expired at `now`.
    pub fn get_expired(&self, now: DateTime<Utc>) -> Vec<String> {
        let Some(ttl) = self.duration else {
            return Vec::new();
        };
        let ttl = whole_secs(ttl);
        self.created_at
            .iter()
            .filter(|(_, created)| elapsed_secs(**created, now) > ttl)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Remove every expired key from the index and return them.
    pub fn drain_expired(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let expired = self.get_expired(now);
        for key in &expired {
            self.created_at.remove(key);
        }
        expired
    }

    /// Iterate over tracked keys and their creation times.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> {
        self.created_at.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.created_at.len()
    }

    /// Check if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.created_at.is_empty()
    }

    /// Drop all tracked keys. The duration is kept.
    pub fn clear(&mut self) {
        self.created_at.clear();
    }

    /// The configured duration.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Replace the duration.
    pub fn set_duration(&mut self, duration: Option<Duration>) {
        self.duration = duration;
    }
}

fn elapsed_secs(created: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.timestamp() - created.timestamp()
}

/// Whole seconds of `duration`, saturating at `i64::MAX`.
pub(crate) fn whole_secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_no_duration_never_expires() {
        let mut index = ExpiryIndex::new(None);
        let created = Utc::now() - TimeDelta::days(365);
        index.mark("a", created);

        assert!(!index.is_expired("a", Utc::now()));
        assert!(index.get_expired(Utc::now()).is_empty());
    }

    #[test]
    fn test_expiry_is_strictly_greater_than_duration() {
        let mut index = ExpiryIndex::new(Some(Duration::from_secs(5)));
        let created = Utc::now();
        index.mark("a", created);

        assert!(!index.is_expired("a", created + TimeDelta::seconds(5)));
        assert!(index.is_expired("a", created + TimeDelta::seconds(6)));
    }

    #[test]
    fn test_mark_resets_timer() {
        let mut index = ExpiryIndex::new(Some(Duration::from_secs(10)));
        let start = Utc::now();
        index.mark("a", start);
        index.mark("a", start + TimeDelta::seconds(8));

        assert!(!index.is_expired("a", start + TimeDelta::seconds(15)));
    }

    #[test]
    fn test_untracked_key_is_not_expired() {
        let index = ExpiryIndex::new(Some(Duration::from_secs(1)));
        assert!(!index.is_expired("ghost", Utc::now() + TimeDelta::days(1)));
    }

    #[test]
    fn test_drain_expired() {
        let mut index = ExpiryIndex::new(Some(Duration::from_secs(5)));
        let start = Utc::now();
        index.mark("old-1", start - TimeDelta::seconds(30));
        index.mark("old-2", start - TimeDelta::seconds(10));
        index.mark("fresh", start);

        let mut expired = index.drain_expired(start);
        expired.sort();
        assert_eq!(expired, vec!["old-1", "old-2"]);
        assert_eq!(index.len(), 1);
        assert!(index.created_at("fresh").is_some());
    }

    #[test]
    fn test_set_duration_replaces() {
        let mut index = ExpiryIndex::new(Some(Duration::from_secs(100)));
        let start = Utc::now();
        index.mark("a", start - TimeDelta::seconds(50));

        assert!(!index.is_expired("a", start));
        index.set_duration(Some(Duration::from_secs(20)));
        assert!(index.is_expired("a", start));
    }

    #[test]
    fn test_huge_duration_saturates() {
        let mut index = ExpiryIndex::new(Some(Duration::from_secs(u64::MAX)));
        let start = Utc::now();
        index.mark("a", start - TimeDelta::days(365));

        assert!(!index.is_expired("a", start));
        assert!(index.get_expired(start).is_empty());
        assert_eq!(whole_secs(Duration::from_secs(1 << 63)), i64::MAX);
        assert_eq!(whole_secs(Duration::from_secs(90)), 90);
    }

    #[test]
    fn test_validate_duration() {
        assert!(validate_duration(Duration::from_secs(1)).is_ok());
        assert!(matches!(
            validate_duration(Duration::ZERO),
            Err(Error::InvalidDuration(_))
        ));
        assert!(validate_duration(Duration::from_millis(900)).is_err());
        assert_eq!(
            validate_duration(Duration::from_millis(2500)).unwrap(),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_parse_duration_secs() {
        assert_eq!(parse_duration_secs("300").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration_secs(" 7 ").unwrap(), Duration::from_secs(7));
        assert!(parse_duration_secs("0").is_err());
        assert!(parse_duration_secs("-5").is_err());
        assert!(parse_duration_secs("soon").is_err());
        assert!(parse_duration_secs("").is_err());
    }
}
