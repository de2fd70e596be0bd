//! Session key validation.

use std::borrow::Borrow;
use std::fmt;

use crate::error::{Error, Result};

/// A validated session key.
///
/// Keys are arbitrary non-empty strings. Callers holding numbers or other
/// displayable values convert them with `to_string()` first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey(String);

impl SessionKey {
    /// Validate a raw key.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self> {
        let raw = raw.as_ref();
        if raw.is_empty() {
            return Err(Error::InvalidKey(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SessionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SessionKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for SessionKey {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<String> for SessionKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::InvalidKey(value));
        }
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_non_empty() {
        let key = SessionKey::parse("user").unwrap();
        assert_eq!(key.as_str(), "user");
        assert_eq!(key.to_string(), "user");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(SessionKey::parse(""), Err(Error::InvalidKey(_))));
        assert!(SessionKey::try_from(String::new()).is_err());
    }

    #[test]
    fn test_numeric_keys_via_to_string() {
        let key = SessionKey::parse(42.to_string()).unwrap();
        assert_eq!(key.into_string(), "42");
    }

    #[test]
    fn test_whitespace_is_a_valid_key() {
        assert!(SessionKey::parse(" ").is_ok());
    }
}
