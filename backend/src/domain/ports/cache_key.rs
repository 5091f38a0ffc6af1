//! Keys under which rendered pages are cached.

use std::fmt;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Version segment bumped whenever the cached payload shape changes.
const KEY_VERSION: &str = "v1";

/// Validation errors for [`CacheKey`] and [`CacheNamespace`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    /// Value was blank.
    #[error("cache key must not be empty")]
    Empty,
    /// Value contained whitespace.
    #[error("cache key must not contain whitespace")]
    ContainsWhitespace,
}

fn validate(raw: &str) -> Result<(), CacheKeyValidationError> {
    if raw.is_empty() {
        return Err(CacheKeyValidationError::Empty);
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(CacheKeyValidationError::ContainsWhitespace);
    }
    Ok(())
}

/// Prefix grouping the keys of one cached view, e.g. `index_page`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheNamespace(String);

impl CacheNamespace {
    /// Validate a namespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        let value = raw.into();
        validate(&value)?;
        Ok(Self(value))
    }

    /// Key for the page rendered at `request_uri` (path and query).
    ///
    /// The URI is hashed so arbitrary query strings give fixed-length keys.
    #[must_use]
    pub fn key_for(&self, request_uri: &str) -> CacheKey {
        let digest = Sha256::digest(request_uri.as_bytes());
        CacheKey(format!("{}:{KEY_VERSION}:{}", self.0, hex::encode(digest)))
    }

    /// Glob matching every key of this namespace.
    #[must_use]
    pub fn pattern(&self) -> String {
        format!("{}:{KEY_VERSION}:*", self.0)
    }

    /// Borrow the namespace.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A fully qualified cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Validate a raw key.
    pub fn new(raw: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        let value = raw.into();
        validate(&value)?;
        Ok(Self(value))
    }

    /// Borrow the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key belongs to `namespace`.
    #[must_use]
    pub fn belongs_to(&self, namespace: &CacheNamespace) -> bool {
        self.0
            .strip_prefix(namespace.as_str())
            .is_some_and(|rest| rest.starts_with(':'))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn index() -> CacheNamespace {
        CacheNamespace::new("index_page").expect("valid namespace")
    }

    #[rstest]
    fn keys_are_versioned_and_hashed(index: CacheNamespace) {
        let key = index.key_for("/api/v1/posts?page=2");
        let (prefix, digest) = key.as_str().rsplit_once(':').expect("separator");
        assert_eq!(prefix, "index_page:v1");
        assert_eq!(digest.len(), 64);
        assert!(key.belongs_to(&index));
    }

    #[rstest]
    fn different_pages_get_different_keys(index: CacheNamespace) {
        assert_ne!(index.key_for("/api/v1/posts"), index.key_for("/api/v1/posts?page=2"));
        assert_eq!(index.key_for("/api/v1/posts"), index.key_for("/api/v1/posts"));
    }

    #[rstest]
    fn namespaces_do_not_match_by_prefix_alone(index: CacheNamespace) {
        let other = CacheNamespace::new("index_page_extra").expect("valid namespace");
        assert!(!other.key_for("/").belongs_to(&index));
    }

    #[rstest]
    #[case("", CacheKeyValidationError::Empty)]
    #[case("has space", CacheKeyValidationError::ContainsWhitespace)]
    fn rejects_bad_keys(#[case] raw: &str, #[case] expected: CacheKeyValidationError) {
        assert_eq!(CacheKey::new(raw), Err(expected.clone()));
        assert_eq!(CacheNamespace::new(raw), Err(expected));
    }
}
