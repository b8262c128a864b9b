//! Response cache port
//!
//! Stores rendered responses under a [`CacheKey`] with a per-entry TTL.
//! Expiry is lazy: an expired entry is reported as absent and may be
//! overwritten, but nothing sweeps it proactively.

use async_trait::async_trait;
use cake_domain::CacheKey;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Errors from a cache backend.
///
/// Never fatal to a request: callers log them and carry on as a miss.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache error: {0}")]
    Other(String),
}

/// An immutable cached response
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub text: String,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl CacheEntry {
    /// Upper bound for absurdly long TTLs that would overflow `Instant`
    const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

    pub fn new(text: impl Into<String>, created_at: Instant, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            created_at,
            expires_at: created_at
                .checked_add(ttl.min(Self::MAX_TTL))
                .unwrap_or(created_at),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Live entry for `key`, or `None` when absent or expired
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    /// Store unconditionally, replacing whatever was there
    async fn put(&self, key: CacheKey, text: String, ttl: Duration) -> Result<(), CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;

    /// Number of stored entries, expired ones included
    async fn len(&self) -> Result<usize, CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_at_ttl() {
        let now = Instant::now();
        let entry = CacheEntry::new("hi", now, Duration::from_secs(60));
        assert!(!entry.is_expired(now));
        assert!(!entry.is_expired(now + Duration::from_secs(59)));
        assert!(entry.is_expired(now + Duration::from_secs(60)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_is_expired_immediately() {
        let now = Instant::now();
        assert!(CacheEntry::new("hi", now, Duration::ZERO).is_expired(now));
    }
}
