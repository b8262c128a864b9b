//! Process-local response cache
//!
//! One shard per subject, each behind its own lock, so subjects never
//! contend with each other. Expiry is lazy: expired entries read as misses
//! and stay until overwritten or cleared.

use async_trait::async_trait;
use cake_application::{CacheEntry, CacheError, ResponseCache};
use cake_domain::{CacheKey, Subject};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

type Shard = RwLock<HashMap<CacheKey, CacheEntry>>;

pub struct InMemoryResponseCache {
    shards: HashMap<Subject, Shard>,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self {
            shards: Subject::ALL
                .iter()
                .map(|subject| (*subject, RwLock::new(HashMap::new())))
                .collect(),
        }
    }

    fn shard(&self, key: &CacheKey) -> Result<&Shard, CacheError> {
        self.shards
            .get(&key.subject())
            .ok_or_else(|| CacheError::Other(format!("no shard for subject '{}'", key.subject())))
    }
}

impl Default for InMemoryResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let shard = self.shard(key)?.read().await;
        let now = Instant::now();
        Ok(shard.get(key).filter(|entry| !entry.is_expired(now)).cloned())
    }

    async fn put(&self, key: CacheKey, text: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry::new(text, Instant::now(), ttl);
        self.shard(&key)?.write().await.insert(key, entry);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        for shard in self.shards.values() {
            shard.write().await.clear();
        }
        Ok(())
    }

    async fn len(&self) -> Result<usize, CacheError> {
        let mut total = 0;
        for shard in self.shards.values() {
            total += shard.read().await.len();
        }
        Ok(total)
    }
}
