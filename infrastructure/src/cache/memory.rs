//! In-memory key-value cache with per-key TTL
//!
//! Stands in for an external cache service behind the `SessionCache` port.
//! Expiry is checked lazily on read; there is no background eviction task.

use advisor_application::ports::session_cache::{CacheError, SessionCache};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Entry {
    value: String,
    expires_at: Instant,
}

#[derive(Default)]
pub struct InMemorySessionCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionCache for InMemorySessionCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = InMemorySessionCache::new();
        cache
            .set("context:abc", "{}", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("context:abc").await.unwrap().as_deref(), Some("{}"));
        cache.delete("context:abc").await.unwrap();
        assert_eq!(cache.get("context:abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_miss() {
        let cache = InMemorySessionCache::new();
        cache
            .set("context:abc", "{}", Duration::from_secs(0))
            .await
            .unwrap();
        assert_eq!(cache.get("context:abc").await.unwrap(), None);
    }
}
