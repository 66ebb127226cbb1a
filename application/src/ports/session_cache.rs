//! Key-value cache collaborator port
//!
//! Optional mirror for serialized session state, so conversations survive a
//! process restart within the inactivity window. The session store treats
//! every cache failure as a miss; the in-memory map remains authoritative.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from the key-value cache collaborator
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
}

/// String key-value store with per-key TTL
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
