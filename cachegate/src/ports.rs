#![deny(clippy::all)]

use async_trait::async_trait;
use shared::{Result, StoreResult};
use std::sync::Arc;
use std::time::Duration;

// Ports are the pluggable extension points for the underlying key-value store

/// Port for establishing a store handle for a namespace
/// This allows different storage backends to be plugged in
#[async_trait]
pub trait StorageFactory: Send + Sync + 'static {
    /// Create (or hand out) the store that serves `namespace`
    async fn create_store(&self, namespace: &str) -> Result<Arc<dyn Store>>;
}

/// Port for the remote key-value store (e.g., Redis)
///
/// Keys are strings and values are byte strings. Each method is one store
/// round-trip; implementations must be safe to call concurrently.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;
    /// Write a string value, replacing any previous value and expiry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> StoreResult<()>;
    async fn incr(&self, key: &str, delta: i64) -> StoreResult<i64>;
    /// Returns false when the key does not exist.
    async fn expire(&self, key: &str, seconds: i64) -> StoreResult<bool>;
    /// Remaining seconds, `-1` without expiry, `-2` for a missing key.
    async fn ttl(&self, key: &str) -> StoreResult<i64>;
    async fn del(&self, key: &str) -> StoreResult<bool>;
    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>>;

    /// Push each value onto the head of the list, in argument order.
    async fn lpush(&self, key: &str, values: Vec<Vec<u8>>) -> StoreResult<usize>;
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Vec<u8>>>;

    /// Returns true when the member was newly added.
    async fn zadd(&self, key: &str, member: Vec<u8>, score: f64) -> StoreResult<bool>;
    async fn zrange_with_scores(
        &self,
        key: &str,
        start: isize,
        stop: isize,
        rev: bool,
    ) -> StoreResult<Vec<(Vec<u8>, f64)>>;
    async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> StoreResult<Vec<Vec<u8>>>;
    async fn zremrangebyscore(&self, key: &str, min: f64, max: f64) -> StoreResult<usize>;
}
