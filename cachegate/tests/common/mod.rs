#![allow(dead_code)]

use async_trait::async_trait;
use cachegate::{CacheGateway, Store};
use shared::{StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storage_engine::MemoryStore;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

pub fn gateway(namespace: &str) -> (CacheGateway, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (CacheGateway::new(namespace, store.clone()), store)
}

/// Counts warning-level events emitted while it is installed.
#[derive(Clone, Default)]
pub struct WarningCounter(Arc<AtomicUsize>);

impl WarningCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Install as the thread's default subscriber until the guard is dropped.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }
}

impl<S: Subscriber> Layer<S> for WarningCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Store decorator that starts failing a chosen command after a number of
/// successful calls.
pub struct FaultyStore {
    inner: Arc<MemoryStore>,
    // command -> successful calls left before it fails
    budget: Mutex<HashMap<&'static str, usize>>,
}

impl FaultyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            budget: Mutex::new(HashMap::new()),
        }
    }

    pub fn fail_after(&self, command: &'static str, successes: usize) {
        self.budget.lock().unwrap().insert(command, successes);
    }

    fn check(&self, command: &'static str) -> StoreResult<()> {
        let mut budget = self.budget.lock().unwrap();
        match budget.get_mut(command) {
            Some(0) => Err(StoreError::Unavailable(format!(
                "connection reset during {}",
                command
            ))),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Store for FaultyStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.check("get")?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> StoreResult<()> {
        self.check("set")?;
        self.inner.set(key, value, ttl).await
    }

    async fn incr(&self, key: &str, delta: i64) -> StoreResult<i64> {
        self.check("incr")?;
        self.inner.incr(key, delta).await
    }

    async fn expire(&self, key: &str, seconds: i64) -> StoreResult<bool> {
        self.check("expire")?;
        self.inner.expire(key, seconds).await
    }

    async fn ttl(&self, key: &str) -> StoreResult<i64> {
        self.check("ttl")?;
        self.inner.ttl(key).await
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        self.check("del")?;
        self.inner.del(key).await
    }

    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        self.check("keys")?;
        self.inner.keys(pattern).await
    }

    async fn lpush(&self, key: &str, values: Vec<Vec<u8>>) -> StoreResult<usize> {
        self.check("lpush")?;
        self.inner.lpush(key, values).await
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Vec<u8>>> {
        self.check("lrange")?;
        self.inner.lrange(key, start, stop).await
    }

    async fn zadd(&self, key: &str, member: Vec<u8>, score: f64) -> StoreResult<bool> {
        self.check("zadd")?;
        self.inner.zadd(key, member, score).await
    }

    async fn zrange_with_scores(
        &self,
        key: &str,
        start: isize,
        stop: isize,
        rev: bool,
    ) -> StoreResult<Vec<(Vec<u8>, f64)>> {
        self.check("zrange")?;
        self.inner.zrange_with_scores(key, start, stop, rev).await
    }

    async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> StoreResult<Vec<Vec<u8>>> {
        self.check("zrangebyscore")?;
        self.inner.zrangebyscore(key, min, max).await
    }

    async fn zremrangebyscore(&self, key: &str, min: f64, max: f64) -> StoreResult<usize> {
        self.check("zremrangebyscore")?;
        self.inner.zremrangebyscore(key, min, max).await
    }
}
