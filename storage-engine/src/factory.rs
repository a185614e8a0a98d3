use crate::memory_store::MemoryStore;
use async_trait::async_trait;
use cachegate::ports::{StorageFactory, Store};
use shared::Result;
use shared::config::{Config, StoreBackend};
use std::sync::Arc;

/// Hands every namespace the same process-wide [`MemoryStore`], so all
/// gateways share one keyspace the way they would share one Redis database.
#[derive(Debug, Default, Clone)]
pub struct MemoryStoreFactory {
    store: Arc<MemoryStore>,
}

impl MemoryStoreFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing store, e.g. one a test wants to inspect directly.
    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }
}

#[async_trait]
impl StorageFactory for MemoryStoreFactory {
    async fn create_store(&self, _namespace: &str) -> Result<Arc<dyn Store>> {
        let store: Arc<dyn Store> = self.store.clone();
        Ok(store)
    }
}

/// Opens a dedicated Redis connection for each namespace.
#[cfg(feature = "redis")]
#[derive(Debug, Clone)]
pub struct RedisStoreFactory {
    url: String,
}

#[cfg(feature = "redis")]
impl RedisStoreFactory {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[cfg(feature = "redis")]
#[async_trait]
impl StorageFactory for RedisStoreFactory {
    async fn create_store(&self, namespace: &str) -> Result<Arc<dyn Store>> {
        let store = crate::redis_store::RedisStore::connect(&self.url).await?;
        tracing::info!("Connected namespace '{}' to redis", namespace);
        let store: Arc<dyn Store> = Arc::new(store);
        Ok(store)
    }
}

/// Storage factory for the backend selected in `config`.
pub fn factory_from_config(config: &Config) -> Result<Arc<dyn StorageFactory>> {
    let factory: Arc<dyn StorageFactory> = match &config.backend {
        StoreBackend::Memory => Arc::new(MemoryStoreFactory::new()),
        #[cfg(feature = "redis")]
        StoreBackend::Redis(url) => Arc::new(RedisStoreFactory::new(url.clone())),
        #[cfg(not(feature = "redis"))]
        StoreBackend::Redis(_) => {
            return Err(shared::Error::Config(
                "redis backend requested but storage-engine was built without the `redis` feature"
                    .to_string(),
            ));
        }
    };
    Ok(factory)
}
