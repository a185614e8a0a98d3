use async_trait::async_trait;
use cachegate::{GatewayRegistry, StorageFactory, Store, cast};
use std::sync::Arc;
use std::time::Duration;
use storage_engine::{MemoryStore, MemoryStoreFactory};
use tokio::sync::Notify;

/// Factory whose "slow" namespace does not connect until released.
struct StalledFactory {
    store: Arc<MemoryStore>,
    release: Arc<Notify>,
}

#[async_trait]
impl StorageFactory for StalledFactory {
    async fn create_store(&self, namespace: &str) -> shared::Result<Arc<dyn Store>> {
        if namespace == "slow" {
            self.release.notified().await;
        }
        let store: Arc<dyn Store> = self.store.clone();
        Ok(store)
    }
}

#[tokio::test]
async fn test_registry_creates_one_gateway_per_namespace() {
    let registry = GatewayRegistry::new(Arc::new(MemoryStoreFactory::new()));

    let first = registry.gateway("sessions").await.unwrap();
    let again = registry.gateway("sessions").await.unwrap();
    let other = registry.gateway("rate").await.unwrap();

    assert!(Arc::ptr_eq(&first, &again));
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(first.namespace().as_str(), "sessions");
    assert!(registry.contains("rate").await);
    assert!(!registry.contains("unknown").await);
    assert_eq!(registry.namespaces().await, ["rate", "sessions"]);
}

#[tokio::test]
async fn test_registry_gateways_are_isolated_by_namespace() {
    let factory = MemoryStoreFactory::new();
    let registry = GatewayRegistry::new(Arc::new(factory.clone()));

    let sessions = registry.gateway("sessions").await.unwrap();
    let rate = registry.gateway("rate").await.unwrap();

    sessions.set("token", "abc", None).await.unwrap();

    assert_eq!(rate.get("token", cast::text).await.unwrap(), None);
    assert_eq!(
        sessions.get("token", cast::text).await.unwrap(),
        Some("abc".to_string())
    );
    assert_eq!(factory.store().len(), 1);
}

#[tokio::test]
async fn test_registry_is_shared_across_tasks() {
    let registry = GatewayRegistry::new(Arc::new(MemoryStoreFactory::new()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            let gateway = registry.gateway("hits").await.unwrap();
            gateway.incr("total", 1, None).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let gateway = registry.gateway("hits").await.unwrap();
    assert_eq!(gateway.get("total", cast::int).await.unwrap(), Some(8));
    assert_eq!(registry.namespaces().await, ["hits"]);
}

#[tokio::test]
async fn test_slow_store_creation_does_not_block_other_namespaces() {
    let release = Arc::new(Notify::new());
    let registry = GatewayRegistry::new(Arc::new(StalledFactory {
        store: Arc::new(MemoryStore::new()),
        release: release.clone(),
    }));
    let fast = registry.gateway("fast").await.unwrap();

    let pending = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.gateway("slow").await })
    };
    tokio::task::yield_now().await;

    let again = tokio::time::timeout(Duration::from_secs(1), registry.gateway("fast"))
        .await
        .expect("lookup waited on another namespace")
        .unwrap();
    assert!(Arc::ptr_eq(&fast, &again));
    let created = tokio::time::timeout(Duration::from_secs(1), registry.gateway("other"))
        .await
        .expect("creation waited on another namespace")
        .unwrap();
    assert_eq!(created.namespace().as_str(), "other");

    release.notify_one();
    let slow = pending.await.unwrap().unwrap();
    assert_eq!(slow.namespace().as_str(), "slow");
    assert_eq!(registry.namespaces().await, ["fast", "other", "slow"]);
}
