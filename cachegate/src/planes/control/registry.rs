use crate::planes::data::CacheGateway;
use crate::ports::StorageFactory;
use shared::Result;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Hands out one [`CacheGateway`] per namespace.
///
/// A gateway is created the first time its namespace is requested, with a
/// store obtained from the injected factory, and reused afterwards.
#[derive(Clone)]
pub struct GatewayRegistry {
    // Maps namespace -> gateway
    gateways: Arc<RwLock<HashMap<String, Arc<CacheGateway>>>>,
    factory: Arc<dyn StorageFactory>,
}

impl GatewayRegistry {
    pub fn new(factory: Arc<dyn StorageFactory>) -> Self {
        Self {
            gateways: Arc::new(RwLock::new(HashMap::new())),
            factory,
        }
    }

    /// Gateway for `namespace`, creating it on first use.
    pub async fn gateway(&self, namespace: &str) -> Result<Arc<CacheGateway>> {
        if let Some(gateway) = self.gateways.read().await.get(namespace) {
            return Ok(gateway.clone());
        }

        // Connect without holding the lock so lookups of other namespaces
        // never wait on a slow store
        let store = self.factory.create_store(namespace).await?;

        let mut gateways = self.gateways.write().await;
        // Another task may have won the race while we were connecting
        if let Some(gateway) = gateways.get(namespace) {
            return Ok(gateway.clone());
        }

        let gateway = Arc::new(CacheGateway::new(namespace, store));
        gateways.insert(namespace.to_string(), gateway.clone());
        debug!("Created cache gateway for namespace '{}'", namespace);

        Ok(gateway)
    }

    pub async fn contains(&self, namespace: &str) -> bool {
        self.gateways.read().await.contains_key(namespace)
    }

    /// Namespaces with a live gateway, sorted.
    pub async fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.gateways.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Debug for GatewayRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayRegistry")
            .field("gateways", &"<RwLock<HashMap>>")
            .finish()
    }
}
