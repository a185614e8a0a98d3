use crate::domain::Namespace;
use crate::ports::Store;
use shared::{Error, Result, StoreResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Typed, namespaced facade over a [`Store`].
///
/// The gateway owns nothing but its namespace and the store handle, so it can
/// be cloned and shared freely across tasks. Operations are split by concern
/// over the sibling modules of this plane.
#[derive(Clone)]
pub struct CacheGateway {
    namespace: Namespace,
    store: Arc<dyn Store>,
}

impl CacheGateway {
    pub fn new(namespace: impl Into<String>, store: Arc<dyn Store>) -> Self {
        Self {
            namespace: Namespace::new(namespace),
            store,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub(super) fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub(super) fn combine_key_and_prefix(&self, key: &str) -> String {
        self.namespace.combine_key_and_prefix(key)
    }

    /// Single choke point for store round-trips.
    ///
    /// Success passes through untouched. A failure is logged once at warning
    /// level and handed back to the caller as the same `StoreError`.
    pub(super) async fn touch<T, Fut>(
        &self,
        operation: &'static str,
        key: &str,
        call: Fut,
    ) -> Result<T>
    where
        Fut: Future<Output = StoreResult<T>>,
    {
        match call.await {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(
                    namespace = %self.namespace,
                    operation,
                    key,
                    "{}",
                    err
                );
                Err(Error::Store(err))
            }
        }
    }

    /// EXPIRE `cache_key` when a timeout was given.
    pub(super) async fn set_timeout(&self, cache_key: &str, timeout: Option<Duration>) -> Result<()> {
        if let Some(timeout) = timeout {
            self.expire_in(cache_key, expire_seconds(timeout)).await?;
        }
        Ok(())
    }

    pub(super) async fn expire_in(&self, cache_key: &str, seconds: i64) -> Result<bool> {
        self.touch("expire", cache_key, self.store.expire(cache_key, seconds))
            .await
    }
}

impl std::fmt::Debug for CacheGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheGateway")
            .field("namespace", &self.namespace)
            .field("store", &"<dyn Store>")
            .finish()
    }
}

/// Whole seconds for EXPIRE, rounded up and never below one.
///
/// EXPIRE with zero seconds deletes the key, so a sub-second timeout must not
/// truncate to it.
fn expire_seconds(timeout: Duration) -> i64 {
    let secs = timeout
        .as_secs()
        .saturating_add(u64::from(timeout.subsec_nanos() > 0))
        .max(1);
    i64::try_from(secs).unwrap_or(i64::MAX)
}
