use super::CacheGateway;
use crate::codec::cast;
use shared::Result;
use std::time::Duration;

impl CacheGateway {
    /// Add `delta` to a counter and return the new value.
    ///
    /// The timeout only takes effect when this call creates the counter; later
    /// increments never touch its expiry. Reading and incrementing are separate
    /// round-trips, so two racing first increments may both set the timeout.
    pub async fn incr(&self, key: &str, delta: i64, timeout: Option<Duration>) -> Result<i64> {
        let cache_key = self.combine_key_and_prefix(key);
        let existing = self.get(key, cast::int).await?;

        let count = self
            .touch("incr", &cache_key, self.store().incr(&cache_key, delta))
            .await?;
        if existing.is_none() {
            self.set_timeout(&cache_key, timeout).await?;
        }
        Ok(count)
    }
}
