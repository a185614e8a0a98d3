use super::CacheGateway;
use shared::Result;

impl CacheGateway {
    /// Delete every key of this namespace containing `pattern`.
    ///
    /// Keys are listed once and deleted one by one. A failure part-way leaves
    /// the earlier deletions in place.
    pub async fn remove_by_pattern(&self, pattern: &str) -> Result<usize> {
        let glob = self.namespace().containing_pattern(pattern);
        let keys = self
            .touch("keys", &glob, self.store().keys(&glob))
            .await?;

        let mut removed = 0;
        for key in keys {
            if self.touch("del", &key, self.store().del(&key)).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub async fn delete_key(&self, key: &str) -> Result<bool> {
        let cache_key = self.combine_key_and_prefix(key);
        self.touch("del", &cache_key, self.store().del(&cache_key))
            .await
    }

    /// Keys of this namespace matching the glob `key`, returned in full.
    pub async fn get_pattern(&self, key: &str) -> Result<Vec<String>> {
        let cache_key = self.combine_key_and_prefix(key);
        self.touch("keys", &cache_key, self.store().keys(&cache_key))
            .await
    }
}
