use super::CacheGateway;
use crate::codec::{deserialize_object, serialize_object};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::Result;

impl CacheGateway {
    /// Store any serializable value under the namespaced key, without expiry.
    pub async fn xset<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        let cache_key = self.combine_key_and_prefix(key);
        let blob = serialize_object(value)?;
        self.touch("set", &cache_key, self.store().set(&cache_key, blob, None))
            .await
    }

    /// Load a value written by [`CacheGateway::xset`].
    ///
    /// With `combine` false, `key` is used as-is, which lets components share
    /// objects across namespaces. Decoding failures are returned as
    /// `Error::Deserialization` and are not logged here.
    pub async fn xget<T>(&self, key: &str, combine: bool) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let cache_key = if combine {
            self.combine_key_and_prefix(key)
        } else {
            key.to_string()
        };
        let data = self
            .touch("get", &cache_key, self.store().get(&cache_key))
            .await?;
        data.map(|blob| deserialize_object(&blob)).transpose()
    }
}
