use super::CacheGateway;
use crate::codec::{Encode, decode_many, decode_one};
use shared::Result;
use std::fmt::Display;
use std::time::Duration;

impl CacheGateway {
    /// Read a scalar, decoded with `cast`. A missing key is `Ok(None)`.
    pub async fn get<T, F, E>(&self, key: &str, cast: F) -> Result<Option<T>>
    where
        F: Fn(&str) -> std::result::Result<T, E>,
        E: Display,
    {
        let cache_key = self.combine_key_and_prefix(key);
        let raw = self
            .touch("get", &cache_key, self.store().get(&cache_key))
            .await?;
        raw.map(|value| decode_one(&cache_key, &value, &cast))
            .transpose()
    }

    /// Read the inclusive `[start, stop]` range of a list; negative indices
    /// count from the end. A missing key reads as an empty list.
    pub async fn get_list<T, F, E>(
        &self,
        key: &str,
        cast: F,
        start: isize,
        stop: isize,
    ) -> Result<Vec<T>>
    where
        F: Fn(&str) -> std::result::Result<T, E>,
        E: Display,
    {
        let cache_key = self.combine_key_and_prefix(key);
        let raw = self
            .touch(
                "lrange",
                &cache_key,
                self.store().lrange(&cache_key, start, stop),
            )
            .await?;
        decode_many(&cache_key, raw, &cast)
    }

    /// Write a scalar; the timeout is applied by the same store command.
    pub async fn set<V>(&self, key: &str, value: &V, timeout: Option<Duration>) -> Result<()>
    where
        V: Encode + ?Sized,
    {
        let cache_key = self.combine_key_and_prefix(key);
        self.touch(
            "set",
            &cache_key,
            self.store().set(&cache_key, value.encode(), timeout),
        )
        .await
    }

    /// Left-push `values` onto a list, then apply the timeout to the whole list.
    pub async fn set_list<V>(&self, key: &str, values: &[V], timeout: Option<Duration>) -> Result<()>
    where
        V: Encode,
    {
        let cache_key = self.combine_key_and_prefix(key);
        let encoded = values.iter().map(|value| value.encode()).collect();
        self.touch("lpush", &cache_key, self.store().lpush(&cache_key, encoded))
            .await?;
        self.set_timeout(&cache_key, timeout).await
    }

    /// Remaining TTL exactly as the store reports it, sentinels included.
    pub async fn get_key_ttl(&self, key: &str) -> Result<i64> {
        let cache_key = self.combine_key_and_prefix(key);
        self.touch("ttl", &cache_key, self.store().ttl(&cache_key))
            .await
    }
}
