use super::CacheGateway;
use crate::codec::{Encode, decode_many};
use crate::domain::{NEVER_EXPIRES, sorted_set_lifetime};
use shared::Result;
use std::fmt::Display;
use tracing::debug;

impl CacheGateway {
    /// Insert or rescore `member`, then re-derive the set's expiry from its
    /// highest score.
    ///
    /// Scores are Unix timestamps; `None` means the member never expires.
    /// The set lives until `|max score - now| + 5` seconds from now. When that
    /// cannot be represented (an infinite max score, for one) the expiry is
    /// left as it is.
    pub async fn zadd<M>(&self, set_name: &str, member: &M, score: Option<f64>) -> Result<()>
    where
        M: Encode + ?Sized,
    {
        let cache_key = self.combine_key_and_prefix(set_name);
        let score = score.unwrap_or(NEVER_EXPIRES);
        self.touch(
            "zadd",
            &cache_key,
            self.store().zadd(&cache_key, member.encode(), score),
        )
        .await?;

        let top = self
            .touch(
                "zrange",
                &cache_key,
                self.store().zrange_with_scores(&cache_key, 0, 0, true),
            )
            .await?;
        let Some((_, max_score)) = top.first() else {
            return Ok(());
        };

        let now = chrono::Utc::now().timestamp();
        match sorted_set_lifetime(*max_score, now) {
            Some(lifetime) => {
                self.expire_in(&cache_key, lifetime).await?;
            }
            None => {
                debug!(
                    key = %cache_key,
                    max_score = *max_score,
                    "Skipping sorted set expiry, lifetime out of range"
                );
            }
        }
        Ok(())
    }

    /// Members scored within `[min_score, max_score]`, ascending by score.
    ///
    /// With `remove_out_of_range`, members scored in `[0, min_score]` are
    /// deleted first, so a member sitting exactly on `min_score` never comes
    /// back. Pruning and reading are two separate store calls.
    pub async fn zget<T, F, E>(
        &self,
        set_name: &str,
        min_score: f64,
        max_score: f64,
        cast: F,
        remove_out_of_range: bool,
    ) -> Result<Vec<T>>
    where
        F: Fn(&str) -> std::result::Result<T, E>,
        E: Display,
    {
        let cache_key = self.combine_key_and_prefix(set_name);
        if remove_out_of_range {
            self.touch(
                "zremrangebyscore",
                &cache_key,
                self.store().zremrangebyscore(&cache_key, 0.0, min_score),
            )
            .await?;
        }
        let raw = self
            .touch(
                "zrangebyscore",
                &cache_key,
                self.store().zrangebyscore(&cache_key, min_score, max_score),
            )
            .await?;
        decode_many(&cache_key, raw, &cast)
    }
}
