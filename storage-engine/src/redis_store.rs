use async_trait::async_trait;
use cachegate::ports::Store;
use redis::aio::ConnectionManager;
use redis::{Cmd, FromRedisValue, RedisError};
use shared::{Error, Result, StoreError, StoreResult};
use std::fmt::Debug;
use std::time::Duration;

/// Redis-backed store, one command per operation
///
/// The connection manager reconnects on its own; a command that fails while
/// the server is unreachable surfaces as `StoreError::Unavailable`.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::Config(format!("invalid redis url '{}': {}", url, e)))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| Error::Store(store_error(e)))?;
        Ok(Self { conn })
    }

    async fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> StoreResult<T> {
        let mut conn = self.conn.clone();
        cmd.query_async(&mut conn).await.map_err(store_error)
    }
}

fn store_error(err: RedisError) -> StoreError {
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        return StoreError::Unavailable(err.to_string());
    }
    if err.code() == Some("WRONGTYPE") {
        return StoreError::WrongType;
    }
    let message = err.to_string();
    if message.contains("not an integer") {
        return StoreError::NotAnInteger;
    }
    StoreError::Protocol(message)
}

/// Score bound as Redis spells it.
fn score_arg(score: f64) -> String {
    if score == f64::INFINITY {
        "+inf".to_string()
    } else if score == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        score.to_string()
    }
}

/// Milliseconds for `SET ... PX`, rounded up so a sub-millisecond TTL does
/// not become the `PX 0` Redis rejects.
fn px_millis(ttl: Duration) -> u64 {
    let millis = ttl.as_nanos().div_ceil(1_000_000);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.query(redis::cmd("GET").arg(key)).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> StoreResult<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value.as_slice());
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(px_millis(ttl));
        }
        self.query(&cmd).await
    }

    async fn incr(&self, key: &str, delta: i64) -> StoreResult<i64> {
        self.query(redis::cmd("INCRBY").arg(key).arg(delta)).await
    }

    async fn expire(&self, key: &str, seconds: i64) -> StoreResult<bool> {
        self.query(redis::cmd("EXPIRE").arg(key).arg(seconds)).await
    }

    async fn ttl(&self, key: &str) -> StoreResult<i64> {
        self.query(redis::cmd("TTL").arg(key)).await
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        let removed: i64 = self.query(redis::cmd("DEL").arg(key)).await?;
        Ok(removed > 0)
    }

    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        self.query(redis::cmd("KEYS").arg(pattern)).await
    }

    async fn lpush(&self, key: &str, values: Vec<Vec<u8>>) -> StoreResult<usize> {
        let mut cmd = redis::cmd("LPUSH");
        cmd.arg(key);
        for value in &values {
            cmd.arg(value.as_slice());
        }
        self.query(&cmd).await
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Vec<u8>>> {
        self.query(redis::cmd("LRANGE").arg(key).arg(start).arg(stop))
            .await
    }

    async fn zadd(&self, key: &str, member: Vec<u8>, score: f64) -> StoreResult<bool> {
        let added: i64 = self
            .query(
                redis::cmd("ZADD")
                    .arg(key)
                    .arg(score_arg(score))
                    .arg(member.as_slice()),
            )
            .await?;
        Ok(added > 0)
    }

    async fn zrange_with_scores(
        &self,
        key: &str,
        start: isize,
        stop: isize,
        rev: bool,
    ) -> StoreResult<Vec<(Vec<u8>, f64)>> {
        let name = if rev { "ZREVRANGE" } else { "ZRANGE" };
        self.query(
            redis::cmd(name)
                .arg(key)
                .arg(start)
                .arg(stop)
                .arg("WITHSCORES"),
        )
        .await
    }

    async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> StoreResult<Vec<Vec<u8>>> {
        self.query(
            redis::cmd("ZRANGEBYSCORE")
                .arg(key)
                .arg(score_arg(min))
                .arg(score_arg(max)),
        )
        .await
    }

    async fn zremrangebyscore(&self, key: &str, min: f64, max: f64) -> StoreResult<usize> {
        self.query(
            redis::cmd("ZREMRANGEBYSCORE")
                .arg(key)
                .arg(score_arg(min))
                .arg(score_arg(max)),
        )
        .await
    }
}

impl Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("conn", &"<ConnectionManager>")
            .finish()
    }
}
