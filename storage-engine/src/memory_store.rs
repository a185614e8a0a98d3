use async_trait::async_trait;
use cachegate::domain::{TTL_KEY_MISSING, TTL_NO_EXPIRY};
use cachegate::ports::Store;
use dashmap::DashMap;
use glob::Pattern;
use shared::{StoreError, StoreResult};
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

enum Value {
    Str(Vec<u8>),
    List(VecDeque<Vec<u8>>),
    SortedSet(HashMap<Vec<u8>, f64>),
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

// Writes between two full sweeps of expired entries
const SWEEP_INTERVAL: usize = 1024;

/// In-process store with the key-value semantics the gateway relies on
///
/// An expired key is dropped the next time it is touched. Keys nobody touches
/// again are reclaimed by a full sweep, run by `keys` and every
/// `SWEEP_INTERVAL` writes. Keys left empty by a removal disappear, as they
/// would in Redis.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held, expired ones included until the next sweep.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry now.
    pub fn purge_expired(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
    }

    fn purge_if_expired(&self, key: &str) {
        self.entries.remove_if(key, |_, entry| entry.is_expired());
    }

    fn record_write(&self) {
        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % SWEEP_INTERVAL == 0 {
            self.purge_expired();
        }
    }
}

fn deadline(ttl: Duration, command: &str) -> StoreResult<Instant> {
    if ttl.is_zero() {
        return Err(invalid_expire_time(command));
    }
    Instant::now()
        .checked_add(ttl)
        .ok_or_else(|| invalid_expire_time(command))
}

fn invalid_expire_time(command: &str) -> StoreError {
    StoreError::Protocol(format!("invalid expire time in '{}' command", command))
}

/// Translate a store glob into one the `glob` crate accepts.
///
/// Runs of `*` collapse into one and `[^...]` becomes `[!...]`.
fn compile_glob(pattern: &str) -> StoreResult<Pattern> {
    let mut translated = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
                translated.push('*');
            }
            '[' if chars.peek() == Some(&'^') => {
                chars.next();
                translated.push_str("[!");
            }
            other => translated.push(other),
        }
    }
    Pattern::new(&translated).map_err(|e| StoreError::Protocol(format!("invalid pattern: {}", e)))
}

/// Inclusive index window for `[start, stop]` over `len` items, negative
/// indices counting from the end.
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start >= len || start > stop {
        return None;
    }
    Some((start as usize, stop as usize))
}

fn ordered(members: &HashMap<Vec<u8>, f64>) -> Vec<(Vec<u8>, f64)> {
    let mut ordered: Vec<(Vec<u8>, f64)> = members
        .iter()
        .map(|(member, score)| (member.clone(), *score))
        .collect();
    ordered.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    ordered
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.purge_if_expired(key);
        match self.entries.get(key) {
            None => Ok(None),
            Some(entry) => match &entry.value {
                Value::Str(bytes) => Ok(Some(bytes.clone())),
                _ => Err(StoreError::WrongType),
            },
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> StoreResult<()> {
        let expires_at = ttl.map(|ttl| deadline(ttl, "set")).transpose()?;
        self.record_write();
        self.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value),
                expires_at,
            },
        );
        Ok(())
    }

    async fn incr(&self, key: &str, delta: i64) -> StoreResult<i64> {
        self.record_write();
        self.purge_if_expired(key);
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::Str(b"0".to_vec())));
        let Value::Str(bytes) = &mut entry.value else {
            return Err(StoreError::WrongType);
        };
        let current: i64 = std::str::from_utf8(bytes)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or(StoreError::NotAnInteger)?;
        let updated = current.checked_add(delta).ok_or_else(|| {
            StoreError::Protocol("increment or decrement would overflow".to_string())
        })?;
        *bytes = updated.to_string().into_bytes();
        Ok(updated)
    }

    async fn expire(&self, key: &str, seconds: i64) -> StoreResult<bool> {
        self.purge_if_expired(key);
        if seconds <= 0 {
            return Ok(self.entries.remove(key).is_some());
        }
        let at = deadline(Duration::from_secs(seconds as u64), "expire")?;
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.expires_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> StoreResult<i64> {
        self.purge_if_expired(key);
        let Some(entry) = self.entries.get(key) else {
            return Ok(TTL_KEY_MISSING);
        };
        match entry.expires_at {
            None => Ok(TTL_NO_EXPIRY),
            Some(at) => {
                let remaining = at.saturating_duration_since(Instant::now());
                Ok(((remaining.as_millis() + 500) / 1000) as i64)
            }
        }
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        self.purge_if_expired(key);
        Ok(self.entries.remove(key).is_some())
    }

    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let pattern = compile_glob(pattern)?;
        self.purge_expired();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_expired() && pattern.matches(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn lpush(&self, key: &str, values: Vec<Vec<u8>>) -> StoreResult<usize> {
        if values.is_empty() {
            return Err(StoreError::Protocol(
                "wrong number of arguments for 'lpush' command".to_string(),
            ));
        }
        self.record_write();
        self.purge_if_expired(key);
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::List(VecDeque::new())));
        let Value::List(list) = &mut entry.value else {
            return Err(StoreError::WrongType);
        };
        for value in values {
            list.push_front(value);
        }
        Ok(list.len())
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Vec<u8>>> {
        self.purge_if_expired(key);
        let Some(entry) = self.entries.get(key) else {
            return Ok(Vec::new());
        };
        let Value::List(list) = &entry.value else {
            return Err(StoreError::WrongType);
        };
        Ok(match resolve_range(list.len(), start, stop) {
            Some((from, to)) => list.range(from..=to).cloned().collect(),
            None => Vec::new(),
        })
    }

    async fn zadd(&self, key: &str, member: Vec<u8>, score: f64) -> StoreResult<bool> {
        if score.is_nan() {
            return Err(StoreError::Protocol("score is not a valid float".to_string()));
        }
        self.record_write();
        self.purge_if_expired(key);
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::SortedSet(HashMap::new())));
        let Value::SortedSet(members) = &mut entry.value else {
            return Err(StoreError::WrongType);
        };
        Ok(members.insert(member, score).is_none())
    }

    async fn zrange_with_scores(
        &self,
        key: &str,
        start: isize,
        stop: isize,
        rev: bool,
    ) -> StoreResult<Vec<(Vec<u8>, f64)>> {
        self.purge_if_expired(key);
        let Some(entry) = self.entries.get(key) else {
            return Ok(Vec::new());
        };
        let Value::SortedSet(members) = &entry.value else {
            return Err(StoreError::WrongType);
        };
        let mut ordered = ordered(members);
        if rev {
            ordered.reverse();
        }
        Ok(match resolve_range(ordered.len(), start, stop) {
            Some((from, to)) => ordered[from..=to].to_vec(),
            None => Vec::new(),
        })
    }

    async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> StoreResult<Vec<Vec<u8>>> {
        self.purge_if_expired(key);
        let Some(entry) = self.entries.get(key) else {
            return Ok(Vec::new());
        };
        let Value::SortedSet(members) = &entry.value else {
            return Err(StoreError::WrongType);
        };
        Ok(ordered(members)
            .into_iter()
            .filter(|(_, score)| *score >= min && *score <= max)
            .map(|(member, _)| member)
            .collect())
    }

    async fn zremrangebyscore(&self, key: &str, min: f64, max: f64) -> StoreResult<usize> {
        self.purge_if_expired(key);
        let (removed, emptied) = {
            let Some(mut entry) = self.entries.get_mut(key) else {
                return Ok(0);
            };
            let Value::SortedSet(members) = &mut entry.value else {
                return Err(StoreError::WrongType);
            };
            let before = members.len();
            members.retain(|_, score| *score < min || *score > max);
            (before - members.len(), members.is_empty())
        };
        // A zadd may have refilled the set since the guard was released
        if emptied {
            self.entries.remove_if(key, |_, entry| {
                matches!(&entry.value, Value::SortedSet(members) if members.is_empty())
            });
        }
        Ok(removed)
    }
}

impl Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entry_count", &self.entries.len())
            .finish()
    }
}
