use std::fmt;
use std::sync::Arc;

/// `TTL` reply for a key that does not exist.
pub const TTL_KEY_MISSING: i64 = -2;
/// `TTL` reply for a key that exists without an expiry.
pub const TTL_NO_EXPIRY: i64 = -1;

/// Seconds added on top of a sorted set's computed lifetime.
pub const EXPIRY_GRACE_SECS: i64 = 5;

/// Score given to sorted-set members inserted without one.
pub const NEVER_EXPIRES: f64 = f64::INFINITY;

/// Name of a logical cache. Every key the gateway touches is prefixed with it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Namespace(Arc<str>);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::from(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store key for `key` inside this namespace: `namespace:key`.
    pub fn combine_key_and_prefix(&self, key: &str) -> String {
        format!("{}:{}", self.0, key)
    }

    /// Glob matching every key in this namespace that contains `pattern`.
    pub fn containing_pattern(&self, pattern: &str) -> String {
        self.combine_key_and_prefix(&format!("*{}*", pattern))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifetime of a sorted set whose highest score is `max_score`, counted from
/// `now` (both Unix seconds), including the grace margin.
///
/// `None` when the result is not representable, e.g. for members inserted
/// with the default infinite score.
pub fn sorted_set_lifetime(max_score: f64, now: i64) -> Option<i64> {
    if !max_score.is_finite() || max_score >= i64::MAX as f64 || max_score <= i64::MIN as f64 {
        return None;
    }
    let max_score = max_score.trunc() as i64;
    max_score
        .checked_sub(now)?
        .checked_abs()?
        .checked_add(EXPIRY_GRACE_SECS)
}
