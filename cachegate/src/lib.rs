//! Typed, namespaced gateway over a remote key-value store.
//!
//! [`CacheGateway`] layers key namespacing, value decoding, self-expiring
//! counters and sorted sets, and opaque-object storage on top of a
//! [`Store`] port. [`GatewayRegistry`] hands out one gateway per namespace.

pub mod codec;
pub mod domain;
pub mod planes;
pub mod ports;

pub use codec::{Encode, cast};
pub use domain::{Namespace, TTL_KEY_MISSING, TTL_NO_EXPIRY};
pub use planes::control::GatewayRegistry;
pub use planes::data::CacheGateway;
pub use ports::{StorageFactory, Store};
