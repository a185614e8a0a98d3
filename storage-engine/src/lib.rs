//! Concrete [`Store`](cachegate::Store) implementations and the factories
//! that hand them to a [`GatewayRegistry`](cachegate::GatewayRegistry).

pub mod factory;
pub mod memory_store;
#[cfg(feature = "redis")]
pub mod redis_store;

pub use factory::{MemoryStoreFactory, factory_from_config};
#[cfg(feature = "redis")]
pub use factory::RedisStoreFactory;
pub use memory_store::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;
