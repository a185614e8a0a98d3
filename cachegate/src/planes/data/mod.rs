mod counter;
mod gateway;
mod object;
mod pattern;
mod scalar;
mod sorted_set;

pub use gateway::CacheGateway;
