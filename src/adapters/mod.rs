// Adapters layer: concrete card store backends.

pub mod memory_store;
pub mod redis_store;

pub use memory_store::InMemoryCardStore;
pub use redis_store::RedisCardStore;
