pub mod keys;
pub mod memory;
pub mod redis;
pub mod store;

pub use keys::StoreKey;
pub use memory::MemoryStore;
pub use redis::RedisStore;
pub use store::{GameStore, StoreError, StoreResult};
