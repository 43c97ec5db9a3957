mod store;
mod redis_store;
mod memory_store;
pub mod ledger;
pub mod accounts;

pub use store::{Store, DeletedTree};
pub use redis_store::RedisStore;
pub use memory_store::MemoryStore;
