//! Presence storage module.
//!
//! Tracks which connections are live in which rooms, and which users are
//! online anywhere. Two implementations of the same trait: Redis-backed for
//! deployment, in-memory for single-process setups and tests.

mod memory;
mod redis_store;

pub use memory::MemoryPresenceStore;
pub use redis_store::RedisPresenceStore;
