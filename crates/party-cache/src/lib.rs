//! # party-cache
//!
//! Redis layer for live presence and cross-process pub/sub.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Presence**: Per-room and global connection tracking
//! - **Pub/Sub**: Real-time event distribution across server instances
//!
//! ## Example
//!
//! ```ignore
//! use party_cache::{RedisPool, RedisPoolConfig, RedisPresenceStore, Publisher};
//! use party_core::PresenceStore;
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let presence = RedisPresenceStore::new(pool.clone());
//! let publisher = Publisher::new(pool);
//!
//! presence.add_connection(room_id, user_id, "conn-1").await?;
//! let count = presence.occupancy(room_id).await?;
//! ```

pub mod pool;
pub mod presence;
pub mod pubsub;

// Re-export pool types
pub use pool::{create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool};

// Re-export presence types
pub use presence::{MemoryPresenceStore, RedisPresenceStore};

// Re-export pubsub types
pub use pubsub::{
    PubSubChannel, PubSubEvent, Publisher, ReceivedMessage, Subscriber, SubscriberConfig,
    SubscriberError, SubscriberResult, BROADCAST_CHANNEL, CONVERSATION_CHANNEL_PREFIX,
    ROOM_CHANNEL_PREFIX,
};
