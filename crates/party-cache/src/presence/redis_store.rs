//! Redis-backed presence store.
//!
//! Key layout:
//! - `room_presence:{room_id}:{user_id}` - set of connection ids the user
//!   has live in the room
//! - `room_connections:{room_id}` - set of all connection ids in the room,
//!   backs the occupancy count
//! - `user_connections:{user_id}` - set of the user's connection ids across
//!   all rooms and processes, backs the online check

use async_trait::async_trait;
use redis::AsyncCommands;

use party_core::{PresenceError, PresenceResult, PresenceStore, Snowflake};

use crate::pool::{RedisPool, RedisPoolError};

/// Key prefix for per-user room membership sets
const ROOM_PRESENCE_PREFIX: &str = "room_presence:";
/// Key prefix for per-room connection sets
const ROOM_CONNECTIONS_PREFIX: &str = "room_connections:";
/// Key prefix for per-user global connection sets
const USER_CONNECTIONS_PREFIX: &str = "user_connections:";

/// Redis implementation of the presence store
#[derive(Clone)]
pub struct RedisPresenceStore {
    pool: RedisPool,
}

impl RedisPresenceStore {
    /// Create a new Redis presence store
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn membership_key(room_id: Snowflake, user_id: Snowflake) -> String {
        format!("{ROOM_PRESENCE_PREFIX}{room_id}:{user_id}")
    }

    fn room_key(room_id: Snowflake) -> String {
        format!("{ROOM_CONNECTIONS_PREFIX}{room_id}")
    }

    fn user_key(user_id: Snowflake) -> String {
        format!("{USER_CONNECTIONS_PREFIX}{user_id}")
    }
}

fn unavailable(e: RedisPoolError) -> PresenceError {
    PresenceError::Unavailable(e.to_string())
}

fn unavailable_cmd(e: redis::RedisError) -> PresenceError {
    PresenceError::Unavailable(e.to_string())
}

#[async_trait]
impl PresenceStore for RedisPresenceStore {
    async fn add_connection(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
        conn_id: &str,
    ) -> PresenceResult<()> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;

        redis::pipe()
            .sadd(Self::membership_key(room_id, user_id), conn_id)
            .ignore()
            .sadd(Self::room_key(room_id), conn_id)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(unavailable_cmd)?;

        tracing::debug!(%room_id, %user_id, conn_id, "Presence recorded");
        Ok(())
    }

    async fn remove_connection(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
        conn_id: &str,
    ) -> PresenceResult<()> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;

        redis::pipe()
            .srem(Self::membership_key(room_id, user_id), conn_id)
            .ignore()
            .srem(Self::room_key(room_id), conn_id)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(unavailable_cmd)?;

        tracing::debug!(%room_id, %user_id, conn_id, "Presence removed");
        Ok(())
    }

    async fn is_participant(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> PresenceResult<bool> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;
        let exists: bool = conn
            .exists(Self::membership_key(room_id, user_id))
            .await
            .map_err(unavailable_cmd)?;
        Ok(exists)
    }

    async fn mark_user_online(&self, user_id: Snowflake, conn_id: &str) -> PresenceResult<()> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;
        conn.sadd::<_, _, ()>(Self::user_key(user_id), conn_id)
            .await
            .map_err(unavailable_cmd)?;
        Ok(())
    }

    async fn mark_user_offline(&self, user_id: Snowflake, conn_id: &str) -> PresenceResult<()> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;
        conn.srem::<_, _, ()>(Self::user_key(user_id), conn_id)
            .await
            .map_err(unavailable_cmd)?;
        Ok(())
    }

    async fn occupancy(&self, room_id: Snowflake) -> PresenceResult<u64> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;
        let count: u64 = conn
            .scard(Self::room_key(room_id))
            .await
            .map_err(unavailable_cmd)?;
        Ok(count)
    }

    async fn is_online(&self, user_id: Snowflake) -> PresenceResult<bool> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;
        let exists: bool = conn
            .exists(Self::user_key(user_id))
            .await
            .map_err(unavailable_cmd)?;
        Ok(exists)
    }
}
