//! In-memory presence store.
//!
//! Backs single-process deployments and integration tests. Same observable
//! semantics as the Redis store: entries are sets keyed by room/user, and
//! empty sets disappear.

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;

use party_core::{PresenceResult, PresenceStore, Snowflake};

/// DashMap-backed implementation of the presence store
#[derive(Default)]
pub struct MemoryPresenceStore {
    /// (room, user) -> connection ids live in the room
    memberships: DashMap<(Snowflake, Snowflake), HashSet<String>>,
    /// room -> all connection ids in the room
    rooms: DashMap<Snowflake, HashSet<String>>,
    /// user -> connection ids across all rooms
    users: DashMap<Snowflake, HashSet<String>>,
}

impl MemoryPresenceStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn add_connection(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
        conn_id: &str,
    ) -> PresenceResult<()> {
        self.memberships
            .entry((room_id, user_id))
            .or_default()
            .insert(conn_id.to_string());
        self.rooms
            .entry(room_id)
            .or_default()
            .insert(conn_id.to_string());
        Ok(())
    }

    async fn remove_connection(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
        conn_id: &str,
    ) -> PresenceResult<()> {
        if let Some(mut entry) = self.memberships.get_mut(&(room_id, user_id)) {
            entry.remove(conn_id);
        }
        self.memberships
            .remove_if(&(room_id, user_id), |_, conns| conns.is_empty());

        if let Some(mut entry) = self.rooms.get_mut(&room_id) {
            entry.remove(conn_id);
        }
        self.rooms.remove_if(&room_id, |_, conns| conns.is_empty());
        Ok(())
    }

    async fn is_participant(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> PresenceResult<bool> {
        Ok(self
            .memberships
            .get(&(room_id, user_id))
            .is_some_and(|conns| !conns.is_empty()))
    }

    async fn mark_user_online(&self, user_id: Snowflake, conn_id: &str) -> PresenceResult<()> {
        self.users
            .entry(user_id)
            .or_default()
            .insert(conn_id.to_string());
        Ok(())
    }

    async fn mark_user_offline(&self, user_id: Snowflake, conn_id: &str) -> PresenceResult<()> {
        if let Some(mut entry) = self.users.get_mut(&user_id) {
            entry.remove(conn_id);
        }
        self.users.remove_if(&user_id, |_, conns| conns.is_empty());
        Ok(())
    }

    async fn occupancy(&self, room_id: Snowflake) -> PresenceResult<u64> {
        Ok(self
            .rooms
            .get(&room_id)
            .map_or(0, |conns| conns.len() as u64))
    }

    async fn is_online(&self, user_id: Snowflake) -> PresenceResult<bool> {
        Ok(self
            .users
            .get(&user_id)
            .is_some_and(|conns| !conns.is_empty()))
    }
}
