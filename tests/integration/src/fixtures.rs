//! In-memory store fakes
//!
//! Implement the domain ports over `DashMap` so the full session protocol
//! runs against process-local state.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use party_cache::MemoryPresenceStore;
use party_core::{
    ChannelId, ChatMessage, Conversation, ConversationRepository, MessageRepository,
    ParticipantDirectory, PresenceError, PresenceResult, PresenceStore, RepoResult, Snowflake,
    SnowflakeGenerator,
};

/// Message repository backed by a per-channel vector, append order preserved
#[derive(Default)]
pub struct MemoryMessageRepository {
    messages: DashMap<ChannelId, Vec<ChatMessage>>,
}

impl MemoryMessageRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages stored for a channel, oldest first
    #[must_use]
    pub fn messages_in(&self, channel: ChannelId) -> Vec<ChatMessage> {
        self.messages
            .get(&channel)
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Total number of stored messages across all channels
    #[must_use]
    pub fn total(&self) -> usize {
        self.messages.iter().map(|e| e.value().len()).sum()
    }
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn create(&self, message: &ChatMessage) -> RepoResult<()> {
        self.messages
            .entry(message.channel)
            .or_default()
            .push(message.clone());
        Ok(())
    }
}

/// Conversation repository keyed by the canonical user pair
pub struct MemoryConversationRepository {
    ids: Arc<SnowflakeGenerator>,
    by_pair: DashMap<(Snowflake, Snowflake), Conversation>,
}

impl MemoryConversationRepository {
    #[must_use]
    pub fn new(ids: Arc<SnowflakeGenerator>) -> Self {
        Self {
            ids,
            by_pair: DashMap::new(),
        }
    }

    /// Number of distinct conversations created so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_pair.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }

    /// Look up a conversation without going through the trait
    #[must_use]
    pub fn find(&self, user_a: Snowflake, user_b: Snowflake) -> Option<Conversation> {
        let pair = Conversation::canonical_pair(user_a, user_b);
        self.by_pair.get(&pair).map(|c| c.clone())
    }
}

#[async_trait]
impl ConversationRepository for MemoryConversationRepository {
    async fn get_or_create(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
    ) -> RepoResult<Conversation> {
        let pair = Conversation::canonical_pair(user_a, user_b);
        // entry() serializes concurrent first contact on the same pair,
        // matching the database's conditional-insert semantics
        let conversation = self
            .by_pair
            .entry(pair)
            .or_insert_with(|| Conversation::new(self.ids.generate(), user_a, user_b))
            .clone();
        Ok(conversation)
    }

    async fn find_by_pair(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
    ) -> RepoResult<Option<Conversation>> {
        Ok(self.find(user_a, user_b))
    }
}

/// Presence store wrapper that can fail occupancy reads on demand.
///
/// Everything else delegates to the wrapped in-memory store, so the test
/// can assert what state survives a mid-operation outage.
pub struct FlakyPresenceStore {
    inner: Arc<MemoryPresenceStore>,
    fail_occupancy: AtomicBool,
}

impl FlakyPresenceStore {
    #[must_use]
    pub fn new(inner: Arc<MemoryPresenceStore>) -> Self {
        Self {
            inner,
            fail_occupancy: AtomicBool::new(false),
        }
    }

    /// Make subsequent occupancy reads fail (or succeed again)
    pub fn fail_occupancy(&self, fail: bool) {
        self.fail_occupancy.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PresenceStore for FlakyPresenceStore {
    async fn add_connection(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
        conn_id: &str,
    ) -> PresenceResult<()> {
        self.inner.add_connection(room_id, user_id, conn_id).await
    }

    async fn remove_connection(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
        conn_id: &str,
    ) -> PresenceResult<()> {
        self.inner.remove_connection(room_id, user_id, conn_id).await
    }

    async fn is_participant(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> PresenceResult<bool> {
        self.inner.is_participant(room_id, user_id).await
    }

    async fn mark_user_online(&self, user_id: Snowflake, conn_id: &str) -> PresenceResult<()> {
        self.inner.mark_user_online(user_id, conn_id).await
    }

    async fn mark_user_offline(&self, user_id: Snowflake, conn_id: &str) -> PresenceResult<()> {
        self.inner.mark_user_offline(user_id, conn_id).await
    }

    async fn occupancy(&self, room_id: Snowflake) -> PresenceResult<u64> {
        if self.fail_occupancy.load(Ordering::SeqCst) {
            return Err(PresenceError::Unavailable(
                "occupancy read failed".to_string(),
            ));
        }
        self.inner.occupancy(room_id).await
    }

    async fn is_online(&self, user_id: Snowflake) -> PresenceResult<bool> {
        self.inner.is_online(user_id).await
    }
}

/// Durable room membership controlled directly by the test
#[derive(Default)]
pub struct StaticParticipantDirectory {
    members: DashMap<Snowflake, HashSet<Snowflake>>,
}

impl StaticParticipantDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user as a durable member of a room
    pub fn grant(&self, room_id: Snowflake, user_id: Snowflake) {
        self.members.entry(room_id).or_default().insert(user_id);
    }
}

#[async_trait]
impl ParticipantDirectory for StaticParticipantDirectory {
    async fn is_durable_participant(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool> {
        Ok(self
            .members
            .get(&room_id)
            .is_some_and(|m| m.contains(&user_id)))
    }
}
