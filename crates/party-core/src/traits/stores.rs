//! Store traits (ports) - define the interfaces for presence and persistence
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! (party-db for Postgres, party-cache for Redis) provides implementations.
//! The session protocol never touches a concrete store; it receives these
//! traits injected so tests can run against in-process maps.

use async_trait::async_trait;

use crate::entities::{ChatMessage, Conversation};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Error raised by presence store operations.
///
/// Store unavailability must surface to the caller; a silent success would
/// leave a phantom membership behind.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("presence store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for presence store operations
pub type PresenceResult<T> = Result<T, PresenceError>;

impl From<PresenceError> for DomainError {
    fn from(err: PresenceError) -> Self {
        match err {
            PresenceError::Unavailable(msg) => DomainError::PresenceUnavailable(msg),
        }
    }
}

// ============================================================================
// Presence Store
// ============================================================================

/// Registry of live connections per room and per user.
///
/// Implementations own their internal synchronization; every operation is
/// safe under concurrent calls from any number of connection handlers.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Record that `conn_id` is present in `room_id` for `user_id`.
    /// Idempotent per (room, user, connection) triple.
    async fn add_connection(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
        conn_id: &str,
    ) -> PresenceResult<()>;

    /// Remove one presence entry. Other connections of the same user are
    /// unaffected.
    async fn remove_connection(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
        conn_id: &str,
    ) -> PresenceResult<()>;

    /// True iff the user has at least one live connection recorded for the
    /// room. Used as the authorization gate before accepting a send.
    async fn is_participant(&self, room_id: Snowflake, user_id: Snowflake)
        -> PresenceResult<bool>;

    /// Add `conn_id` to the user's global online set. Called exactly once
    /// per physical connect.
    async fn mark_user_online(&self, user_id: Snowflake, conn_id: &str) -> PresenceResult<()>;

    /// Remove `conn_id` from the user's global online set. The user counts
    /// as offline only once the set empties. Called exactly once per
    /// physical disconnect.
    async fn mark_user_offline(&self, user_id: Snowflake, conn_id: &str) -> PresenceResult<()>;

    /// Live connection count for a room, reported on join.
    async fn occupancy(&self, room_id: Snowflake) -> PresenceResult<u64>;

    /// True iff the user has at least one live connection anywhere.
    async fn is_online(&self, user_id: Snowflake) -> PresenceResult<bool>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// Append-only writer of chat messages.
///
/// History reads belong to the CRUD layer; this layer only ever appends.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message. Messages are immutable once created.
    async fn create(&self, message: &ChatMessage) -> RepoResult<()>;
}

// ============================================================================
// Conversation Repository
// ============================================================================

/// Resolver/creator of one-to-one conversation identities
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Return the conversation for the (order-independent) user pair,
    /// creating it if absent.
    ///
    /// Race-safe: concurrent first-contact from both sides must yield
    /// exactly one durable record; the losing call returns the winner's
    /// record.
    async fn get_or_create(&self, user_a: Snowflake, user_b: Snowflake)
        -> RepoResult<Conversation>;

    /// Look up an existing conversation without creating one.
    async fn find_by_pair(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
    ) -> RepoResult<Option<Conversation>>;
}

// ============================================================================
// Participant Directory (external collaborator)
// ============================================================================

/// Lookup against the durable participant list owned by the CRUD layer.
///
/// Consulted, never mutated, by this layer; backs `enterRoom`'s
/// authorization check.
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// True iff the user is recorded as having durably joined the room.
    async fn is_durable_participant(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool>;
}
