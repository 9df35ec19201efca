//! Pub/Sub channel definitions.
//!
//! Defines the Redis Pub/Sub topic naming conventions. Topics mirror the
//! domain's channel addressing: one topic per room, one per conversation.

use party_core::{ChannelId, Snowflake};

/// Topic prefix for room events
pub const ROOM_CHANNEL_PREFIX: &str = "room:";
/// Topic prefix for conversation events
pub const CONVERSATION_CHANNEL_PREFIX: &str = "conversation:";
/// Topic for process-wide broadcast events
pub const BROADCAST_CHANNEL: &str = "broadcast";

/// Pub/Sub channel types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Events for a specific room (all present connections)
    Room(Snowflake),
    /// Events for a specific conversation (both parties)
    Conversation(Snowflake),
    /// Broadcast to all gateway processes
    Broadcast,
    /// Custom topic name
    Custom(String),
}

impl PubSubChannel {
    /// Create a room topic
    #[must_use]
    pub fn room(room_id: Snowflake) -> Self {
        Self::Room(room_id)
    }

    /// Create a conversation topic
    #[must_use]
    pub fn conversation(conversation_id: Snowflake) -> Self {
        Self::Conversation(conversation_id)
    }

    /// Create a broadcast topic
    #[must_use]
    pub fn broadcast() -> Self {
        Self::Broadcast
    }

    /// Get the Redis topic name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Room(id) => format!("{ROOM_CHANNEL_PREFIX}{id}"),
            Self::Conversation(id) => format!("{CONVERSATION_CHANNEL_PREFIX}{id}"),
            Self::Broadcast => BROADCAST_CHANNEL.to_string(),
            Self::Custom(name) => name.clone(),
        }
    }

    /// Parse a topic name back to a `PubSubChannel`
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if name == BROADCAST_CHANNEL {
            return Self::Broadcast;
        }

        if let Some(id_str) = name.strip_prefix(ROOM_CHANNEL_PREFIX) {
            if let Ok(id) = id_str.parse::<i64>() {
                return Self::Room(Snowflake::from(id));
            }
        }

        if let Some(id_str) = name.strip_prefix(CONVERSATION_CHANNEL_PREFIX) {
            if let Ok(id) = id_str.parse::<i64>() {
                return Self::Conversation(Snowflake::from(id));
            }
        }

        Self::Custom(name.to_string())
    }

    /// Convert back to the domain channel address, if this topic maps to one
    #[must_use]
    pub fn channel_id(&self) -> Option<ChannelId> {
        match self {
            Self::Room(id) => Some(ChannelId::Room(*id)),
            Self::Conversation(id) => Some(ChannelId::Conversation(*id)),
            Self::Broadcast | Self::Custom(_) => None,
        }
    }
}

impl From<ChannelId> for PubSubChannel {
    fn from(channel: ChannelId) -> Self {
        match channel {
            ChannelId::Room(id) => Self::Room(id),
            ChannelId::Conversation(id) => Self::Conversation(id),
        }
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
