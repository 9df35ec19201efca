//! Chat message entity - an immutable, append-only record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::ChannelId;
use crate::value_objects::Snowflake;

/// Kind of chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Ordinary user-authored text
    General,
    /// Server-generated notice (join/leave announcements and the like)
    System,
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::General
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::General => write!(f, "general"),
            Self::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(Self::General),
            "system" => Ok(Self::System),
            _ => Err(format!("Invalid message kind: {s}")),
        }
    }
}

/// Chat message entity
///
/// Created once by the persistence gateway, never mutated or deleted by the
/// real-time layer. Rides outbound events directly, so the JSON field names
/// are part of the client contract and stay camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Snowflake,
    pub channel: ChannelId,
    pub sender_id: Snowflake,
    pub content: String,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new message addressed to a channel
    pub fn new(
        id: Snowflake,
        channel: ChannelId,
        sender_id: Snowflake,
        content: String,
        kind: MessageKind,
    ) -> Self {
        Self {
            id,
            channel,
            sender_id,
            content,
            kind,
            created_at: Utc::now(),
        }
    }

    /// Check if message content is empty after trimming
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}
