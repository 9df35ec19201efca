//! Channel identity - the addressing unit for broadcast
//!
//! A channel is either a watch room or a one-to-one conversation. Every
//! broadcast, subscription, and persisted message is addressed to exactly
//! one channel.

use crate::value_objects::Snowflake;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the container a connection subscribes to and messages are
/// fanned out on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ChannelId {
    /// A shared watch room
    Room(Snowflake),
    /// A one-to-one direct-message conversation
    Conversation(Snowflake),
}

impl ChannelId {
    /// Get the raw container id regardless of kind
    #[must_use]
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Room(id) | Self::Conversation(id) => *id,
        }
    }

    /// Check if this channel is a room
    #[must_use]
    pub fn is_room(&self) -> bool {
        matches!(self, Self::Room(_))
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room(id) => write!(f, "room:{id}"),
            Self::Conversation(id) => write!(f, "conversation:{id}"),
        }
    }
}
