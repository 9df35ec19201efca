//! Outbound server events
//!
//! Events pushed to clients, in the same `{"event", "data"}` envelope the
//! inbound side uses. Payload shapes are part of the client contract; field
//! names are fixed in camelCase.

use party_core::{ChatMessage, DomainError, Snowflake};
use serde::{Deserialize, Serialize};

/// Minimal user identity attached to join and DM events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Snowflake,
    pub nickname: String,
}

impl UserRef {
    #[must_use]
    pub fn new(id: Snowflake, nickname: impl Into<String>) -> Self {
        Self {
            id,
            nickname: nickname.into(),
        }
    }
}

/// Events sent to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// A user joined the room
    #[serde(rename = "userJoined")]
    UserJoined(UserJoinedPayload),

    /// A chat message arrived in a room
    #[serde(rename = "receiveRoomMessage")]
    ReceiveRoomMessage(ReceiveRoomMessagePayload),

    /// A user left the room
    #[serde(rename = "userLeft")]
    UserLeft(UserLeftPayload),

    /// A direct message arrived
    #[serde(rename = "receiveDirectMessage")]
    ReceiveDirectMessage(ReceiveDirectMessagePayload),

    /// An operation failed; delivered only to the originating connection
    #[serde(rename = "error")]
    Error(ErrorPayload),
}

/// Payload for `userJoined`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserJoinedPayload {
    pub user: UserRef,
    /// Live connection count in the room after the join
    pub count: u64,
}

/// Payload for `receiveRoomMessage`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveRoomMessagePayload {
    pub data: ChatMessage,
}

/// Payload for `userLeft`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLeftPayload {
    pub user_id: Snowflake,
    pub socket_id: String,
}

/// Payload for `receiveDirectMessage`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveDirectMessagePayload {
    pub sender: UserRef,
    pub message: ChatMessage,
}

/// Payload for `error`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

impl ServerEvent {
    /// Event name as it appears on the wire
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserJoined(_) => "userJoined",
            Self::ReceiveRoomMessage(_) => "receiveRoomMessage",
            Self::UserLeft(_) => "userLeft",
            Self::ReceiveDirectMessage(_) => "receiveDirectMessage",
            Self::Error(_) => "error",
        }
    }

    /// Build a `userJoined` event
    #[must_use]
    pub fn user_joined(user: UserRef, count: u64) -> Self {
        Self::UserJoined(UserJoinedPayload { user, count })
    }

    /// Build a `receiveRoomMessage` event
    #[must_use]
    pub fn room_message(data: ChatMessage) -> Self {
        Self::ReceiveRoomMessage(ReceiveRoomMessagePayload { data })
    }

    /// Build a `userLeft` event
    #[must_use]
    pub fn user_left(user_id: Snowflake, socket_id: impl Into<String>) -> Self {
        Self::UserLeft(UserLeftPayload {
            user_id,
            socket_id: socket_id.into(),
        })
    }

    /// Build a `receiveDirectMessage` event
    #[must_use]
    pub fn direct_message(sender: UserRef, message: ChatMessage) -> Self {
        Self::ReceiveDirectMessage(ReceiveDirectMessagePayload { sender, message })
    }

    /// Build an `error` event from a domain error
    #[must_use]
    pub fn error(err: &DomainError) -> Self {
        Self::Error(ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        })
    }

    /// Build an `error` event with an explicit code and message
    #[must_use]
    pub fn error_with(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            code: code.into(),
            message: message.into(),
        })
    }

    /// Serialize to the wire representation
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
