//! Inbound client events
//!
//! Every event a client may send, as one closed enum. Unknown event names
//! and malformed payloads fail deserialization and are answered with an
//! `error` event; they never reach the session handlers.

use party_core::{MessageKind, Snowflake};
use serde::Deserialize;

/// Events received from clients
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Join a room openly (no authorization beyond a valid identity)
    #[serde(rename = "joinRoom")]
    JoinRoom(JoinRoomPayload),

    /// Enter a room the user has durably joined before
    #[serde(rename = "enterRoom")]
    EnterRoom(EnterRoomPayload),

    /// Send a chat message to a room
    #[serde(rename = "sendRoomMessage")]
    SendRoomMessage(RoomMessagePayload),

    /// Leave a room
    #[serde(rename = "leaveRoom")]
    LeaveRoom(LeaveRoomPayload),

    /// Open (or re-open) a direct-message conversation
    #[serde(rename = "joinDM")]
    JoinDm(JoinDmPayload),

    /// Send a direct message
    #[serde(rename = "sendDirectMessage")]
    SendDirectMessage(DirectMessagePayload),

    /// Detach from a conversation after an unfriend
    #[serde(rename = "noFriend")]
    NoFriend(NoFriendPayload),
}

impl ClientEvent {
    /// Event name as it appears on the wire
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom(_) => "joinRoom",
            Self::EnterRoom(_) => "enterRoom",
            Self::SendRoomMessage(_) => "sendRoomMessage",
            Self::LeaveRoom(_) => "leaveRoom",
            Self::JoinDm(_) => "joinDM",
            Self::SendDirectMessage(_) => "sendDirectMessage",
            Self::NoFriend(_) => "noFriend",
        }
    }
}

/// Payload for `joinRoom`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_id: Snowflake,
    pub nickname: String,
}

/// Payload for `enterRoom`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterRoomPayload {
    pub room_id: Snowflake,
    pub nickname: String,
}

/// Payload for `sendRoomMessage`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMessagePayload {
    pub room_id: Snowflake,
    pub nickname: String,
    pub content: String,
    #[serde(default)]
    pub message_type: MessageKind,
}

/// Payload for `leaveRoom`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomPayload {
    pub room_id: Snowflake,
}

/// Payload for `joinDM`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinDmPayload {
    pub receiver_id: Snowflake,
}

/// Payload for `sendDirectMessage`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessagePayload {
    pub receiver_id: Snowflake,
    pub from_nickname: String,
    pub content: String,
    #[serde(default)]
    pub message_type: MessageKind,
}

/// Payload for `noFriend`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoFriendPayload {
    pub user_id_1: Snowflake,
    pub user_id_2: Snowflake,
}
