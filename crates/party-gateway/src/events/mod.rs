//! Gateway wire events
//!
//! Inbound and outbound event types. Both directions use the
//! `{"event": <name>, "data": {...}}` envelope; the inbound side is a closed
//! enum so every client event is handled by one exhaustive match.

mod client;
mod server;

pub use client::{
    ClientEvent, DirectMessagePayload, EnterRoomPayload, JoinDmPayload, JoinRoomPayload,
    LeaveRoomPayload, NoFriendPayload, RoomMessagePayload,
};
pub use server::{
    ErrorPayload, ReceiveDirectMessagePayload, ReceiveRoomMessagePayload, ServerEvent,
    UserJoinedPayload, UserLeftPayload, UserRef,
};
