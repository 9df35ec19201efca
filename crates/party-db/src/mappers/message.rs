//! Message channel column mapping

use party_core::ChannelId;

/// Split a channel address into its column representation
#[must_use]
pub fn channel_parts(channel: ChannelId) -> (&'static str, i64) {
    match channel {
        ChannelId::Room(id) => ("room", id.into_inner()),
        ChannelId::Conversation(id) => ("conversation", id.into_inner()),
    }
}
