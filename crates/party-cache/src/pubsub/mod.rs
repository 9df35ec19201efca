//! Redis Pub/Sub module.
//!
//! Distributes channel events across gateway processes so a room's audience
//! can span more than one instance.

mod channels;
mod publisher;
mod subscriber;

pub use channels::{
    PubSubChannel, BROADCAST_CHANNEL, CONVERSATION_CHANNEL_PREFIX, ROOM_CHANNEL_PREFIX,
};
pub use publisher::{PubSubEvent, Publisher};
pub use subscriber::{
    ReceivedMessage, Subscriber, SubscriberConfig, SubscriberError, SubscriberResult,
};
