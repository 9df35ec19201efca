//! Domain entities

mod channel;
mod conversation;
mod message;

pub use channel::ChannelId;
pub use conversation::Conversation;
pub use message::{ChatMessage, MessageKind};
