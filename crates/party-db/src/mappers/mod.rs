//! Entity <-> model mappers

mod conversation;
mod message;

pub use message::channel_parts;
