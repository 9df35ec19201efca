//! # party-core
//!
//! Domain layer for the watch-party coordination server: entities, value
//! objects, and the store traits (ports) the real-time layer depends on.
//! This crate has zero dependencies on infrastructure (database, web
//! framework, Redis, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{ChannelId, ChatMessage, Conversation, MessageKind};
pub use error::DomainError;
pub use traits::{
    ConversationRepository, MessageRepository, ParticipantDirectory, PresenceError,
    PresenceResult, PresenceStore, RepoResult,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
