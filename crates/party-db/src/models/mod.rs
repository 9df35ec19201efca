//! Database models
//!
//! Plain row structs with SQLx `FromRow` derives. Mappers in `crate::mappers`
//! convert them to and from the domain entities.

mod conversation;

pub use conversation::ConversationModel;
