//! Repository implementations
//!
//! PostgreSQL implementations of the persistence traits defined in
//! party-core. Each repository handles database operations for a specific
//! domain entity.

mod conversation;
mod error;
mod message;
mod participant;

pub use conversation::PgConversationRepository;
pub use message::PgMessageRepository;
pub use participant::PgParticipantDirectory;
