//! Store traits (ports) - interfaces the real-time layer depends on

mod stores;

pub use stores::{
    ConversationRepository, MessageRepository, ParticipantDirectory, PresenceError,
    PresenceResult, PresenceStore, RepoResult,
};
