//! Error handling utilities for repositories

use party_core::{DomainError, Snowflake};
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Create a "conversation not found" error
pub fn conversation_not_found(a: Snowflake, b: Snowflake) -> DomainError {
    DomainError::ConversationNotFound(a, b)
}
