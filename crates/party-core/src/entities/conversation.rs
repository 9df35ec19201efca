//! Conversation entity - the durable identity of a one-to-one DM channel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Durable pairing of two users resolving to one canonical conversation.
///
/// The pair is stored in canonical order (`user_low < user_high`) so that
/// `resolve(a, b)` and `resolve(b, a)` address the same record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Snowflake,
    pub user_low: Snowflake,
    pub user_high: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new conversation between two users, canonicalizing the pair
    pub fn new(id: Snowflake, user_a: Snowflake, user_b: Snowflake) -> Self {
        let (user_low, user_high) = Self::canonical_pair(user_a, user_b);
        Self {
            id,
            user_low,
            user_high,
            created_at: Utc::now(),
        }
    }

    /// Order a pair of user ids canonically (low, high)
    #[must_use]
    pub fn canonical_pair(a: Snowflake, b: Snowflake) -> (Snowflake, Snowflake) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Check whether a user is one of the two parties
    #[must_use]
    pub fn involves(&self, user_id: Snowflake) -> bool {
        self.user_low == user_id || self.user_high == user_id
    }

    /// Given one party, return the other
    #[must_use]
    pub fn other_party(&self, user_id: Snowflake) -> Option<Snowflake> {
        if user_id == self.user_low {
            Some(self.user_high)
        } else if user_id == self.user_high {
            Some(self.user_low)
        } else {
            None
        }
    }
}
