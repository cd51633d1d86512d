use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A delegation as stored in the `delegations` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Delegation {
    /// Store-assigned identity
    pub id: i64,
    /// Operation id on the source chain, unique across the table
    pub external_id: i64,
    pub timestamp: DateTime<Utc>,
    /// Amount in mutez
    pub amount: i64,
    pub delegator: String,
    pub level: i64,
}

/// A validated delegation ready to be persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDelegation {
    pub external_id: i64,
    pub timestamp: DateTime<Utc>,
    pub amount: i64,
    pub delegator: String,
    pub level: i64,
}

impl NewDelegation {
    /// Attach the store-assigned id once the row exists.
    pub fn stored(self, id: i64) -> Delegation {
        Delegation {
            id,
            external_id: self.external_id,
            timestamp: self.timestamp,
            amount: self.amount,
            delegator: self.delegator,
            level: self.level,
        }
    }
}
