use serde::{Deserialize, Serialize};

/// Raw delegation as returned by `/v1/operations/delegations`.
///
/// Only the fields the indexer stores are decoded; the timestamp is kept as
/// the wire string and parsed during the transform step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationResponse {
    pub id: i64,
    pub level: i64,
    pub timestamp: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub sender: Option<Sender>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    #[serde(default)]
    pub address: Option<String>,
}

impl DelegationResponse {
    /// The delegator address, if the operation carries a non-empty one.
    pub fn sender_address(&self) -> Option<&str> {
        self.sender
            .as_ref()
            .and_then(|s| s.address.as_deref())
            .filter(|address| !address.trim().is_empty())
    }
}
