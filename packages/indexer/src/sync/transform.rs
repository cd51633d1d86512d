use chrono::{DateTime, Utc};
use std::fmt;
use tracing::warn;

use crate::models::NewDelegation;
use crate::tzkt::DelegationResponse;

/// Why a raw delegation did not make it into the batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No sender address, so there is no delegator to record
    MissingSender,
    /// The wire timestamp is not RFC3339
    InvalidTimestamp { raw: String, error: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSender => write!(f, "missing sender address"),
            Self::InvalidTimestamp { raw, error } => {
                write!(f, "invalid timestamp {:?}: {}", raw, error)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedDelegation {
    pub external_id: i64,
    pub reason: SkipReason,
}

/// Result of transforming one fetched page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedBatch {
    /// Raw records received from the fetcher
    pub fetched: usize,
    /// Valid records, in fetch order
    pub delegations: Vec<NewDelegation>,
    pub skipped: Vec<SkippedDelegation>,
}

impl ParsedBatch {
    /// True when the source returned nothing at all.
    pub fn is_exhausted(&self) -> bool {
        self.fetched == 0
    }
}

/// Parse an RFC3339 instant, requiring the `T` date/time separator.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if raw.as_bytes().get(10) != Some(&b'T') {
        return Err("expected 'T' between date and time".to_string());
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

/// Turn a single raw record into a storable delegation.
pub fn parse_delegation(raw: &DelegationResponse) -> Result<NewDelegation, SkipReason> {
    let delegator = raw.sender_address().ok_or(SkipReason::MissingSender)?;

    let timestamp = parse_timestamp(&raw.timestamp).map_err(|error| SkipReason::InvalidTimestamp {
        raw: raw.timestamp.clone(),
        error,
    })?;

    Ok(NewDelegation {
        external_id: raw.id,
        timestamp,
        amount: raw.amount,
        delegator: delegator.to_string(),
        level: raw.level,
    })
}

/// Transform a fetched page, keeping only valid records.
pub fn parse_delegations(raw: &[DelegationResponse]) -> ParsedBatch {
    let mut batch = ParsedBatch {
        fetched: raw.len(),
        ..ParsedBatch::default()
    };

    for record in raw {
        match parse_delegation(record) {
            Ok(delegation) => batch.delegations.push(delegation),
            Err(reason) => {
                warn!("Skipping delegation {}: {}", record.id, reason);
                batch.skipped.push(SkippedDelegation {
                    external_id: record.id,
                    reason,
                });
            }
        }
    }

    batch
}
