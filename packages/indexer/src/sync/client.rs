use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::transform::{parse_delegations, ParsedBatch};
use super::{cancellable, SyncError};
use crate::db::DelegationsRepository;
use crate::models::{Delegation, NewDelegation};
use crate::tzkt::{DelegationsFetcher, DelegationsFilter};

/// How far back a fresh store starts syncing
pub const BOOTSTRAP_LOOKBACK_DAYS: i64 = 1;

/// What one incremental cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub fetched: usize,
    pub skipped: usize,
    pub inserted: u64,
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetched={} skipped={} inserted={}",
            self.fetched, self.skipped, self.inserted
        )
    }
}

/// Fetch window for the next incremental cycle.
///
/// Resumes at the most recent stored delegation, excluding it since the API
/// range is inclusive. An empty store starts one day before `now`.
pub fn cursor_filter(most_recent: Option<&Delegation>, now: DateTime<Utc>) -> DelegationsFilter {
    match most_recent {
        Some(latest) => DelegationsFilter {
            from: Some(latest.timestamp),
            exclude_ids: vec![latest.external_id],
            ..DelegationsFilter::default()
        },
        None => DelegationsFilter {
            from: Some(now - Duration::days(BOOTSTRAP_LOOKBACK_DAYS)),
            ..DelegationsFilter::default()
        },
    }
}

/// Synchronizes the delegation store with the TzKT API.
#[derive(Clone)]
pub struct DelegationsClient {
    pub(super) fetcher: Arc<dyn DelegationsFetcher>,
    pub(super) repository: Arc<dyn DelegationsRepository>,
}

impl DelegationsClient {
    pub fn new(
        fetcher: Arc<dyn DelegationsFetcher>,
        repository: Arc<dyn DelegationsRepository>,
    ) -> Self {
        Self {
            fetcher,
            repository,
        }
    }

    /// Fetch delegations newer than the store's cursor.
    ///
    /// A failing cursor read aborts the poll rather than guessing a window.
    pub async fn poll_new(&self, cancel: &CancellationToken) -> Result<ParsedBatch, SyncError> {
        let most_recent = cancellable(cancel, self.repository.find_most_recent()).await?;

        let filter = cursor_filter(most_recent.as_ref(), Utc::now());
        debug!(
            "Polling new delegations from {:?} excluding {:?}",
            filter.from, filter.exclude_ids
        );

        self.poll_with_filter(&filter, cancel).await
    }

    /// Fetch and transform one page matching `filter`.
    pub async fn poll_with_filter(
        &self,
        filter: &DelegationsFilter,
        cancel: &CancellationToken,
    ) -> Result<ParsedBatch, SyncError> {
        let raw = cancellable(cancel, self.fetcher.fetch_delegations(filter)).await?;
        Ok(parse_delegations(&raw))
    }

    /// Persist delegations, returning how many rows were new.
    pub async fn create(
        &self,
        delegations: &[NewDelegation],
        cancel: &CancellationToken,
    ) -> Result<u64, SyncError> {
        if delegations.is_empty() {
            return Ok(0);
        }

        cancellable(cancel, self.repository.create_many(delegations)).await
    }

    /// One incremental cycle: cursor, fetch, transform, persist.
    #[instrument(skip_all)]
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Result<CycleOutcome, SyncError> {
        let batch = self.poll_new(cancel).await?;
        let inserted = self.create(&batch.delegations, cancel).await?;

        let outcome = CycleOutcome {
            fetched: batch.fetched,
            skipped: batch.skipped.len(),
            inserted,
        };

        if inserted > 0 {
            info!("Inserted {} new delegations ({})", inserted, outcome);
        } else {
            debug!("No new delegations ({})", outcome);
        }

        Ok(outcome)
    }
}
