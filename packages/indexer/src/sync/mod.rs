mod client;
mod error;
mod historic;
mod manager;
mod query;
mod transform;

pub use client::{cursor_filter, CycleOutcome, DelegationsClient, BOOTSTRAP_LOOKBACK_DAYS};
pub use error::SyncError;
pub use historic::{BackfillReport, HistoricSync, BACKFILL_PAGE_SIZE, FIRST_TEZOS_YEAR};
pub use manager::{SyncManager, DELEGATIONS_WORKER};
pub use query::{DelegationsQuery, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use transform::{parse_delegation, parse_delegations, ParsedBatch, SkipReason, SkippedDelegation};

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run `fut` unless `cancel` fires first.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, SyncError>
where
    F: Future<Output = Result<T, SyncError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SyncError::Cancelled),
        result = fut => result,
    }
}
