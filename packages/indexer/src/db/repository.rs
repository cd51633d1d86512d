use async_trait::async_trait;

use crate::models::{Delegation, NewDelegation};
use crate::sync::SyncError;

/// Append-only delegation store.
///
/// There is no update or delete path. Uniqueness of `external_id` is enforced by
/// the store itself, and `create_many` silently skips rows that violate it.
#[async_trait]
pub trait DelegationsRepository: Send + Sync {
    /// Most recent delegation by timestamp, `None` when the store is empty.
    async fn find_most_recent(&self) -> Result<Option<Delegation>, SyncError>;

    /// Distinct years that hold at least one delegation, ascending.
    async fn find_available_years(&self) -> Result<Vec<i32>, SyncError>;

    /// Page of delegations, newest first.
    async fn find_ordered_by_timestamp(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Delegation>, SyncError>;

    /// Page of delegations within a calendar year (UTC), newest first.
    async fn find_from_year(
        &self,
        year: i32,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Delegation>, SyncError>;

    /// Insert-or-ignore on `external_id`. Returns the number of rows actually inserted.
    async fn create_many(&self, delegations: &[NewDelegation]) -> Result<u64, SyncError>;
}
