//! Client side of the TzKT operations API.

mod client;
mod filter;
mod types;

pub use client::{TzktClient, DEFAULT_BASE_URL, DELEGATIONS_PATH};
pub use filter::{DelegationsFilter, DEFAULT_LIMIT, MAX_LIMIT};
pub use types::{DelegationResponse, Sender};

use async_trait::async_trait;

use crate::sync::SyncError;

/// Source of raw delegation pages.
#[async_trait]
pub trait DelegationsFetcher: Send + Sync {
    /// Fetch one page of delegations matching `filter`.
    ///
    /// Implementations must reject an invalid filter before doing any I/O.
    async fn fetch_delegations(
        &self,
        filter: &DelegationsFilter,
    ) -> Result<Vec<DelegationResponse>, SyncError>;
}
