use tracing::debug;

use super::{DelegationsClient, SyncError};
use crate::models::Delegation;

pub const DEFAULT_PAGE_LIMIT: u32 = 100;
pub const MAX_PAGE_LIMIT: u32 = 5000;

/// Read-side listing of stored delegations, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegationsQuery {
    /// Restrict to one calendar year
    pub year: Option<i32>,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
}

impl Default for DelegationsQuery {
    fn default() -> Self {
        Self {
            year: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl DelegationsQuery {
    pub fn validate(&self) -> Result<(), SyncError> {
        if let Some(year) = self.year {
            if !(1000..=9999).contains(&year) {
                return Err(SyncError::Validation(
                    "Check Year field is valid and follow the following format `YYYY`".to_string(),
                ));
            }
        }

        if self.page == 0 {
            return Err(SyncError::Validation("page must be at least 1".to_string()));
        }

        if self.limit == 0 || self.limit > MAX_PAGE_LIMIT {
            return Err(SyncError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }

        Ok(())
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.limit) * (i64::from(self.page) - 1)
    }
}

impl DelegationsClient {
    /// List stored delegations.
    ///
    /// A year with no stored delegations is an error that lists the years that do exist.
    pub async fn get_delegations(
        &self,
        query: &DelegationsQuery,
    ) -> Result<Vec<Delegation>, SyncError> {
        query.validate()?;
        let limit = i64::from(query.limit);

        let Some(year) = query.year else {
            return self
                .repository
                .find_ordered_by_timestamp(limit, query.offset())
                .await;
        };

        let available = self.repository.find_available_years().await?;
        if !available.contains(&year) {
            debug!("Year {} requested, available: {:?}", year, available);
            return Err(SyncError::YearNotAvailable { year, available });
        }

        self.repository
            .find_from_year(year, limit, query.offset())
            .await
    }
}
