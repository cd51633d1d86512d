use chrono::{Datelike, TimeZone, Utc};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::{DelegationsClient, SyncError};
use crate::tzkt::DelegationsFilter;
use crate::utils::format::{format_elapsed, format_rate};

/// Page size used for backfills
pub const BACKFILL_PAGE_SIZE: u32 = 1000;

/// Delegations before the Tezos mainnet launch do not exist
pub const FIRST_TEZOS_YEAR: i32 = 2018;

/// Totals for one backfill run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub year: i32,
    /// Fetch calls made, including the final empty page
    pub requests: u32,
    pub fetched: u64,
    pub skipped: u64,
    pub inserted: u64,
    pub elapsed: Duration,
}

/// One-shot historical load of a whole calendar year, paged by offset.
pub struct HistoricSync {
    client: DelegationsClient,
    page_size: u32,
}

impl HistoricSync {
    pub fn new(client: DelegationsClient) -> Self {
        Self {
            client,
            page_size: BACKFILL_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// `[Jan 1 00:00:00, Dec 31 23:59:59]` of `year`, starting at offset 0.
    pub fn year_filter(year: i32, page_size: u32) -> Result<DelegationsFilter, SyncError> {
        let current_year = Utc::now().year();
        if !(FIRST_TEZOS_YEAR..=current_year).contains(&year) {
            return Err(SyncError::Validation(format!(
                "year cannot be before existence of Tezos ({}) and cannot be in the future, got {}",
                FIRST_TEZOS_YEAR, year
            )));
        }

        let from = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single();
        let to = Utc.with_ymd_and_hms(year, 12, 31, 23, 59, 59).single();

        let filter = DelegationsFilter {
            from,
            to,
            ..DelegationsFilter::default()
        }
        .with_limit(page_size);

        filter.validate()?;
        Ok(filter)
    }

    /// Load every delegation of `year`, stopping at the first empty page.
    #[instrument(skip(self, cancel))]
    pub async fn fetch_year(
        &self,
        year: i32,
        cancel: &CancellationToken,
    ) -> Result<BackfillReport, SyncError> {
        let mut filter = Self::year_filter(year, self.page_size)?;
        let started = Instant::now();
        let mut report = BackfillReport {
            year,
            ..BackfillReport::default()
        };

        info!("Starting backfill of {} with page size {}", year, self.page_size);

        loop {
            if cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }

            let batch = self.client.poll_with_filter(&filter, cancel).await?;
            report.requests += 1;

            // Only a raw empty page ends the run; a fully filtered page does not
            if batch.is_exhausted() {
                break;
            }

            let inserted = self.client.create(&batch.delegations, cancel).await?;

            report.fetched += batch.fetched as u64;
            report.skipped += batch.skipped.len() as u64;
            report.inserted += inserted;

            let elapsed = started.elapsed();
            info!(
                "Backfill {} offset {}: {} fetched, {} inserted ({} total, {} in {})",
                year,
                filter.offset,
                batch.fetched,
                inserted,
                report.fetched,
                format_rate(report.fetched, elapsed),
                format_elapsed(elapsed)
            );

            filter.offset += u64::from(self.page_size);
        }

        report.elapsed = started.elapsed();
        info!(
            "Backfill of {} complete: {} requests, {} fetched, {} skipped, {} inserted in {}",
            year,
            report.requests,
            report.fetched,
            report.skipped,
            report.inserted,
            format_elapsed(report.elapsed)
        );

        Ok(report)
    }
}
