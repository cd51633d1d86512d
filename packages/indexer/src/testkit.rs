//! In-memory stand-ins for the store and the TzKT API.

use async_trait::async_trait;
use chrono::Datelike;
use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::db::{year_range, DelegationsRepository};
use crate::models::{Delegation, NewDelegation};
use crate::sync::SyncError;
use crate::tzkt::{DelegationResponse, DelegationsFetcher, DelegationsFilter, Sender};

/// Raw API record with `amount = 1` and `level = id`.
pub fn raw_delegation(id: i64, timestamp: &str, address: Option<&str>) -> DelegationResponse {
    DelegationResponse {
        id,
        level: id,
        timestamp: timestamp.to_string(),
        amount: 1,
        sender: Some(Sender {
            address: address.map(str::to_string),
        }),
    }
}

/// `count` valid raw records with consecutive ids starting at `first_id`.
pub fn raw_page(first_id: i64, count: usize) -> Vec<DelegationResponse> {
    (0..count as i64)
        .map(|i| {
            let id = first_id + i;
            let timestamp = format!("2023-06-01T{:02}:{:02}:{:02}Z", (id / 3600) % 24, (id / 60) % 60, id % 60);
            raw_delegation(id, &timestamp, Some("tz1delegator"))
        })
        .collect()
}

/// Append-only store that ignores duplicate `external_id`s, like the real table.
#[derive(Default)]
pub struct MemoryRepository {
    rows: Mutex<Vec<Delegation>>,
    fail_reads: AtomicBool,
    create_calls: AtomicUsize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<NewDelegation>) -> Self {
        let repo = Self::new();
        {
            let mut stored = repo.rows.lock().unwrap();
            for (i, row) in rows.into_iter().enumerate() {
                stored.push(row.stored(i as i64 + 1));
            }
        }
        repo
    }

    pub fn rows(&self) -> Vec<Delegation> {
        self.rows.lock().unwrap().clone()
    }

    /// Make every read fail with a database error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> Result<(), SyncError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SyncError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn sorted_desc(&self) -> Vec<Delegation> {
        let mut rows = self.rows();
        rows.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then(b.external_id.cmp(&a.external_id))
        });
        rows
    }
}

#[async_trait]
impl DelegationsRepository for MemoryRepository {
    async fn find_most_recent(&self) -> Result<Option<Delegation>, SyncError> {
        self.check_reads()?;
        Ok(self.sorted_desc().into_iter().next())
    }

    async fn find_available_years(&self) -> Result<Vec<i32>, SyncError> {
        self.check_reads()?;
        let years: BTreeSet<i32> = self.rows().iter().map(|d| d.timestamp.year()).collect();
        Ok(years.into_iter().collect())
    }

    async fn find_ordered_by_timestamp(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Delegation>, SyncError> {
        self.check_reads()?;
        Ok(self
            .sorted_desc()
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_from_year(
        &self,
        year: i32,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Delegation>, SyncError> {
        self.check_reads()?;
        let Some((start, end)) = year_range(year) else {
            return Ok(Vec::new());
        };
        Ok(self
            .sorted_desc()
            .into_iter()
            .filter(|d| d.timestamp >= start && d.timestamp < end)
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn create_many(&self, delegations: &[NewDelegation]) -> Result<u64, SyncError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let mut inserted = 0;

        for delegation in delegations {
            if rows.iter().any(|r| r.external_id == delegation.external_id) {
                continue;
            }
            let id = rows.len() as i64 + 1;
            rows.push(delegation.clone().stored(id));
            inserted += 1;
        }

        Ok(inserted)
    }
}

/// Fetcher that serves queued pages in order, then empty pages.
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: Mutex<VecDeque<Result<Vec<DelegationResponse>, String>>>,
    calls: Mutex<Vec<DelegationsFilter>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, page: Vec<DelegationResponse>) -> &Self {
        self.pages.lock().unwrap().push_back(Ok(page));
        self
    }

    pub fn push_error(&self, message: &str) -> &Self {
        self.pages.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    /// Every filter received, in call order.
    pub fn calls(&self) -> Vec<DelegationsFilter> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DelegationsFetcher for ScriptedFetcher {
    async fn fetch_delegations(
        &self,
        filter: &DelegationsFilter,
    ) -> Result<Vec<DelegationResponse>, SyncError> {
        filter.validate()?;
        self.calls.lock().unwrap().push(filter.clone());

        match self.pages.lock().unwrap().pop_front() {
            Some(Ok(page)) => Ok(page),
            Some(Err(message)) => Err(SyncError::Http(message)),
            None => Ok(Vec::new()),
        }
    }
}

/// Fetcher whose requests never complete.
pub struct PendingFetcher;

#[async_trait]
impl DelegationsFetcher for PendingFetcher {
    async fn fetch_delegations(
        &self,
        _filter: &DelegationsFilter,
    ) -> Result<Vec<DelegationResponse>, SyncError> {
        std::future::pending().await
    }
}
