use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

mod delegations;
mod migrations;
mod repository;

pub use delegations::year_range;
pub use repository::DelegationsRepository;

use crate::models::{Delegation, NewDelegation};
use crate::sync::SyncError;
use crate::utils::retry::{with_retry, RetryPolicy};

pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Connect, retrying with backoff while the database comes up.
    pub async fn connect_with_retry(
        database_url: &str,
        max_connections: u32,
        policy: RetryPolicy,
    ) -> Result<Self> {
        with_retry(
            || Self::new(database_url, max_connections),
            policy,
            "database_connect",
        )
        .await
    }

    pub async fn migrate(self) -> Result<Self> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        Ok(self)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DelegationsRepository for Database {
    async fn find_most_recent(&self) -> Result<Option<Delegation>, SyncError> {
        Ok(delegations::find_most_recent(&self.pool).await?)
    }

    async fn find_available_years(&self) -> Result<Vec<i32>, SyncError> {
        Ok(delegations::find_available_years(&self.pool).await?)
    }

    async fn find_ordered_by_timestamp(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Delegation>, SyncError> {
        Ok(delegations::find_ordered_by_timestamp(&self.pool, limit, offset).await?)
    }

    async fn find_from_year(
        &self,
        year: i32,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Delegation>, SyncError> {
        Ok(delegations::find_from_year(&self.pool, year, limit, offset).await?)
    }

    async fn create_many(&self, delegations: &[NewDelegation]) -> Result<u64, SyncError> {
        Ok(delegations::create_many(&self.pool, delegations).await?)
    }
}
