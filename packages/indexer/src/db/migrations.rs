use anyhow::Result;
use sqlx::PgPool;
use tracing::{error, info};

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations");

    // external_id is the deduplication key for insert-or-ignore
    let create_delegations_table = r#"
    CREATE TABLE IF NOT EXISTS delegations (
        id BIGSERIAL PRIMARY KEY,
        external_id BIGINT NOT NULL UNIQUE,
        timestamp TIMESTAMPTZ NOT NULL,
        amount BIGINT NOT NULL,
        delegator TEXT NOT NULL,
        level BIGINT NOT NULL,
        created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
    )
    "#;

    // Most recent lookups and paged listings are ordered by timestamp DESC
    let create_timestamp_index = r#"
    CREATE INDEX IF NOT EXISTS idx_delegations_timestamp_desc ON delegations (timestamp DESC)
    "#;

    info!("Creating delegations table if it doesn't exist");
    sqlx::query(create_delegations_table)
        .execute(pool)
        .await
        .map_err(|e| {
            error!("Failed to create delegations table: {}", e);
            e
        })?;

    info!("Creating timestamp index");
    sqlx::query(create_timestamp_index)
        .execute(pool)
        .await
        .map_err(|e| {
            error!("Failed to create timestamp index: {}", e);
            e
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}
