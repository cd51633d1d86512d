use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};

use crate::models::{Delegation, NewDelegation};

const SELECT_COLUMNS: &str = "id, external_id, timestamp, amount, delegator, level";

#[instrument(skip(pool, delegations), fields(batch_size = delegations.len()))]
pub async fn create_many(pool: &PgPool, delegations: &[NewDelegation]) -> Result<u64, sqlx::Error> {
    if delegations.is_empty() {
        return Ok(0);
    }

    let mut external_ids = Vec::with_capacity(delegations.len());
    let mut timestamps = Vec::with_capacity(delegations.len());
    let mut amounts = Vec::with_capacity(delegations.len());
    let mut delegators = Vec::with_capacity(delegations.len());
    let mut levels = Vec::with_capacity(delegations.len());

    for d in delegations {
        external_ids.push(d.external_id);
        timestamps.push(d.timestamp);
        amounts.push(d.amount);
        delegators.push(d.delegator.clone());
        levels.push(d.level);
    }

    // Single statement so the whole batch lands or nothing does; duplicates are skipped
    let query = r#"
    INSERT INTO delegations (external_id, timestamp, amount, delegator, level)
    SELECT * FROM UNNEST($1::BIGINT[], $2::TIMESTAMPTZ[], $3::BIGINT[], $4::TEXT[], $5::BIGINT[])
    ON CONFLICT (external_id) DO NOTHING
    "#;

    let result = sqlx::query(query)
        .bind(&external_ids)
        .bind(&timestamps)
        .bind(&amounts)
        .bind(&delegators)
        .bind(&levels)
        .execute(pool)
        .await;

    match result {
        Ok(res) => {
            debug!(
                "Inserted {} of {} delegations",
                res.rows_affected(),
                delegations.len()
            );
            Ok(res.rows_affected())
        }
        Err(e) => {
            error!("Failed to insert delegations: {}", e);
            Err(e)
        }
    }
}

#[instrument(skip(pool))]
pub async fn find_most_recent(pool: &PgPool) -> Result<Option<Delegation>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM delegations ORDER BY timestamp DESC, external_id DESC LIMIT 1",
        SELECT_COLUMNS
    );

    let result = sqlx::query_as::<_, Delegation>(&query)
        .fetch_optional(pool)
        .await;

    match result {
        Ok(delegation) => {
            match &delegation {
                Some(d) => debug!("Most recent delegation: {} at {}", d.external_id, d.timestamp),
                None => debug!("No delegations found in database"),
            }
            Ok(delegation)
        }
        Err(e) => {
            error!("Failed to get most recent delegation: {}", e);
            Err(e)
        }
    }
}

#[instrument(skip(pool))]
pub async fn find_available_years(pool: &PgPool) -> Result<Vec<i32>, sqlx::Error> {
    let query = r#"
    SELECT DISTINCT EXTRACT(YEAR FROM timestamp AT TIME ZONE 'UTC')::INT AS year
    FROM delegations
    ORDER BY year
    "#;

    sqlx::query_scalar::<_, i32>(query)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            error!("Failed to get available years: {}", e);
            e
        })
}

#[instrument(skip(pool))]
pub async fn find_ordered_by_timestamp(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Delegation>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM delegations ORDER BY timestamp DESC, external_id DESC LIMIT $1 OFFSET $2",
        SELECT_COLUMNS
    );

    sqlx::query_as::<_, Delegation>(&query)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            error!("Failed to get delegations page: {}", e);
            e
        })
}

#[instrument(skip(pool))]
pub async fn find_from_year(
    pool: &PgPool,
    year: i32,
    limit: i64,
    offset: i64,
) -> Result<Vec<Delegation>, sqlx::Error> {
    // No row can carry a timestamp outside chrono's range
    let Some((start, end)) = year_range(year) else {
        debug!("Year {} has no representable range, returning no rows", year);
        return Ok(Vec::new());
    };

    // Half-open range keeps the timestamp index usable
    let query = format!(
        "SELECT {} FROM delegations WHERE timestamp >= $1 AND timestamp < $2 \
         ORDER BY timestamp DESC, external_id DESC LIMIT $3 OFFSET $4",
        SELECT_COLUMNS
    );

    sqlx::query_as::<_, Delegation>(&query)
        .bind(start)
        .bind(end)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            error!("Failed to get delegations for year {}: {}", year, e);
            e
        })
}

/// `[Jan 1 of year, Jan 1 of year + 1)` in UTC.
pub fn year_range(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
    let end = Utc.with_ymd_and_hms(year.checked_add(1)?, 1, 1, 0, 0, 0).single()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_covers_the_whole_year() {
        let (start, end) = year_range(2024).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn year_range_rejects_unrepresentable_years() {
        assert!(year_range(i32::MAX).is_none());
        assert!(year_range(i32::MIN).is_none());
    }

    #[tokio::test]
    async fn unrepresentable_year_yields_no_rows_without_querying() {
        // Lazy pool never connects; a query against it would fail
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:9/none")
            .unwrap();

        let rows = find_from_year(&pool, i32::MAX, 10, 0).await.unwrap();

        assert!(rows.is_empty());
    }
}
