use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

use crate::store::{
    fields, StoreError, StoreResult, Submission, SubmissionState, SubmissionStore,
};

/// Connection pool for the submission database.
pub async fn init_pool(database_url: &str) -> StoreResult<PgPool> {
    info!("Initializing submission database pool");
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Postgres-backed submission store.
///
/// Schema: `submissions(id BIGINT PRIMARY KEY, state TEXT)` holds the save
/// lifecycle, `submission_data(sid BIGINT, name TEXT, value TEXT, PRIMARY
/// KEY (sid, name))` holds the field bag, one row per field.
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn load(&self, sid: i64) -> StoreResult<Option<Submission>> {
        let state: Option<String> =
            sqlx::query_scalar("SELECT state FROM submissions WHERE id = $1")
                .bind(sid)
                .fetch_optional(&self.pool)
                .await?;
        let Some(state) = state else {
            return Ok(None);
        };
        let state = SubmissionState::parse(&state)
            .ok_or_else(|| StoreError::Database(format!("unknown submission state: {}", state)))?;

        let rows = sqlx::query("SELECT name, value FROM submission_data WHERE sid = $1")
            .bind(sid)
            .fetch_all(&self.pool)
            .await?;
        let mut data = HashMap::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name")?;
            let value: String = row.try_get("value")?;
            data.insert(name, value);
        }

        Ok(Some(Submission { id: sid, state, data }))
    }

    async fn set_field(&self, sid: i64, name: &str, value: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO submission_data (sid, name, value)
             VALUES ($1, $2, $3)
             ON CONFLICT (sid, name) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(sid)
        .bind(name)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_reference(&self, reference: &str) -> StoreResult<Option<i64>> {
        let sid: Option<i64> = sqlx::query_scalar(
            "SELECT sid FROM submission_data WHERE name = $1 AND value = $2 LIMIT 1",
        )
        .bind(fields::TRANSACTION_REFERENCE)
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;
        Ok(sid)
    }
}
