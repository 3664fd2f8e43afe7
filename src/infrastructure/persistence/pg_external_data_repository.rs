//! PostgreSQL implementation of the fetch log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{ExternalData, NewExternalData};
use crate::domain::repositories::ExternalDataRepository;
use crate::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ExternalDataRow {
    id: i64,
    source: String,
    key_name: String,
    payload: String,
    fetched_at: DateTime<Utc>,
}

impl From<ExternalDataRow> for ExternalData {
    fn from(r: ExternalDataRow) -> Self {
        ExternalData::new(r.id, r.source, r.key_name, r.payload, r.fetched_at)
    }
}

/// PostgreSQL repository over the `external_data` table.
///
/// Rows are only ever inserted. The `(source, key_name, fetched_at DESC)`
/// index serves [`ExternalDataRepository::most_recent`].
pub struct PgExternalDataRepository {
    pool: Arc<PgPool>,
}

impl PgExternalDataRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExternalDataRepository for PgExternalDataRepository {
    async fn append(&self, record: NewExternalData) -> Result<ExternalData, AppError> {
        let row = sqlx::query_as::<_, ExternalDataRow>(
            r#"
            INSERT INTO external_data (source, key_name, payload, fetched_at)
            VALUES ($1, $2, $3, COALESCE($4, NOW()))
            RETURNING id, source, key_name, payload, fetched_at
            "#,
        )
        .bind(&record.source)
        .bind(&record.key_name)
        .bind(&record.payload)
        .bind(record.fetched_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn most_recent(
        &self,
        source: &str,
        key_name: &str,
    ) -> Result<Option<ExternalData>, AppError> {
        let row = sqlx::query_as::<_, ExternalDataRow>(
            r#"
            SELECT id, source, key_name, payload, fetched_at
            FROM external_data
            WHERE source = $1 AND key_name = $2
            ORDER BY fetched_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(source)
        .bind(key_name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
