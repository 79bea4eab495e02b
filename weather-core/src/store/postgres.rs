use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, postgres::PgPoolOptions};

use super::{AuditHistory, AuditLog, LogQuery, PersistenceError, PreferenceStore};
use crate::{
    config::DatabaseConfig,
    model::{AuditRecord, NewAuditRecord, UserPreference},
};

const CREATE_LOGS: &str = r#"
CREATE TABLE IF NOT EXISTS logs (
    id BIGSERIAL PRIMARY KEY,
    user_id BIGINT NOT NULL,
    command TEXT NOT NULL,
    timestamp TIMESTAMPTZ NOT NULL DEFAULT now(),
    response TEXT NOT NULL
)"#;

const CREATE_LOGS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS logs_user_id_timestamp_idx ON logs (user_id, timestamp DESC)";

const CREATE_USER_SETTINGS: &str = r#"
CREATE TABLE IF NOT EXISTS user_settings (
    user_id BIGINT PRIMARY KEY,
    city TEXT NOT NULL
)"#;

/// Postgres-backed preference and audit store.
///
/// Every call acquires its own pooled connection for one statement and drops it
/// before returning, so no connection outlives the operation.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the `logs` and `user_settings` tables if they are missing.
    pub async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        let mut conn = self.pool.acquire().await?;
        for statement in [CREATE_LOGS, CREATE_LOGS_INDEX, CREATE_USER_SETTINGS] {
            sqlx::query(statement).execute(&mut *conn).await?;
        }
        tracing::info!("database schema is up to date");
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for PgStore {
    async fn get(&self, user_id: i64) -> Result<Option<String>, PersistenceError> {
        let mut conn = self.pool.acquire().await?;
        let row: Option<UserPreference> =
            sqlx::query_as("SELECT user_id, city FROM user_settings WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(row.map(|pref| pref.city))
    }

    async fn set(&self, user_id: i64, city: &str) -> Result<(), PersistenceError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "INSERT INTO user_settings (user_id, city) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET city = EXCLUDED.city",
        )
        .bind(user_id)
        .bind(city)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AuditLog for PgStore {
    async fn append(&self, record: NewAuditRecord) -> Result<(), PersistenceError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("INSERT INTO logs (user_id, command, response) VALUES ($1, $2, $3)")
            .bind(record.user_id)
            .bind(&record.command)
            .bind(&record.response)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AuditHistory for PgStore {
    async fn recent(&self, query: &LogQuery) -> Result<Vec<AuditRecord>, PersistenceError> {
        let mut builder = history_query(query);
        let mut conn = self.pool.acquire().await?;
        let records = builder.build_query_as::<AuditRecord>().fetch_all(&mut *conn).await?;
        Ok(records)
    }
}

fn history_query(query: &LogQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder =
        QueryBuilder::new("SELECT id, user_id, command, timestamp, response FROM logs WHERE TRUE");

    if let Some(user_id) = query.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(start) = query.start {
        builder.push(" AND timestamp >= ").push_bind(start);
    }
    if let Some(end) = query.end {
        builder.push(" AND timestamp <= ").push_bind(end);
    }

    builder
        .push(" ORDER BY timestamp DESC, id DESC OFFSET ")
        .push_bind(i64::from(query.offset))
        .push(" LIMIT ")
        .push_bind(i64::from(query.limit));

    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn unfiltered_history_query_only_pages() {
        let builder = history_query(&LogQuery::default());
        assert_eq!(
            builder.sql(),
            "SELECT id, user_id, command, timestamp, response FROM logs WHERE TRUE \
             ORDER BY timestamp DESC, id DESC OFFSET $1 LIMIT $2"
        );
    }

    #[test]
    fn filtered_history_query_binds_in_order() {
        let day = Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).single();
        let query = LogQuery {
            user_id: Some(42),
            start: day,
            end: day,
            offset: 20,
            limit: 10,
        };

        let builder = history_query(&query);
        assert_eq!(
            builder.sql(),
            "SELECT id, user_id, command, timestamp, response FROM logs WHERE TRUE \
             AND user_id = $1 AND timestamp >= $2 AND timestamp <= $3 \
             ORDER BY timestamp DESC, id DESC OFFSET $4 LIMIT $5"
        );
    }
}
