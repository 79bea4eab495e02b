//! Durable state behind the command processor.
//!
//! Two tables back the bot: `user_settings` (one preferred city per user) and
//! `logs` (append-only audit of answered weather requests). Each operation is a
//! single unit of work on its own connection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{AuditRecord, NewAuditRecord};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, user_id: i64) -> Result<Option<String>, PersistenceError>;

    /// Insert or overwrite the user's city.
    async fn set(&self, user_id: i64, city: &str) -> Result<(), PersistenceError>;
}

/// Write side of the audit log. Append-only.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, record: NewAuditRecord) -> Result<(), PersistenceError>;
}

/// Read side of the audit log, used by the history API.
#[async_trait]
pub trait AuditHistory: Send + Sync {
    /// Records matching `query`, newest first.
    async fn recent(&self, query: &LogQuery) -> Result<Vec<AuditRecord>, PersistenceError>;
}

/// Filter and page for a history query. Date bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub user_id: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub offset: u32,
    pub limit: u32,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self { user_id: None, start: None, end: None, offset: 0, limit: DEFAULT_PAGE_SIZE }
    }
}

impl LogQuery {
    pub fn for_user(user_id: i64) -> Self {
        Self { user_id: Some(user_id), ..Self::default() }
    }

    pub(crate) fn matches(&self, record: &AuditRecord) -> bool {
        self.user_id.is_none_or(|id| record.user_id == id)
            && self.start.is_none_or(|start| record.timestamp >= start)
            && self.end.is_none_or(|end| record.timestamp <= end)
    }
}
