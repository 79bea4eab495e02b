use async_trait::async_trait;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

use super::{AuditHistory, AuditLog, LogQuery, PersistenceError, PreferenceStore};
use crate::{
    clock::{Clock, SystemClock},
    model::{AuditRecord, NewAuditRecord},
};

/// Process-local store for tests and `--in-memory` runs.
#[derive(Debug)]
pub struct MemoryStore {
    clock: Arc<dyn Clock>,
    settings: Mutex<HashMap<i64, String>>,
    logs: Mutex<Vec<AuditRecord>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock, settings: Mutex::new(HashMap::new()), logs: Mutex::new(Vec::new()) }
    }

    /// Every appended record in write order.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.logs.lock().clone()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get(&self, user_id: i64) -> Result<Option<String>, PersistenceError> {
        Ok(self.settings.lock().get(&user_id).cloned())
    }

    async fn set(&self, user_id: i64, city: &str) -> Result<(), PersistenceError> {
        self.settings.lock().insert(user_id, city.to_string());
        Ok(())
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn append(&self, record: NewAuditRecord) -> Result<(), PersistenceError> {
        let mut logs = self.logs.lock();
        let id = logs.last().map_or(1, |last| last.id + 1);
        logs.push(AuditRecord {
            id,
            user_id: record.user_id,
            command: record.command,
            timestamp: self.clock.now(),
            response: record.response,
        });
        Ok(())
    }
}

#[async_trait]
impl AuditHistory for MemoryStore {
    async fn recent(&self, query: &LogQuery) -> Result<Vec<AuditRecord>, PersistenceError> {
        let mut matching: Vec<AuditRecord> =
            self.logs.lock().iter().filter(|r| query.matches(r)).cloned().collect();

        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        Ok(matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }
}
