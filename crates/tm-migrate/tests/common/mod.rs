//! Shared helpers for tm-migrate integration tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tm_core::{Catalog, MemorySource};
use tm_db::{Database, DbResult, DuckDbBackend};

/// DuckDB backend that logs every statement it is handed.
pub struct RecordingDb {
    inner: DuckDbBackend,
    log: Mutex<Vec<String>>,
}

impl RecordingDb {
    pub fn in_memory() -> Arc<Self> {
        Self::wrap(DuckDbBackend::in_memory().unwrap())
    }

    pub fn wrap(inner: DuckDbBackend) -> Arc<Self> {
        Arc::new(Self {
            inner,
            log: Mutex::new(Vec::new()),
        })
    }

    /// Every statement seen so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Statements that are neither cursor reads nor cursor-table setup.
    pub fn scripts(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|s| !s.starts_with("SELECT") && !s.contains("CREATE TABLE IF NOT EXISTS"))
            .filter(|s| !s.starts_with("UPDATE \"migrations\""))
            .collect()
    }

    /// Cursor writes issued so far.
    pub fn cursor_writes(&self) -> usize {
        self.statements()
            .iter()
            .filter(|s| s.starts_with("UPDATE \"migrations\""))
            .count()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    fn record(&self, sql: &str) {
        self.log.lock().unwrap().push(sql.to_string());
    }
}

#[async_trait]
impl Database for RecordingDb {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.record(sql);
        self.inner.execute(sql).await
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.record(sql);
        self.inner.execute_batch(sql).await
    }

    async fn query_optional_string(&self, sql: &str) -> DbResult<Option<String>> {
        self.record(sql);
        self.inner.query_optional_string(sql).await
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.inner.relation_exists(name).await
    }

    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()> {
        self.inner.create_schema_if_not_exists(schema).await
    }

    fn db_type(&self) -> &'static str {
        "recording"
    }
}

/// The two-migration catalog used throughout the scenarios.
pub fn scenario_catalog() -> Catalog {
    let source = MemorySource::new()
        .with("001_init.sql", "CREATE TABLE t(id INT)")
        .with("001_init.down.sql", "DROP TABLE t")
        .with("002_add_col.sql", "ALTER TABLE t ADD c INT")
        .with("002_add_col.down.sql", "ALTER TABLE t DROP c");
    Catalog::load_default(&source).unwrap()
}
