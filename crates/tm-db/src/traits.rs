//! Statement executor trait consumed by the migration engine

use crate::error::DbResult;
use async_trait::async_trait;

/// Data store abstraction for Tidemark
///
/// Implementations must be Send + Sync for async operation. Errors are
/// returned as produced by the underlying driver.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute a script of one or more statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and return the first column of its first row as text.
    ///
    /// Returns `None` when the query yields no rows or a NULL value.
    async fn query_optional_string(&self, sql: &str) -> DbResult<Option<String>>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Create a schema if it does not exist
    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
