//! Persisted migration cursor.
//!
//! The cursor is a single row holding the slug of the most recently applied
//! upgrade, or `''` when nothing has been applied. It is a high-water mark,
//! not a history.

use async_trait::async_trait;
use std::sync::Arc;
use tm_core::sql_utils::{quote_literal, quote_qualified};
use tm_core::Slug;
use tm_db::{Database, DbResult};

/// Default name of the cursor table.
pub const DEFAULT_CURSOR_TABLE: &str = "migrations";

/// Storage for the single "last applied" slug.
///
/// Implementations pass data-store errors through unchanged.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Create the backing structure, seeded with an empty cursor, if absent.
    ///
    /// Idempotent; called before every read.
    async fn ensure_initialized(&self) -> DbResult<()>;

    /// Whether the backing structure has been created yet.
    async fn exists(&self) -> DbResult<bool>;

    /// Current cursor, `None` when nothing has been applied.
    async fn read(&self) -> DbResult<Option<Slug>>;

    /// Overwrite the cursor. `None` records a full rollback.
    async fn write(&self, cursor: Option<&Slug>) -> DbResult<()>;

    /// Overwrite the cursor only if it still holds `expected`.
    ///
    /// Returns `false`, leaving the cursor untouched, when another runner
    /// moved it first.
    async fn write_if(&self, expected: Option<&Slug>, cursor: Option<&Slug>) -> DbResult<bool>;
}

fn stored_value(cursor: Option<&Slug>) -> String {
    quote_literal(cursor.map(Slug::as_str).unwrap_or_default())
}

/// Cursor kept in a one-column, one-row table.
pub struct TableCursorStore<D: Database + ?Sized> {
    db: Arc<D>,
    table: String,
}

impl<D: Database + ?Sized> TableCursorStore<D> {
    /// Cursor stored in `table`, which may be schema-qualified.
    pub fn new(db: Arc<D>, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn quoted_table(&self) -> String {
        quote_qualified(&self.table)
    }
}

#[async_trait]
impl<D: Database + ?Sized> CursorStore for TableCursorStore<D> {
    async fn ensure_initialized(&self) -> DbResult<()> {
        if let Some((schema, _)) = self.table.rsplit_once('.') {
            self.db.create_schema_if_not_exists(schema).await?;
        }

        let table = self.quoted_table();
        self.db
            .execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (id VARCHAR(100) NOT NULL);
                 INSERT INTO {table} SELECT '' WHERE NOT EXISTS (SELECT 1 FROM {table});"
            ))
            .await
    }

    async fn exists(&self) -> DbResult<bool> {
        self.db.relation_exists(&self.table).await
    }

    async fn read(&self) -> DbResult<Option<Slug>> {
        let value = self
            .db
            .query_optional_string(&format!("SELECT id FROM {} LIMIT 1", self.quoted_table()))
            .await?;
        Ok(value.and_then(Slug::try_new))
    }

    async fn write(&self, cursor: Option<&Slug>) -> DbResult<()> {
        self.db
            .execute(&format!(
                "UPDATE {} SET id = {}",
                self.quoted_table(),
                stored_value(cursor)
            ))
            .await?;
        Ok(())
    }

    async fn write_if(&self, expected: Option<&Slug>, cursor: Option<&Slug>) -> DbResult<bool> {
        let updated = self
            .db
            .execute(&format!(
                "UPDATE {} SET id = {} WHERE id = {}",
                self.quoted_table(),
                stored_value(cursor),
                stored_value(expected)
            ))
            .await?;
        Ok(updated > 0)
    }
}

#[cfg(test)]
#[path = "cursor_test.rs"]
mod tests;
