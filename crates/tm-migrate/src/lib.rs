//! tm-migrate - Migration engine for Tidemark
//!
//! Ties a validated [`tm_core::Catalog`] to a [`tm_db::Database`]: the
//! [`CursorStore`] persists the last applied slug, and the [`Migrator`]
//! plans, executes, and records upgrades and downgrades.

pub mod cursor;
pub mod error;
pub mod migrator;

pub use cursor::{CursorStore, TableCursorStore};
pub use error::{MigrateError, MigrateResult};
pub use migrator::{DowngradeStep, Migrator, UpgradeReport};
