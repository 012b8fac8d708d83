//! Error types for tm-migrate

use thiserror::Error;
use tm_core::{CoreError, Direction};
use tm_db::DbError;

/// Migration engine errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Catalog or version parsing failure
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Cursor setup or read failure, passed through from the data store
    #[error(transparent)]
    Db(#[from] DbError),

    /// A migration script failed to execute (X001)
    #[error("[X001] Migration {file} failed: {source}")]
    Execution {
        slug: String,
        direction: Direction,
        file: String,
        source: DbError,
    },

    /// The catalog has no script for the requested slug and direction (X002)
    #[error("[X002] No {direction} migration for slug {slug} in catalog")]
    MissingScript { slug: String, direction: Direction },

    /// Scripts ran but the new cursor could not be recorded (X004)
    #[error("[X004] Migration scripts succeeded but recording cursor '{cursor}' failed: {source}")]
    CursorWrite { cursor: String, source: DbError },

    /// The cursor changed between planning and recording (X003)
    #[error("[X003] Cursor changed during migration: expected '{expected}', found '{found}'")]
    CursorConflict { expected: String, found: String },
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
