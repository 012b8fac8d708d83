//! Error types for tm-core

use thiserror::Error;

/// Core error type for Tidemark
#[derive(Error, Debug)]
pub enum CoreError {
    /// L001: The source set contained no matching migration scripts
    #[error("[L001] No migrations found")]
    NoMigrations,

    /// L002: A migration script has no content
    #[error("[L002] Empty migration for file {name}")]
    EmptyMigration { name: String },

    /// L003: Upgrade script without a downgrade counterpart
    #[error("[L003] No down migration for slug {slug}")]
    MissingDown { slug: String },

    /// L004: Downgrade script without an upgrade counterpart
    #[error("[L004] No up migration for slug {slug}")]
    MissingUp { slug: String },

    /// L005: Two scripts resolve to the same slug and direction
    #[error("[L005] Duplicate {direction} migration for slug {slug}: {first} and {second}")]
    DuplicateMigration {
        slug: String,
        direction: String,
        first: String,
        second: String,
    },

    /// L006: Script content is not valid UTF-8
    #[error("[L006] Migration {name} is not valid UTF-8")]
    InvalidEncoding { name: String },

    /// L007: A script could not be read from its source
    #[error("[L007] Failed to read migration '{path}': {source}")]
    SourceIo {
        path: String,
        source: std::io::Error,
    },

    /// L008: Invalid glob pattern for a directory source
    #[error("[L008] Invalid migration glob '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// P001: Slug prefix is not a non-negative integer
    #[error("[P001] Invalid version prefix in slug '{slug}': {source}")]
    InvalidVersion {
        slug: String,
        source: std::num::ParseIntError,
    },

    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config: {0}")]
    ConfigParseError(#[from] serde_yaml::Error),

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: IO error with file path context
    #[error("[C004] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
