//! tm-core - Core library for Tidemark
//!
//! This crate provides the pieces of the migration engine that never touch a
//! database: script naming, source sets, catalog loading and validation,
//! version planning, and `tidemark.yml` configuration.

pub mod catalog;
pub mod config;
pub mod error;
pub mod planner;
pub mod script;
pub mod slug;
pub mod source;
pub mod sql_utils;

pub use catalog::{Catalog, LoaderOptions, MigrationPair};
pub use config::{Config, DbType};
pub use error::{CoreError, CoreResult};
pub use planner::{plan_downgrade, plan_status, plan_upgrade, PlanStatus};
pub use script::{Direction, NamePattern, Script, ScriptName, DEFAULT_NAME_PATTERN};
pub use slug::Slug;
pub use source::{DirSource, EmbeddedSource, MemorySource, SourceScript, SourceSet, StaticSource};
