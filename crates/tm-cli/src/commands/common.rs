//! Shared setup for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tm_core::{Catalog, Config, CoreError, DirSource};
use tm_db::{Database, DuckDbBackend};
use tm_migrate::Migrator;

use crate::cli::GlobalArgs;

/// A project directory with its resolved configuration.
pub(crate) struct Project {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

impl Project {
    /// Resolve `--project-dir` and `--config`.
    ///
    /// A project without a tidemark.yml runs on defaults; an explicit
    /// `--config` that does not exist is an error.
    pub(crate) fn load(global: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&global.project_dir);
        let config = match &global.config {
            Some(path) => Config::load(Path::new(path))
                .with_context(|| format!("Failed to load config: {}", path))?,
            None => match Config::load_from_dir(&root) {
                Ok(config) => config,
                Err(CoreError::ConfigNotFound { path }) => {
                    log::debug!("No config at {}, using defaults", path);
                    Config::default()
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to load config from {}", root.display())
                    })
                }
            },
        };
        Ok(Self { root, config })
    }

    pub(crate) fn migrations_dir(&self) -> PathBuf {
        self.config.migrations.dir_absolute(&self.root)
    }

    /// Load every migration pair from the migrations directory.
    pub(crate) fn load_catalog(&self) -> Result<Catalog> {
        let dir = self.migrations_dir();
        let options = self.config.migrations.loader_options()?;
        let catalog = Catalog::load(&DirSource::new(&dir), &options)
            .with_context(|| format!("Failed to load migrations from {}", dir.display()))?;
        log::debug!("Loaded {} migration(s) from {}", catalog.len(), dir.display());
        Ok(catalog)
    }

    /// On-disk database file for the selected target, `None` for `:memory:`.
    pub(crate) fn database_path(&self, global: &GlobalArgs) -> Result<Option<PathBuf>> {
        let target = Config::resolve_target(global.target.as_deref());
        let db_config = self.config.get_database_config(target.as_deref())?;
        if db_config.path == ":memory:" {
            return Ok(None);
        }
        Ok(Some(self.root.join(&db_config.path)))
    }

    /// Open the database for the selected target.
    pub(crate) fn open_database(&self, global: &GlobalArgs) -> Result<Arc<dyn Database>> {
        let db = match self.database_path(global)? {
            Some(path) => {
                log::debug!("Opening duckdb database at {}", path.display());
                DuckDbBackend::from_path(&path)
                    .with_context(|| format!("Failed to open database: {}", path.display()))?
            }
            None => {
                log::debug!("Opening in-memory duckdb database");
                DuckDbBackend::in_memory().context("Failed to open in-memory database")?
            }
        };
        Ok(Arc::new(db))
    }

    /// Catalog and database wired into a migrator.
    pub(crate) fn migrator(&self, global: &GlobalArgs) -> Result<Migrator<dyn Database>> {
        let catalog = self.load_catalog()?;
        let db = self.open_database(global)?;
        Ok(Migrator::from_config(db, catalog, &self.config.migrations))
    }
}

/// Render an optional cursor for display.
pub(crate) fn cursor_label(cursor: Option<&tm_core::Slug>) -> String {
    cursor.map_or_else(|| "(none)".to_string(), |slug| slug.to_string())
}
