//! Configuration types and parsing for tidemark.yml

use crate::catalog::LoaderOptions;
use crate::error::{CoreError, CoreResult};
use crate::script::{NamePattern, DEFAULT_NAME_PATTERN};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no `--target` flag is given.
pub const TARGET_ENV_VAR: &str = "TIDEMARK_TARGET";

/// Configuration file names searched by [`Config::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["tidemark.yml", "tidemark.yaml"];

/// Main configuration from tidemark.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Migration discovery and cursor settings
    #[serde(default)]
    pub migrations: MigrationsConfig,

    /// Named target configurations (e.g., dev, staging, prod)
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Database configuration override
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (DuckDB file or `:memory:`)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    ":memory:".to_string()
}

/// Migration discovery and cursor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationsConfig {
    /// Directory holding `NNN_name.sql` / `NNN_name.down.sql` scripts
    #[serde(default = "default_migrations_dir")]
    pub dir: String,

    /// Table holding the single cursor row (may be schema-qualified)
    #[serde(default = "default_cursor_table")]
    pub cursor_table: String,

    /// Regex a script's file name must match to be loaded
    #[serde(default = "default_name_pattern")]
    pub name_pattern: String,

    /// Only advance the cursor if it still holds the value read at plan time
    #[serde(default)]
    pub guard_cursor: bool,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            dir: default_migrations_dir(),
            cursor_table: default_cursor_table(),
            name_pattern: default_name_pattern(),
            guard_cursor: false,
        }
    }
}

fn default_migrations_dir() -> String {
    "migrations".to_string()
}

fn default_cursor_table() -> String {
    "migrations".to_string()
}

fn default_name_pattern() -> String {
    DEFAULT_NAME_PATTERN.to_string()
}

impl MigrationsConfig {
    /// Absolute migrations directory relative to a project root
    pub fn dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.dir)
    }

    /// Loader options built from `name_pattern`
    pub fn loader_options(&self) -> CoreResult<LoaderOptions> {
        Ok(LoaderOptions {
            name_pattern: NamePattern::new(&self.name_pattern)?,
        })
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for tidemark.yml or tidemark.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.migrations.dir.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations.dir cannot be empty".to_string(),
            });
        }

        let table = &self.migrations.cursor_table;
        if table.trim().is_empty() || table.split('.').any(str::is_empty) {
            return Err(CoreError::ConfigInvalid {
                message: format!("migrations.cursor_table '{}' is not a valid table name", table),
            });
        }

        NamePattern::new(&self.migrations.name_pattern)?;

        for (name, target) in &self.targets {
            if let Some(db) = &target.database {
                if db.path.trim().is_empty() {
                    return Err(CoreError::ConfigInvalid {
                        message: format!("Target '{}' has an empty database path", name),
                    });
                }
            }
        }

        Ok(())
    }

    /// Get the list of available target names, sorted
    pub fn available_targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get database configuration, optionally applying target overrides
    ///
    /// If target is specified and exists, uses target's database config.
    /// Otherwise, uses the base database config.
    pub fn get_database_config(&self, target: Option<&str>) -> CoreResult<DatabaseConfig> {
        match target {
            Some(name) => {
                let target_config =
                    self.targets
                        .get(name)
                        .ok_or_else(|| CoreError::ConfigInvalid {
                            message: format!(
                                "Target '{}' not found. Available targets: {}",
                                name,
                                self.available_targets().join(", ")
                            ),
                        })?;

                Ok(target_config
                    .database
                    .clone()
                    .unwrap_or_else(|| self.database.clone()))
            }
            None => Ok(self.database.clone()),
        }
    }

    /// Resolve target from CLI flag or TIDEMARK_TARGET environment variable
    ///
    /// Priority: CLI flag > TIDEMARK_TARGET env var > None
    pub fn resolve_target(cli_target: Option<&str>) -> Option<String> {
        cli_target
            .map(String::from)
            .or_else(|| std::env::var(TARGET_ENV_VAR).ok())
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
