//! Migration script naming and the upgrade/downgrade script variant.
//!
//! File-name conventions live here and nowhere else: `<slug>.sql` is an
//! upgrade, `<slug>.down.sql` is the matching downgrade. Everything past this
//! module works with [`Slug`] and [`Direction`] values.

use crate::error::{CoreError, CoreResult};
use crate::slug::Slug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// File-name pattern a script must match to be considered a migration.
///
/// Unanchored: any base name containing three digits followed eventually by
/// `.sql` or `.down.sql` qualifies.
pub const DEFAULT_NAME_PATTERN: &str = r"\d{3}.*\.(sql|down\.sql)";

const DOWN_SUFFIX: &str = ".down.sql";
const UP_SUFFIX: &str = ".sql";

/// Which way a script moves the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Apply a revision
    Up,
    /// Revert a revision
    Down,
}

impl Direction {
    /// File name suffix for scripts of this direction.
    pub fn suffix(self) -> &'static str {
        match self {
            Direction::Up => UP_SUFFIX,
            Direction::Down => DOWN_SUFFIX,
        }
    }

    /// Build the script file name for `slug` in this direction.
    pub fn file_name(self, slug: &Slug) -> String {
        format!("{}{}", slug, self.suffix())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Statement text of one migration script, tagged with its direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// Upgrade script text
    Upgrade(String),
    /// Downgrade script text
    Downgrade(String),
}

impl Script {
    /// Wrap `sql` in the variant matching `direction`.
    pub fn new(direction: Direction, sql: String) -> Self {
        match direction {
            Direction::Up => Script::Upgrade(sql),
            Direction::Down => Script::Downgrade(sql),
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Script::Upgrade(_) => Direction::Up,
            Script::Downgrade(_) => Direction::Down,
        }
    }

    /// The literal statement text.
    pub fn sql(&self) -> &str {
        match self {
            Script::Upgrade(sql) | Script::Downgrade(sql) => sql,
        }
    }
}

/// Compiled migration file-name filter.
#[derive(Debug, Clone)]
pub struct NamePattern(Regex);

impl NamePattern {
    /// Compile a file-name filter.
    pub fn new(pattern: &str) -> CoreResult<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| CoreError::ConfigInvalid {
                message: format!("invalid migration name_pattern '{}': {}", pattern, e),
            })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.0.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for NamePattern {
    fn default() -> Self {
        Self(Regex::new(DEFAULT_NAME_PATTERN).expect("valid regex literal"))
    }
}

/// A script file name decomposed into slug and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptName {
    pub slug: Slug,
    pub direction: Direction,
}

impl ScriptName {
    /// Parse a script file name.
    ///
    /// Directory components are ignored. Returns `None` when the base name
    /// does not match `pattern` or has nothing before its first `.`.
    pub fn parse(name: &str, pattern: &NamePattern) -> Option<Self> {
        let base = base_name(name);
        if !pattern.is_match(base) {
            return None;
        }

        let stem = base.split('.').next().unwrap_or_default();
        let slug = Slug::try_new(stem)?;
        let direction = if base.ends_with(DOWN_SUFFIX) {
            Direction::Down
        } else {
            Direction::Up
        };
        Some(Self { slug, direction })
    }

    /// Reassemble the canonical file name.
    pub fn file_name(&self) -> String {
        self.direction.file_name(&self.slug)
    }
}

/// Strip any `/` or `\` separated directory prefix.
pub(crate) fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
