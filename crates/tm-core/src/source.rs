//! Source sets: where migration scripts come from.
//!
//! A [`SourceSet`] enumerates `(name, content)` pairs once, at engine
//! construction. Filtering and validation happen in [`crate::catalog`].

use crate::error::{CoreError, CoreResult};
use rust_embed::RustEmbed;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// One raw script as supplied by a source set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceScript {
    /// File name, possibly with a directory prefix
    pub name: String,
    /// Raw content bytes
    pub content: Vec<u8>,
}

impl SourceScript {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// An enumerable collection of bundled migration scripts.
pub trait SourceSet {
    /// Return every script in the set. Order is not significant.
    fn scripts(&self) -> CoreResult<Vec<SourceScript>>;
}

/// Scripts compiled into the binary with `include_str!`.
///
/// ```
/// use tm_core::StaticSource;
/// static MIGRATIONS: &[(&str, &str)] = &[
///     ("001_init.sql", "CREATE TABLE t (id INT)"),
///     ("001_init.down.sql", "DROP TABLE t"),
/// ];
/// let source = StaticSource::new(MIGRATIONS);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StaticSource {
    scripts: &'static [(&'static str, &'static str)],
}

impl StaticSource {
    pub const fn new(scripts: &'static [(&'static str, &'static str)]) -> Self {
        Self { scripts }
    }
}

impl SourceSet for StaticSource {
    fn scripts(&self) -> CoreResult<Vec<SourceScript>> {
        Ok(self
            .scripts
            .iter()
            .map(|(name, sql)| SourceScript::new(*name, sql.as_bytes()))
            .collect())
    }
}

/// A directory bundled with `rust-embed`.
pub struct EmbeddedSource<E: RustEmbed> {
    _assets: PhantomData<E>,
}

impl<E: RustEmbed> EmbeddedSource<E> {
    pub fn new() -> Self {
        Self {
            _assets: PhantomData,
        }
    }
}

impl<E: RustEmbed> Default for EmbeddedSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RustEmbed> SourceSet for EmbeddedSource<E> {
    fn scripts(&self) -> CoreResult<Vec<SourceScript>> {
        let mut scripts = Vec::new();
        for name in E::iter() {
            let file = E::get(&name).ok_or_else(|| CoreError::SourceIo {
                path: name.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "embedded file listed but not present",
                ),
            })?;
            scripts.push(SourceScript::new(name.as_ref(), file.data.into_owned()));
        }
        Ok(scripts)
    }
}

/// Scripts read from the filesystem through a glob pattern.
#[derive(Debug, Clone)]
pub struct DirSource {
    pattern: String,
}

impl DirSource {
    /// All `*.sql` files directly inside `dir`.
    ///
    /// Glob metacharacters in `dir` itself are matched literally.
    pub fn new(dir: &Path) -> Self {
        let escaped = glob::Pattern::escape(&dir.to_string_lossy());
        Self::from_glob(
            Path::new(&escaped)
                .join("*.sql")
                .to_string_lossy()
                .into_owned(),
        )
    }

    /// Every file matched by an explicit glob pattern, e.g. `db/**/*.sql`.
    pub fn from_glob(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl SourceSet for DirSource {
    fn scripts(&self) -> CoreResult<Vec<SourceScript>> {
        let paths = glob::glob(&self.pattern).map_err(|e| CoreError::InvalidGlob {
            pattern: self.pattern.clone(),
            message: e.to_string(),
        })?;

        let mut scripts = Vec::new();
        for entry in paths {
            let path: PathBuf = entry.map_err(|e| CoreError::SourceIo {
                path: e.path().display().to_string(),
                source: e.into_error(),
            })?;
            if !path.is_file() {
                continue;
            }
            let content = std::fs::read(&path).map_err(|e| CoreError::SourceIo {
                path: path.display().to_string(),
                source: e,
            })?;
            scripts.push(SourceScript::new(path.to_string_lossy(), content));
        }
        log::debug!("Read {} script(s) matching {}", scripts.len(), self.pattern);
        Ok(scripts)
    }
}

/// Scripts assembled at runtime.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    scripts: Vec<SourceScript>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a script, builder style.
    pub fn with(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.push(name, content);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.scripts.push(SourceScript::new(name, content));
    }
}

impl SourceSet for MemorySource {
    fn scripts(&self) -> CoreResult<Vec<SourceScript>> {
        Ok(self.scripts.clone())
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
