//! Migration catalog loading and validation.
//!
//! [`Catalog::load`] turns a [`SourceSet`] into validated upgrade/downgrade
//! pairs. Loading is a pure transform; nothing is executed.

use crate::error::{CoreError, CoreResult};
use crate::script::{base_name, Direction, NamePattern, Script, ScriptName};
use crate::slug::Slug;
use crate::source::SourceSet;
use std::collections::BTreeMap;

/// Options controlling which source entries count as migrations.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// File-name filter applied to each script's base name
    pub name_pattern: NamePattern,
}

/// One slug with both of its scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPair {
    pub slug: Slug,
    up: Script,
    down: Script,
}

impl MigrationPair {
    pub fn upgrade(&self) -> &Script {
        &self.up
    }

    pub fn downgrade(&self) -> &Script {
        &self.down
    }

    pub fn script(&self, direction: Direction) -> &Script {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }
}

/// Scripts seen so far for one slug while scanning.
#[derive(Default)]
struct PartialPair {
    up: Option<(String, Script)>,
    down: Option<(String, Script)>,
}

impl PartialPair {
    fn slot(&mut self, direction: Direction) -> &mut Option<(String, Script)> {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        }
    }
}

/// Validated, read-only collection of migration pairs keyed by slug.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pairs: BTreeMap<Slug, MigrationPair>,
}

impl Catalog {
    /// Load and validate every migration in `source`.
    ///
    /// Fails when a matching script is empty or not UTF-8, when nothing
    /// matched at all, or when a slug lacks its upgrade or downgrade side.
    pub fn load(source: &dyn SourceSet, options: &LoaderOptions) -> CoreResult<Self> {
        let mut partial: BTreeMap<Slug, PartialPair> = BTreeMap::new();
        let mut matched = 0usize;

        for raw in source.scripts()? {
            let Some(name) = ScriptName::parse(&raw.name, &options.name_pattern) else {
                log::debug!("Skipping non-migration file {}", raw.name);
                continue;
            };
            let file = base_name(&raw.name).to_string();

            if raw.content.is_empty() {
                return Err(CoreError::EmptyMigration { name: file });
            }
            let sql = String::from_utf8(raw.content)
                .map_err(|_| CoreError::InvalidEncoding { name: file.clone() })?;

            let slot = partial
                .entry(name.slug.clone())
                .or_default()
                .slot(name.direction);
            if let Some((first, _)) = slot {
                return Err(CoreError::DuplicateMigration {
                    slug: name.slug.into_inner(),
                    direction: name.direction.to_string(),
                    first: first.clone(),
                    second: raw.name,
                });
            }
            *slot = Some((raw.name, Script::new(name.direction, sql)));
            matched += 1;
        }

        if matched == 0 {
            return Err(CoreError::NoMigrations);
        }

        let mut pairs = BTreeMap::new();
        for (slug, pair) in partial {
            match (pair.up, pair.down) {
                (Some((_, up)), Some((_, down))) => {
                    pairs.insert(slug.clone(), MigrationPair { slug, up, down });
                }
                (Some(_), None) => {
                    return Err(CoreError::MissingDown {
                        slug: slug.into_inner(),
                    })
                }
                (None, Some(_)) => {
                    return Err(CoreError::MissingUp {
                        slug: slug.into_inner(),
                    })
                }
                (None, None) => unreachable!("slug entries are only created with a script"),
            }
        }

        log::debug!("Loaded {} migration pair(s)", pairs.len());
        Ok(Self { pairs })
    }

    /// Load with the default file-name pattern.
    pub fn load_default(source: &dyn SourceSet) -> CoreResult<Self> {
        Self::load(source, &LoaderOptions::default())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&MigrationPair> {
        self.pairs.get(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.pairs.contains_key(slug)
    }

    /// Look up one script by slug and direction.
    pub fn script(&self, slug: &str, direction: Direction) -> Option<&Script> {
        self.get(slug).map(|pair| pair.script(direction))
    }

    /// Look up one script by its canonical file name, e.g. `001_init.down.sql`.
    pub fn script_by_name(&self, file_name: &str) -> Option<&Script> {
        let (slug, direction) = match file_name.strip_suffix(Direction::Down.suffix()) {
            Some(slug) => (slug, Direction::Down),
            None => (file_name.strip_suffix(Direction::Up.suffix())?, Direction::Up),
        };
        self.script(slug, direction)
    }

    /// Every slug, in lexicographic order.
    pub fn slugs(&self) -> impl Iterator<Item = &Slug> {
        self.pairs.keys()
    }

    /// Every pair, in lexicographic slug order.
    pub fn pairs(&self) -> impl Iterator<Item = &MigrationPair> {
        self.pairs.values()
    }

    /// Parse every slug's version, failing on the first malformed one.
    pub fn check_versions(&self) -> CoreResult<()> {
        for slug in self.slugs() {
            slug.version()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
