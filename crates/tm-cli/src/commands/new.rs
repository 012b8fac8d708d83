//! New command implementation - scaffolds the next migration pair

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tm_core::{Direction, NamePattern, ScriptName, Slug};

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::Project;

/// Execute the new command
pub(crate) async fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    validate_name(&args.name)?;

    let project = Project::load(global)?;
    let dir = project.migrations_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let pattern = NamePattern::new(&project.config.migrations.name_pattern)?;
    let version = next_version(&dir, &pattern)?;
    let slug = Slug::new(format!("{:03}_{}", version, args.name));

    for direction in [Direction::Up, Direction::Down] {
        let path = dir.join(direction.file_name(&slug));
        if path.exists() {
            anyhow::bail!("Refusing to overwrite {}", path.display());
        }
        fs::write(&path, template(&slug, direction))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  created {}", path.display());
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        anyhow::bail!(
            "Invalid migration name '{}': use lowercase letters, digits, and underscores",
            name
        );
    }
    Ok(())
}

/// One past the highest numeric version in `dir`, starting at 1.
fn next_version(dir: &Path, pattern: &NamePattern) -> Result<u64> {
    let mut highest = 0;
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = ScriptName::parse(&file_name.to_string_lossy(), pattern) else {
            continue;
        };
        match name.slug.version() {
            Ok(version) => highest = highest.max(version),
            Err(_) => log::warn!("Ignoring {} while numbering: no numeric version", name.slug),
        }
    }
    Ok(highest + 1)
}

// Scripts must not be empty to load, so both carry a comment.
fn template(slug: &Slug, direction: Direction) -> String {
    match direction {
        Direction::Up => format!("-- {}: upgrade\n", slug),
        Direction::Down => format!("-- {}: revert the upgrade\n", slug),
    }
}
