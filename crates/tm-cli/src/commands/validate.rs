//! Validate command implementation - checks migration files offline

use anyhow::Result;

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::Project;

/// Execute the validate command
///
/// Loads the catalog and parses every version; never opens the database.
pub(crate) async fn execute(_args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;
    let catalog = project.load_catalog()?;
    catalog.check_versions()?;

    println!(
        "✓ {} migration pair(s) in {} are valid",
        catalog.len(),
        project.migrations_dir().display()
    );
    Ok(())
}
