//! Down command implementation - reverts applied migrations

use anyhow::Result;

use crate::cli::{DownArgs, GlobalArgs};
use crate::commands::common::{cursor_label, Project};

/// Execute the down command
pub(crate) async fn execute(args: &DownArgs, global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;
    let migrator = project.migrator(global)?;

    let steps = if args.all {
        migrator.downgrade_all().await?
    } else {
        migrator.downgrade_one().await?.into_iter().collect()
    };

    let Some(last) = steps.last() else {
        println!("Nothing to revert");
        return Ok(());
    };

    for step in &steps {
        println!("  ✓ reverted {}", step.reverted);
    }
    println!("\nNow at {}", cursor_label(last.cursor.as_ref()));
    Ok(())
}
