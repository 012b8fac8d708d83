//! Up command implementation - applies pending migrations

use anyhow::Result;
use tm_core::{plan_status, PlanStatus};

use crate::cli::{GlobalArgs, UpArgs};
use crate::commands::common::{cursor_label, Project};

/// Execute the up command
pub(crate) async fn execute(args: &UpArgs, global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;

    if args.dry_run {
        let status = preview(&project, global).await?;
        if status.pending.is_empty() {
            println!("Up to date at {}", cursor_label(status.current.as_ref()));
            return Ok(());
        }
        println!("Would apply {} migration(s):", status.pending.len());
        for slug in &status.pending {
            println!("  {}", slug);
        }
        return Ok(());
    }

    let migrator = project.migrator(global)?;
    let report = migrator.upgrade().await?;
    if report.is_noop() {
        println!("Up to date at {}", cursor_label(report.cursor()));
        return Ok(());
    }

    for slug in &report.applied {
        println!("  ✓ {}", slug);
    }
    println!(
        "\nApplied {} migration(s), now at {}",
        report.applied.len(),
        cursor_label(report.cursor())
    );
    Ok(())
}

/// Pending work without creating the database file or the cursor table.
async fn preview(project: &Project, global: &GlobalArgs) -> Result<PlanStatus> {
    let fresh = matches!(project.database_path(global)?, Some(path) if !path.exists());
    if fresh {
        let catalog = project.load_catalog()?;
        return Ok(plan_status(&catalog, None)?);
    }
    Ok(project.migrator(global)?.preview().await?)
}
