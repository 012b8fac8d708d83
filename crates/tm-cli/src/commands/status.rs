//! Status command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{cursor_label, Project};

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;
    let migrator = project.migrator(global)?;
    let status = migrator.status().await?;

    match args.output {
        StatusOutput::Json => {
            let json = serde_json::to_string_pretty(&status)
                .context("Failed to serialize status to JSON")?;
            println!("{}", json);
        }
        StatusOutput::Table => {
            println!("Current: {}", cursor_label(status.current.as_ref()));
            println!();
            println!("{:<10} MIGRATION", "STATE");
            for slug in &status.applied {
                println!("{:<10} {}", "applied", slug);
            }
            for slug in &status.pending {
                println!("{:<10} {}", "pending", slug);
            }
            println!(
                "\n{} applied, {} pending",
                status.applied.len(),
                status.pending.len()
            );
        }
    }
    Ok(())
}
