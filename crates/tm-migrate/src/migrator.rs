//! Upgrade and downgrade execution.
//!
//! Every operation reads the cursor, plans against the catalog, runs scripts
//! one at a time through the [`Database`], and records the new cursor only
//! after the scripts succeeded. Operations run to completion before
//! returning; nothing is spawned.
//!
//! A single runner per target is assumed. With `guard_cursor` enabled, the
//! final cursor write is conditional on the value read at plan time, which
//! turns a lost race into [`MigrateError::CursorConflict`] instead of a
//! silently overwritten cursor.

use crate::cursor::{CursorStore, TableCursorStore, DEFAULT_CURSOR_TABLE};
use crate::error::{MigrateError, MigrateResult};
use serde::Serialize;
use std::sync::Arc;
use tm_core::config::MigrationsConfig;
use tm_core::{plan_downgrade, plan_status, plan_upgrade, Catalog, Direction, PlanStatus, Slug};
use tm_db::Database;

/// Outcome of [`Migrator::upgrade`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeReport {
    /// Cursor before the upgrade
    pub from: Option<Slug>,
    /// Slugs applied, in order
    pub applied: Vec<Slug>,
}

impl UpgradeReport {
    /// Cursor after the upgrade.
    pub fn cursor(&self) -> Option<&Slug> {
        self.applied.last().or(self.from.as_ref())
    }

    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// One reverted migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DowngradeStep {
    /// Slug whose downgrade script ran
    pub reverted: Slug,
    /// Cursor after the step, `None` once fully rolled back
    pub cursor: Option<Slug>,
}

fn describe(cursor: Option<&Slug>) -> String {
    cursor.map(Slug::to_string).unwrap_or_default()
}

/// Migration executor bound to one database and one catalog.
pub struct Migrator<D: Database + ?Sized, C: CursorStore = TableCursorStore<D>> {
    db: Arc<D>,
    cursor: C,
    catalog: Catalog,
    guard_cursor: bool,
}

impl<D: Database + ?Sized> Migrator<D> {
    /// Migrator keeping its cursor in the default `migrations` table.
    pub fn new(db: Arc<D>, catalog: Catalog) -> Self {
        let cursor = TableCursorStore::new(db.clone(), DEFAULT_CURSOR_TABLE);
        Self::with_cursor_store(db, cursor, catalog)
    }

    /// Migrator configured from the `migrations` section of tidemark.yml.
    pub fn from_config(db: Arc<D>, catalog: Catalog, config: &MigrationsConfig) -> Self {
        let cursor = TableCursorStore::new(db.clone(), config.cursor_table.clone());
        Self::with_cursor_store(db, cursor, catalog).guard_cursor(config.guard_cursor)
    }
}

impl<D: Database + ?Sized, C: CursorStore> Migrator<D, C> {
    pub fn with_cursor_store(db: Arc<D>, cursor: C, catalog: Catalog) -> Self {
        Self {
            db,
            cursor,
            catalog,
            guard_cursor: false,
        }
    }

    /// Make cursor writes conditional on the value read at plan time.
    pub fn guard_cursor(mut self, enabled: bool) -> Self {
        self.guard_cursor = enabled;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cursor_store(&self) -> &C {
        &self.cursor
    }

    /// Read the cursor, creating its table on first use.
    pub async fn current(&self) -> MigrateResult<Option<Slug>> {
        self.cursor.ensure_initialized().await?;
        Ok(self.cursor.read().await?)
    }

    /// Applied and pending slugs for the current cursor.
    pub async fn status(&self) -> MigrateResult<PlanStatus> {
        let current = self.current().await?;
        Ok(plan_status(&self.catalog, current.as_ref())?)
    }

    /// Like [`status`](Self::status), but never creates the cursor table.
    ///
    /// A missing table reads as nothing applied.
    pub async fn preview(&self) -> MigrateResult<PlanStatus> {
        let current = if self.cursor.exists().await? {
            self.cursor.read().await?
        } else {
            None
        };
        Ok(plan_status(&self.catalog, current.as_ref())?)
    }

    /// Apply every pending migration in version order.
    ///
    /// Stops at the first failing script. Scripts that already ran are not
    /// rolled back and the cursor is not advanced, so a later `upgrade`
    /// replans from the old cursor and runs the whole batch again; scripts
    /// are applied at least once, not exactly once. The cursor moves to the
    /// last slug only after the entire batch succeeded.
    pub async fn upgrade(&self) -> MigrateResult<UpgradeReport> {
        let from = self.current().await?;
        let plan = plan_upgrade(&self.catalog, from.as_ref())?;

        let Some(last) = plan.last() else {
            log::info!("No pending migrations (cursor: '{}')", describe(from.as_ref()));
            return Ok(UpgradeReport {
                from,
                applied: Vec::new(),
            });
        };

        log::info!(
            "Applying {} migration(s) on {} from '{}'",
            plan.len(),
            self.db.db_type(),
            describe(from.as_ref())
        );
        for slug in &plan {
            self.run_script(slug, Direction::Up).await?;
        }

        self.record(from.as_ref(), Some(last)).await?;
        log::info!("Schema upgraded to {}", last);
        Ok(UpgradeReport {
            from,
            applied: plan,
        })
    }

    /// Revert the most recently applied migration.
    ///
    /// Returns `None` without touching the database when nothing is applied.
    /// The cursor is left unchanged if the downgrade script is missing or
    /// fails.
    pub async fn downgrade_one(&self) -> MigrateResult<Option<DowngradeStep>> {
        let Some(current) = self.current().await? else {
            log::info!("Nothing to downgrade");
            return Ok(None);
        };

        let previous = plan_downgrade(&self.catalog, &current)?;
        self.run_script(&current, Direction::Down).await?;
        self.record(Some(&current), previous.as_ref()).await?;

        log::info!(
            "Reverted {} (cursor: '{}')",
            current,
            describe(previous.as_ref())
        );
        Ok(Some(DowngradeStep {
            reverted: current,
            cursor: previous,
        }))
    }

    /// Revert migrations until nothing is applied.
    ///
    /// Stops at the first failing step; steps already taken stay recorded.
    pub async fn downgrade_all(&self) -> MigrateResult<Vec<DowngradeStep>> {
        let mut steps = Vec::new();
        while let Some(step) = self.downgrade_one().await? {
            steps.push(step);
        }
        Ok(steps)
    }

    async fn run_script(&self, slug: &Slug, direction: Direction) -> MigrateResult<()> {
        let script =
            self.catalog
                .script(slug, direction)
                .ok_or_else(|| MigrateError::MissingScript {
                    slug: slug.to_string(),
                    direction,
                })?;

        let file = direction.file_name(slug);
        log::debug!("Executing {}", file);
        self.db
            .execute_batch(script.sql())
            .await
            .map_err(|source| MigrateError::Execution {
                slug: slug.to_string(),
                direction,
                file,
                source,
            })
    }

    async fn record(&self, expected: Option<&Slug>, next: Option<&Slug>) -> MigrateResult<()> {
        let write_failed = |source| MigrateError::CursorWrite {
            cursor: describe(next),
            source,
        };

        if !self.guard_cursor {
            return self.cursor.write(next).await.map_err(write_failed);
        }

        if self.cursor.write_if(expected, next).await.map_err(write_failed)? {
            return Ok(());
        }

        let found = self.cursor.read().await?;
        log::warn!(
            "Cursor moved to '{}' while migrating from '{}'",
            describe(found.as_ref()),
            describe(expected)
        );
        Err(MigrateError::CursorConflict {
            expected: describe(expected),
            found: describe(found.as_ref()),
        })
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
