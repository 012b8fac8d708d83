//! Migration planning over a catalog and the current cursor.
//!
//! History is linear: the cursor is a high-water mark, not a set of applied
//! versions. Anything at or below the cursor's version counts as applied,
//! anything above it as pending.

use crate::catalog::Catalog;
use crate::error::CoreResult;
use crate::slug::Slug;
use serde::Serialize;

/// Applied and pending slugs relative to a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStatus {
    pub current: Option<Slug>,
    pub applied: Vec<Slug>,
    pub pending: Vec<Slug>,
}

/// Version of the cursor, `None` when nothing has been applied.
fn cursor_version(cursor: Option<&Slug>) -> CoreResult<Option<u64>> {
    cursor.map(Slug::version).transpose()
}

/// Upgrade slugs whose version is strictly above the cursor's, in
/// lexicographic (and therefore version) order.
///
/// An empty result means the schema is current.
pub fn plan_upgrade(catalog: &Catalog, cursor: Option<&Slug>) -> CoreResult<Vec<Slug>> {
    let current = cursor_version(cursor)?;

    let mut pending = Vec::new();
    for slug in catalog.slugs() {
        let version = slug.version()?;
        if current.map_or(true, |c| version > c) {
            pending.push(slug.clone());
        }
    }
    pending.sort();
    Ok(pending)
}

/// The slug to rewind the cursor to after reverting `cursor`.
///
/// Returns the slug with the greatest version strictly below the cursor's,
/// or `None` when reverting `cursor` returns the schema to its initial state.
/// Among slugs sharing that version the lexicographically last wins, since it
/// was the last one applied.
pub fn plan_downgrade(catalog: &Catalog, cursor: &Slug) -> CoreResult<Option<Slug>> {
    let current = cursor.version()?;

    let mut best: Option<(u64, &Slug)> = None;
    for slug in catalog.slugs() {
        let version = slug.version()?;
        if version < current && best.map_or(true, |(v, _)| version >= v) {
            best = Some((version, slug));
        }
    }
    Ok(best.map(|(_, slug)| slug.clone()))
}

/// Split the catalog into applied and pending slugs.
pub fn plan_status(catalog: &Catalog, cursor: Option<&Slug>) -> CoreResult<PlanStatus> {
    let pending = plan_upgrade(catalog, cursor)?;
    let applied = catalog
        .slugs()
        .filter(|slug| !pending.contains(slug))
        .cloned()
        .collect();
    Ok(PlanStatus {
        current: cursor.cloned(),
        applied,
        pending,
    })
}

#[cfg(test)]
#[path = "planner_test.rs"]
mod tests;
