//! Integration tests loading bundled and on-disk migration sets.

use rust_embed::RustEmbed;
use std::path::Path;
use tm_core::{
    plan_downgrade, plan_upgrade, Catalog, DirSource, Direction, EmbeddedSource, Slug,
    StaticSource,
};

#[derive(RustEmbed)]
#[folder = "tests/fixtures/migrations"]
struct FixtureMigrations;

static BUNDLED: &[(&str, &str)] = &[
    ("001_init.sql", include_str!("fixtures/migrations/001_init.sql")),
    ("001_init.down.sql", include_str!("fixtures/migrations/001_init.down.sql")),
    ("002_add_col.sql", include_str!("fixtures/migrations/002_add_col.sql")),
    ("002_add_col.down.sql", include_str!("fixtures/migrations/002_add_col.down.sql")),
];

fn assert_fixture_catalog(catalog: &Catalog) {
    let slugs: Vec<&str> = catalog.slugs().map(|s| s.as_str()).collect();
    assert_eq!(slugs, vec!["001_init", "002_add_col"]);
    assert_eq!(
        catalog.script("001_init", Direction::Down).unwrap().sql().trim(),
        "DROP TABLE t;"
    );
}

#[test]
fn test_embedded_source_loads_fixture_dir() {
    let catalog = Catalog::load_default(&EmbeddedSource::<FixtureMigrations>::new()).unwrap();
    assert_fixture_catalog(&catalog);
}

#[test]
fn test_static_source_loads_bundled_scripts() {
    let catalog = Catalog::load_default(&StaticSource::new(BUNDLED)).unwrap();
    assert_fixture_catalog(&catalog);
}

#[test]
fn test_dir_source_loads_fixture_dir() {
    let source = DirSource::new(Path::new("tests/fixtures/migrations"));
    let catalog = Catalog::load_default(&source).unwrap();
    assert_fixture_catalog(&catalog);
}

#[test]
fn test_fixture_plans() {
    let catalog = Catalog::load_default(&StaticSource::new(BUNDLED)).unwrap();
    let plan = plan_upgrade(&catalog, None).unwrap();
    assert_eq!(plan, vec!["001_init", "002_add_col"]);

    let prev = plan_downgrade(&catalog, &Slug::new("002_add_col")).unwrap();
    assert_eq!(prev, Some(Slug::new("001_init")));
}
