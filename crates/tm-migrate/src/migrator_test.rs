use super::*;
use async_trait::async_trait;
use std::sync::Mutex;
use tm_core::{CoreError, LoaderOptions, MemorySource, NamePattern};
use tm_db::{DbError, DbResult, DuckDbBackend};

/// DuckDB wrapper that records migration scripts and can fail on demand.
struct FlakyDb {
    inner: DuckDbBackend,
    fail_on: Option<&'static str>,
    fail_cursor_writes: bool,
    scripts: Mutex<Vec<String>>,
}

impl FlakyDb {
    fn new(fail_on: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            inner: DuckDbBackend::in_memory().unwrap(),
            fail_on,
            fail_cursor_writes: false,
            scripts: Mutex::new(Vec::new()),
        })
    }

    fn failing_cursor_writes() -> Arc<Self> {
        Arc::new(Self {
            inner: DuckDbBackend::in_memory().unwrap(),
            fail_on: None,
            fail_cursor_writes: true,
            scripts: Mutex::new(Vec::new()),
        })
    }

    fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Database for FlakyDb {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        if self.fail_cursor_writes && sql.starts_with("UPDATE") {
            return Err(DbError::ExecutionError("injected cursor failure".to_string()));
        }
        self.inner.execute(sql).await
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        if self.fail_on == Some(sql) {
            return Err(DbError::ExecutionError(format!("injected failure: {sql}")));
        }
        if !sql.contains("CREATE TABLE IF NOT EXISTS") {
            self.scripts.lock().unwrap().push(sql.to_string());
        }
        self.inner.execute_batch(sql).await
    }

    async fn query_optional_string(&self, sql: &str) -> DbResult<Option<String>> {
        self.inner.query_optional_string(sql).await
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.inner.relation_exists(name).await
    }

    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()> {
        self.inner.create_schema_if_not_exists(schema).await
    }

    fn db_type(&self) -> &'static str {
        "flaky"
    }
}

fn catalog() -> Catalog {
    let source = MemorySource::new()
        .with("001_init.sql", "CREATE TABLE t(id INT)")
        .with("001_init.down.sql", "DROP TABLE t")
        .with("002_add_col.sql", "ALTER TABLE t ADD c INT")
        .with("002_add_col.down.sql", "ALTER TABLE t DROP c")
        .with("003_index.sql", "CREATE INDEX t_c ON t(c)")
        .with("003_index.down.sql", "DROP INDEX t_c");
    Catalog::load_default(&source).unwrap()
}

#[tokio::test]
async fn test_upgrade_stops_at_first_failure() {
    let db = FlakyDb::new(Some("ALTER TABLE t ADD c INT"));
    let migrator = Migrator::new(db.clone(), catalog());

    let err = migrator.upgrade().await.unwrap_err();
    match &err {
        MigrateError::Execution {
            slug, direction, ..
        } => {
            assert_eq!(slug, "002_add_col");
            assert_eq!(*direction, Direction::Up);
        }
        other => panic!("expected Execution error, got {other:?}"),
    }
    assert!(err.to_string().contains("002_add_col.sql"));

    // 001 committed, 003 never attempted, cursor not advanced
    assert_eq!(db.scripts(), vec!["CREATE TABLE t(id INT)"]);
    assert!(db.relation_exists("t").await.unwrap());
    assert_eq!(migrator.current().await.unwrap(), None);
}

#[tokio::test]
async fn test_failed_downgrade_leaves_cursor() {
    let db = FlakyDb::new(Some("DROP INDEX t_c"));
    let migrator = Migrator::new(db.clone(), catalog());
    migrator.upgrade().await.unwrap();

    let err = migrator.downgrade_one().await.unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Execution { ref slug, direction: Direction::Down, .. } if slug == "003_index"
    ));
    assert_eq!(
        migrator.current().await.unwrap(),
        Some(Slug::new("003_index"))
    );
}

#[tokio::test]
async fn test_downgrade_all_stops_on_error() {
    let db = FlakyDb::new(Some("ALTER TABLE t DROP c"));
    let migrator = Migrator::new(db.clone(), catalog());
    migrator.upgrade().await.unwrap();

    assert!(migrator.downgrade_all().await.is_err());
    assert_eq!(
        migrator.current().await.unwrap(),
        Some(Slug::new("002_add_col"))
    );
}

#[tokio::test]
async fn test_downgrade_unknown_cursor_is_missing_script() {
    let db = FlakyDb::new(None);
    let migrator = Migrator::new(db.clone(), catalog());
    migrator.current().await.unwrap();
    migrator
        .cursor_store()
        .write(Some(&Slug::new("009_gone")))
        .await
        .unwrap();

    let err = migrator.downgrade_one().await.unwrap_err();
    assert!(matches!(
        err,
        MigrateError::MissingScript { ref slug, direction: Direction::Down } if slug == "009_gone"
    ));
    assert_eq!(
        migrator.current().await.unwrap(),
        Some(Slug::new("009_gone"))
    );
    assert!(db.scripts().is_empty());
}

#[tokio::test]
async fn test_invalid_version_aborts_before_execution() {
    let source = MemorySource::new()
        .with("001_init.sql", "CREATE TABLE t(id INT)")
        .with("001_init.down.sql", "DROP TABLE t")
        .with("abc_init.sql", "CREATE TABLE u(id INT)")
        .with("abc_init.down.sql", "DROP TABLE u");
    let options = LoaderOptions {
        name_pattern: NamePattern::new(r".*\.sql$").unwrap(),
    };
    let db = FlakyDb::new(None);
    let migrator = Migrator::new(db.clone(), Catalog::load(&source, &options).unwrap());

    let err = migrator.upgrade().await.unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Core(CoreError::InvalidVersion { ref slug, .. }) if slug == "abc_init"
    ));
    assert!(db.scripts().is_empty());
}

#[tokio::test]
async fn test_guarded_write_detects_conflict() {
    let db = FlakyDb::new(None);
    let migrator = Migrator::new(db.clone(), catalog()).guard_cursor(true);
    let other = TableCursorStore::new(db.clone(), DEFAULT_CURSOR_TABLE);
    migrator.upgrade().await.unwrap();

    // A second runner moves the cursor between our read and our write
    other.write(Some(&Slug::new("002_add_col"))).await.unwrap();
    let conflict = migrator.record(Some(&Slug::new("003_index")), None).await;

    match conflict {
        Err(MigrateError::CursorConflict { expected, found }) => {
            assert_eq!(expected, "003_index");
            assert_eq!(found, "002_add_col");
        }
        other => panic!("expected CursorConflict, got {other:?}"),
    }
    assert_eq!(
        migrator.current().await.unwrap(),
        Some(Slug::new("002_add_col"))
    );
}

#[tokio::test]
async fn test_unguarded_write_overwrites() {
    let db = FlakyDb::new(None);
    let migrator = Migrator::new(db.clone(), catalog());
    migrator.upgrade().await.unwrap();

    migrator
        .record(Some(&Slug::new("001_init")), Some(&Slug::new("002_add_col")))
        .await
        .unwrap();
    assert_eq!(
        migrator.current().await.unwrap(),
        Some(Slug::new("002_add_col"))
    );
}

#[tokio::test]
async fn test_guarded_upgrade_succeeds_single_runner() {
    let db = FlakyDb::new(None);
    let migrator = Migrator::new(db.clone(), catalog()).guard_cursor(true);
    let report = migrator.upgrade().await.unwrap();
    assert_eq!(report.cursor(), Some(&Slug::new("003_index")));
    assert_eq!(migrator.downgrade_all().await.unwrap().len(), 3);
    assert_eq!(migrator.current().await.unwrap(), None);
}

#[tokio::test]
async fn test_from_config_uses_cursor_table() {
    let config: tm_core::Config =
        load_config("migrations:\n  cursor_table: meta.cursor\n  guard_cursor: true\n");
    let db = FlakyDb::new(None);
    let migrator = Migrator::from_config(db.clone(), catalog(), &config.migrations);

    migrator.upgrade().await.unwrap();
    assert_eq!(migrator.cursor_store().table(), "meta.cursor");
    assert!(db.relation_exists("meta.cursor").await.unwrap());
    assert!(!db.relation_exists("migrations").await.unwrap());
}

#[tokio::test]
async fn test_cursor_write_failure_is_reported_after_scripts_ran() {
    let db = FlakyDb::failing_cursor_writes();
    let migrator = Migrator::new(db.clone(), catalog());

    let err = migrator.upgrade().await.unwrap_err();
    match &err {
        MigrateError::CursorWrite { cursor, source } => {
            assert_eq!(cursor, "003_index");
            assert!(matches!(source, DbError::ExecutionError(_)));
        }
        other => panic!("expected CursorWrite, got {other:?}"),
    }
    assert!(err.to_string().starts_with("[X004]"));
    assert_eq!(db.scripts().len(), 3);
    assert_eq!(migrator.current().await.unwrap(), None);
}

#[tokio::test]
async fn test_guarded_cursor_write_failure_is_reported() {
    let db = FlakyDb::failing_cursor_writes();
    let migrator = Migrator::new(db.clone(), catalog()).guard_cursor(true);

    let err = migrator.upgrade().await.unwrap_err();
    assert!(matches!(err, MigrateError::CursorWrite { ref cursor, .. } if cursor == "003_index"));
}

#[tokio::test]
async fn test_preview_does_not_create_cursor_table() {
    let db = FlakyDb::new(None);
    let migrator = Migrator::new(db.clone(), catalog());

    let status = migrator.preview().await.unwrap();
    assert_eq!(status.current, None);
    assert_eq!(status.pending.len(), 3);
    assert!(!db.relation_exists(DEFAULT_CURSOR_TABLE).await.unwrap());

    migrator.upgrade().await.unwrap();
    migrator.downgrade_one().await.unwrap();
    assert_eq!(
        migrator.preview().await.unwrap(),
        migrator.status().await.unwrap()
    );
}

fn load_config(yaml: &str) -> tm_core::Config {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tidemark.yml");
    std::fs::write(&path, yaml).unwrap();
    tm_core::Config::load(&path).unwrap()
}
