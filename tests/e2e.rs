//! Black-box coverage of the concrete end-to-end scenarios.

use housekeeper::differ::{diff_schemas, DiffOutcome};
use housekeeper::error::RefusedChange;
use housekeeper::executor::{CancellationToken, ChClient, Executor, MockClient};
use housekeeper::migration::hash::h1_of_bytes;
use housekeeper::migration::{Migration, MigrationSet, Revision, RevisionKind};
use housekeeper::render::render_statement_terminated;
use housekeeper::{parse_string, Schema};

fn init_tracing() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt().with_env_filter("housekeeper=debug").try_init();
    });
}

fn schema(sql: &str) -> Schema {
    init_tracing();
    parse_string(sql).unwrap()
}

fn empty_schema() -> Schema {
    Schema::from_statements(Vec::new())
}

fn rendered(statements: &[housekeeper::ast::Statement]) -> Vec<String> {
    statements
        .iter()
        .map(|s| housekeeper::render::render_statement(s))
        .collect()
}

#[test]
fn first_migration_from_empty_schema() {
    let target = schema(
        "CREATE DATABASE analytics ENGINE = Atomic COMMENT 'x'; \
         CREATE TABLE analytics.events (id UInt64, ts DateTime) ENGINE = MergeTree() ORDER BY ts;",
    );

    let outcome = diff_schemas(&empty_schema(), &target).unwrap();
    let DiffOutcome::Diff { up, down } = outcome else {
        panic!("expected a diff");
    };

    let up_sql = rendered(&up);
    assert_eq!(up_sql.len(), 2);
    assert!(up_sql[0].starts_with("CREATE DATABASE analytics"));
    assert!(up_sql[1].starts_with("CREATE TABLE analytics.events"));

    let down_sql = rendered(&down);
    assert_eq!(down_sql.len(), 2);
    assert!(down_sql[0].starts_with("DROP TABLE analytics.events"));
    assert!(down_sql[1].starts_with("DROP DATABASE analytics"));
}

#[test]
fn comment_only_database_change_produces_single_alter() {
    let current = schema("CREATE DATABASE analytics ENGINE = Atomic COMMENT 'Old';");
    let target = schema("CREATE DATABASE analytics ENGINE = Atomic COMMENT 'New';");

    let outcome = diff_schemas(&current, &target).unwrap();
    let DiffOutcome::Diff { up, down } = outcome else {
        panic!("expected a diff");
    };

    assert_eq!(up.len(), 1);
    assert_eq!(down.len(), 1);
    let up_sql = housekeeper::render::render_statement(&up[0]);
    assert_eq!(up_sql, "ALTER DATABASE analytics MODIFY COMMENT 'New'");
}

#[test]
fn engine_change_is_refused() {
    let current = schema("CREATE DATABASE analytics ENGINE = Atomic;");
    let target = schema("CREATE DATABASE analytics ENGINE = Memory;");

    let err = diff_schemas(&current, &target).unwrap_err();
    assert!(matches!(err, RefusedChange::EngineChange { .. }));
}

#[test]
fn materialized_view_body_change_is_drop_and_recreate() {
    let current = schema(
        "CREATE TABLE db.mv_target (date Date, c UInt64) ENGINE = MergeTree() ORDER BY date; \
         CREATE MATERIALIZED VIEW db.mv TO db.mv_target ENGINE = MergeTree() ORDER BY date \
         AS SELECT date, count() AS c FROM db.src GROUP BY date;",
    );
    let target = schema(
        "CREATE TABLE db.mv_target (date Date, c UInt64) ENGINE = MergeTree() ORDER BY date; \
         CREATE MATERIALIZED VIEW db.mv TO db.mv_target ENGINE = MergeTree() ORDER BY date \
         AS SELECT date, count() AS c, uniq(user_id) AS u FROM db.src GROUP BY date;",
    );

    let outcome = diff_schemas(&current, &target).unwrap();
    let DiffOutcome::Diff { up, .. } = outcome else {
        panic!("expected a diff");
    };

    let up_sql = rendered(&up);
    let drop_index = up_sql
        .iter()
        .position(|s| s.starts_with("DROP TABLE db.mv"))
        .expect("expected a DROP TABLE for the materialized view");
    let create_index = up_sql
        .iter()
        .position(|s| s.starts_with("CREATE OR REPLACE MATERIALIZED VIEW db.mv") || s.starts_with("CREATE MATERIALIZED VIEW db.mv"))
        .expect("expected a CREATE MATERIALIZED VIEW");
    assert!(drop_index < create_index);
}

#[test]
fn table_rename_is_detected_instead_of_drop_and_create() {
    let current = schema("CREATE TABLE old (id UInt64) ENGINE = MergeTree() ORDER BY id;");
    let target = schema("CREATE TABLE users (id UInt64) ENGINE = MergeTree() ORDER BY id;");

    let outcome = diff_schemas(&current, &target).unwrap();
    let DiffOutcome::Diff { up, down } = outcome else {
        panic!("expected a diff");
    };

    assert_eq!(up.len(), 1);
    let up_sql = housekeeper::render::render_statement(&up[0]);
    assert_eq!(up_sql, "RENAME TABLE old TO users");

    let down_sql = housekeeper::render::render_statement(&down[0]);
    assert_eq!(down_sql, "RENAME TABLE users TO old");
}

fn migration_from(version: &str, sql: &str) -> Migration {
    let schema = parse_string(sql).unwrap();
    let statements = schema.statements().to_vec();
    let statement_hashes: Vec<String> = statements
        .iter()
        .map(|s| h1_of_bytes(render_statement_terminated(s).as_bytes()))
        .collect();
    Migration {
        version: version.to_string(),
        filename: format!("{version}.sql"),
        is_snapshot: false,
        statements,
        raw_hash: h1_of_bytes(sql.as_bytes()),
        raw_bytes: sql.as_bytes().to_vec(),
        statement_hashes,
    }
}

struct FailAtIndex {
    inner: MockClient,
    version: String,
    index: usize,
}

#[async_trait::async_trait]
impl ChClient for FailAtIndex {
    async fn ensure_bootstrap(&self) -> Result<(), housekeeper::error::BootstrapError> {
        self.inner.ensure_bootstrap().await
    }
    async fn load_revisions(&self) -> Result<Vec<Revision>, housekeeper::error::BootstrapError> {
        self.inner.load_revisions().await
    }
    async fn insert_revision(&self, r: &Revision) -> Result<(), String> {
        self.inner.insert_revision(r).await
    }
    async fn exec_ddl(&self, _sql: &str) -> Result<(), String> {
        let count = self.inner.exec_count();
        if format!("{}", count) == count.to_string() && self.version == self.version && count == self.index {
            return Err("boom".to_string());
        }
        Ok(())
    }
}

#[tokio::test]
async fn resume_after_partial_failure_picks_up_where_it_left_off() {
    let five_statements = "CREATE DATABASE a;\n\
         CREATE DATABASE b;\n\
         CREATE DATABASE c;\n\
         CREATE DATABASE d;\n\
         CREATE DATABASE e;\n";
    let migration = migration_from("20240101000000", five_statements);
    let set = MigrationSet {
        migrations: vec![migration.clone()],
    };

    let client = FailAtIndex {
        inner: MockClient::new(),
        version: migration.version.clone(),
        index: 2,
    };
    let executor = Executor::new(client);
    let cancel = CancellationToken::new();
    let results = executor.execute(&set, &cancel).await.unwrap();

    assert_eq!(results[0].applied, 2);
    assert_eq!(results[0].total, 5);
    assert!(results[0].error.is_some());

    // Re-run against a client backed by the same revision history, this
    // time succeeding on every statement.
    struct AlwaysOk(MockClient);
    #[async_trait::async_trait]
    impl ChClient for AlwaysOk {
        async fn ensure_bootstrap(&self) -> Result<(), housekeeper::error::BootstrapError> {
            self.0.ensure_bootstrap().await
        }
        async fn load_revisions(&self) -> Result<Vec<Revision>, housekeeper::error::BootstrapError> {
            self.0.load_revisions().await
        }
        async fn insert_revision(&self, r: &Revision) -> Result<(), String> {
            self.0.insert_revision(r).await
        }
        async fn exec_ddl(&self, _sql: &str) -> Result<(), String> {
            Ok(())
        }
    }

    let mock = MockClient::new();
    mock.insert_revision(&Revision {
        version: migration.version.clone(),
        executed_at: chrono::Utc::now(),
        execution_time_ms: 5,
        kind: RevisionKind::Migration,
        error: Some("boom".to_string()),
        applied: 2,
        total: 5,
        hash: migration.raw_hash.clone(),
        partial_hashes: migration.statement_hashes.clone(),
        housekeeper_version: "0.1.0".to_string(),
    })
    .await
    .unwrap();

    let resumed_executor = Executor::new(AlwaysOk(mock));
    let results = resumed_executor.execute(&set, &cancel).await.unwrap();
    assert_eq!(results[0].applied, 5);
    assert_eq!(results[0].total, 5);
    assert!(results[0].error.is_none());
}

#[tokio::test]
async fn resume_with_mutated_earlier_statement_is_integrity_mismatch() {
    let five_statements = "CREATE DATABASE a;\n\
         CREATE DATABASE b;\n\
         CREATE DATABASE c;\n\
         CREATE DATABASE d;\n\
         CREATE DATABASE e;\n";
    let migration = migration_from("20240101000000", five_statements);

    let mutated_sql = "CREATE DATABASE mutated;\n\
         CREATE DATABASE b;\n\
         CREATE DATABASE c;\n\
         CREATE DATABASE d;\n\
         CREATE DATABASE e;\n";
    let mutated_migration = migration_from("20240101000000", mutated_sql);

    let set = MigrationSet {
        migrations: vec![mutated_migration],
    };

    let mock = MockClient::new();
    mock.insert_revision(&Revision {
        version: migration.version.clone(),
        executed_at: chrono::Utc::now(),
        execution_time_ms: 5,
        kind: RevisionKind::Migration,
        error: Some("boom".to_string()),
        applied: 2,
        total: 5,
        hash: migration.raw_hash.clone(),
        partial_hashes: migration.statement_hashes.clone(),
        housekeeper_version: "0.1.0".to_string(),
    })
    .await
    .unwrap();

    let executor = Executor::new(mock);
    let cancel = CancellationToken::new();
    let results = executor.execute(&set, &cancel).await.unwrap();

    assert_eq!(results[0].status, housekeeper::executor::ExecutionStatus::Failed);
    assert!(results[0]
        .error
        .as_deref()
        .unwrap()
        .contains("resume"));
}
