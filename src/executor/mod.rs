//! Applying a pending migration set to ClickHouse, with revision
//! bookkeeping and partial-resume (spec.md §4.5).

pub mod client;

pub use client::{ChClient, ClickHouseExecClient, MockClient};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{BootstrapError, IntegrityMismatch};
use crate::migration::{
    is_completed, Migration, MigrationSet, Revision, RevisionKind, RevisionSet,
};
use crate::render::render_statement_terminated;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failed,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub version: String,
    pub status: ExecutionStatus,
    pub error: Option<String>,
    pub execution_time_ms: u64,
    pub applied: u32,
    pub total: u32,
    pub revision_written: bool,
}

/// Cooperative cancellation handle (spec.md §5 "Cancellation"). The
/// executor checks it between statements and before starting the next
/// migration; nothing in flight is aborted.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Executor<C: ChClient> {
    client: C,
}

impl<C: ChClient> Executor<C> {
    pub fn new(client: C) -> Self {
        Executor { client }
    }

    /// Applies every pending migration in `set` in order (spec.md §4.5).
    /// Stops at the first Failed result or when `cancel` is observed.
    #[tracing::instrument(level = "info", skip_all, fields(count = set.migrations.len()))]
    pub async fn execute(
        &self,
        set: &MigrationSet,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExecutionResult>, BootstrapError> {
        self.client.ensure_bootstrap().await?;
        let rows = self.client.load_revisions().await?;
        let revisions = RevisionSet::from_rows(rows);

        let mut results = Vec::with_capacity(set.migrations.len());

        for migration in &set.migrations {
            if cancel.is_cancelled() {
                tracing::warn!(version = %migration.version, "cancellation observed before migration started");
                break;
            }

            let result = self.execute_one(migration, revisions.get(&migration.version), cancel).await;
            let stop = result.status == ExecutionStatus::Failed;
            results.push(result);
            if stop {
                break;
            }
        }

        Ok(results)
    }

    async fn execute_one(
        &self,
        migration: &Migration,
        existing: Option<&Revision>,
        cancel: &CancellationToken,
    ) -> ExecutionResult {
        let total = migration.total() as u32;

        if is_completed(migration, existing) {
            tracing::debug!(version = %migration.version, "migration already completed, skipping");
            return ExecutionResult {
                version: migration.version.clone(),
                status: ExecutionStatus::Skipped,
                error: None,
                execution_time_ms: 0,
                applied: total,
                total,
                revision_written: false,
            };
        }

        let start_index = match existing {
            Some(r) if r.applied < r.total && r.error.is_some() => {
                match self.validate_resume(migration, r) {
                    Ok(()) => r.applied as usize,
                    Err(mismatch) => {
                        tracing::error!(version = %migration.version, error = %mismatch, "resume hash validation failed");
                        return ExecutionResult {
                            version: migration.version.clone(),
                            status: ExecutionStatus::Failed,
                            error: Some(mismatch.to_string()),
                            execution_time_ms: 0,
                            applied: r.applied,
                            total,
                            revision_written: false,
                        };
                    }
                }
            }
            _ => 0,
        };

        if migration.is_snapshot {
            let revision = Revision {
                version: migration.version.clone(),
                executed_at: chrono::Utc::now(),
                execution_time_ms: 0,
                kind: RevisionKind::Snapshot,
                error: None,
                applied: total,
                total,
                hash: migration.raw_hash.clone(),
                partial_hashes: migration.statement_hashes.clone(),
                housekeeper_version: crate::HousekeeperVersion::current().to_string(),
            };
            let revision_written = self.client.insert_revision(&revision).await.is_ok();
            tracing::info!(version = %migration.version, "recorded snapshot revision without executing DDL");
            return ExecutionResult {
                version: migration.version.clone(),
                status: ExecutionStatus::Success,
                error: None,
                execution_time_ms: 0,
                applied: total,
                total,
                revision_written,
            };
        }

        let start = Instant::now();
        let mut applied = start_index as u32;
        let mut error: Option<String> = None;
        let mut cancelled = false;

        for (index, statement) in migration.statements.iter().enumerate().skip(start_index) {
            if cancel.is_cancelled() {
                cancelled = true;
                error = Some("cancelled".to_string());
                break;
            }

            if statement.is_comment_only() {
                applied = (index + 1) as u32;
                continue;
            }

            let sql = render_statement_terminated(statement);
            match self.client.exec_ddl(&sql).await {
                Ok(()) => {
                    applied = (index + 1) as u32;
                }
                Err(message) => {
                    tracing::error!(version = %migration.version, statement_index = index, %message, "statement execution failed");
                    error = Some(message);
                    break;
                }
            }
        }

        let execution_time_ms = start.elapsed().as_millis() as u64;
        let status = if cancelled {
            ExecutionStatus::Failed
        } else if error.is_some() {
            ExecutionStatus::Failed
        } else {
            ExecutionStatus::Success
        };

        let revision = Revision {
            version: migration.version.clone(),
            executed_at: chrono::Utc::now(),
            execution_time_ms,
            kind: RevisionKind::Migration,
            error: error.clone(),
            applied,
            total,
            hash: migration.raw_hash.clone(),
            partial_hashes: migration.statement_hashes.clone(),
            housekeeper_version: crate::HousekeeperVersion::current().to_string(),
        };
        let revision_written = self.client.insert_revision(&revision).await.is_ok();

        ExecutionResult {
            version: migration.version.clone(),
            status,
            error,
            execution_time_ms,
            applied,
            total,
            revision_written,
        }
    }

    /// Every `statementHash[i]` for `i < applied` must equal
    /// `revision.partialHashes[i]` (spec.md §4.5 "validate resume").
    /// `partial_hashes` is stored at full migration length (spec.md §8
    /// scenario 6), so only the indices already applied are checked here.
    fn validate_resume(&self, migration: &Migration, revision: &Revision) -> Result<(), IntegrityMismatch> {
        for index in 0..revision.applied as usize {
            let expected = &revision.partial_hashes[index];
            match migration.statement_hashes.get(index) {
                Some(actual) if actual == expected => {}
                _ => {
                    return Err(IntegrityMismatch::ResumeHash {
                        version: migration.version.clone(),
                        index,
                    })
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_string;

    fn migration_from(version: &str, sql: &str, is_snapshot: bool) -> Migration {
        let schema = parse_string(sql).unwrap();
        let statements = schema.statements().to_vec();
        let statement_hashes: Vec<String> = statements
            .iter()
            .map(|s| crate::migration::hash::h1_of_bytes(render_statement_terminated(s).as_bytes()))
            .collect();
        Migration {
            version: version.to_string(),
            filename: format!("{version}.sql"),
            is_snapshot,
            statements,
            raw_hash: crate::migration::hash::h1_of_bytes(sql.as_bytes()),
            raw_bytes: sql.as_bytes().to_vec(),
            statement_hashes,
        }
    }

    #[tokio::test]
    async fn runs_all_statements_and_records_success() {
        let client = MockClient::new();
        // override exec_ddl to succeed by using a thin wrapper below
        let set = MigrationSet {
            migrations: vec![migration_from(
                "20240101000000",
                "CREATE DATABASE a;\n",
                false,
            )],
        };

        // MockClient::exec_ddl always errs in the base impl (used to test
        // failure paths); wrap it with a variant that succeeds.
        struct AlwaysOk(MockClient);
        #[async_trait::async_trait]
        impl ChClient for AlwaysOk {
            async fn ensure_bootstrap(&self) -> Result<(), BootstrapError> {
                self.0.ensure_bootstrap().await
            }
            async fn load_revisions(&self) -> Result<Vec<Revision>, BootstrapError> {
                self.0.load_revisions().await
            }
            async fn insert_revision(&self, r: &Revision) -> Result<(), String> {
                self.0.insert_revision(r).await
            }
            async fn exec_ddl(&self, _sql: &str) -> Result<(), String> {
                Ok(())
            }
        }

        let executor = Executor::new(AlwaysOk(client));
        let cancel = CancellationToken::new();
        let results = executor.execute(&set, &cancel).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ExecutionStatus::Success);
        assert_eq!(results[0].applied, 1);
        assert_eq!(results[0].total, 1);
    }

    #[tokio::test]
    async fn stops_at_first_failure_and_records_partial_revision() {
        let client = MockClient::new();
        let set = MigrationSet {
            migrations: vec![migration_from(
                "20240101000000",
                "CREATE DATABASE a;\nCREATE DATABASE b;\n",
                false,
            )],
        };

        let executor = Executor::new(client);
        let cancel = CancellationToken::new();
        let results = executor.execute(&set, &cancel).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ExecutionStatus::Failed);
        assert_eq!(results[0].applied, 0);
        assert_eq!(results[0].total, 2);
    }

    #[tokio::test]
    async fn snapshot_records_revision_without_executing_ddl() {
        let client = MockClient::new();
        let sql = "-- housekeeper:snapshot\n-- description: consolidated\nCREATE DATABASE a;\n";
        let set = MigrationSet {
            migrations: vec![migration_from("20240101000000", sql, true)],
        };

        let executor = Executor::new(client);
        let cancel = CancellationToken::new();
        let results = executor.execute(&set, &cancel).await.unwrap();

        assert_eq!(results[0].status, ExecutionStatus::Success);
        assert_eq!(executor.client.exec_count(), 0);
    }

    #[tokio::test]
    async fn already_completed_migration_is_skipped() {
        let client = MockClient::new();
        let migration = migration_from("20240101000000", "CREATE DATABASE a;\n", false);
        client
            .insert_revision(&Revision {
                version: migration.version.clone(),
                executed_at: chrono::Utc::now(),
                execution_time_ms: 5,
                kind: RevisionKind::Migration,
                error: None,
                applied: 1,
                total: 1,
                hash: migration.raw_hash.clone(),
                partial_hashes: migration.statement_hashes.clone(),
                housekeeper_version: "0.1.0".to_string(),
            })
            .await
            .unwrap();

        let set = MigrationSet {
            migrations: vec![migration],
        };
        let executor = Executor::new(client);
        let cancel = CancellationToken::new();
        let results = executor.execute(&set, &cancel).await.unwrap();

        assert_eq!(results[0].status, ExecutionStatus::Skipped);
    }
}
