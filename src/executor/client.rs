//! The narrow ClickHouse client contract the executor depends on
//! (spec.md §4.6): `Query`/`Exec` specialised to what the executor
//! actually needs — running arbitrary DDL, and reading/writing the
//! `housekeeper.revisions` table. Connection pooling, auth, and cluster
//! routing live behind the real implementation; the executor never sees
//! them (spec.md §9 "Global mutable state": the only process-wide state
//! is the connection, passed in explicitly).

use async_trait::async_trait;

use crate::config::ClickHouseConfig;
use crate::error::BootstrapError;
use crate::migration::{Revision, RevisionKind};

#[async_trait]
pub trait ChClient: Send + Sync {
    /// Ensures `housekeeper` and `housekeeper.revisions` exist. Must be
    /// idempotent and never fail because they already exist (spec.md
    /// §4.5 step 1, §9 "Coroutine/async-style control flow in bootstrap").
    async fn ensure_bootstrap(&self) -> Result<(), BootstrapError>;

    /// Loads every row currently in `housekeeper.revisions`.
    async fn load_revisions(&self) -> Result<Vec<Revision>, BootstrapError>;

    /// Appends one revision row. Revisions are append-only (spec.md §5);
    /// this never updates or deletes an existing row.
    async fn insert_revision(&self, revision: &Revision) -> Result<(), String>;

    /// Executes one rendered DDL statement.
    async fn exec_ddl(&self, sql: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct RevisionRow {
    version: String,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    executed_at: time::OffsetDateTime,
    execution_time_ms: u64,
    kind: String,
    error: Option<String>,
    applied: u32,
    total: u32,
    hash: String,
    partial_hashes: Vec<String>,
    housekeeper_version: String,
}

fn to_offset_datetime(dt: chrono::DateTime<chrono::Utc>) -> time::OffsetDateTime {
    time::OffsetDateTime::from_unix_timestamp_nanos(dt.timestamp_nanos_opt().unwrap_or(0) as i128)
        .unwrap_or(time::OffsetDateTime::UNIX_EPOCH)
}

fn to_chrono(dt: time::OffsetDateTime) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp_nanos(dt.unix_timestamp_nanos() as i64)
}

impl From<&Revision> for RevisionRow {
    fn from(r: &Revision) -> Self {
        RevisionRow {
            version: r.version.clone(),
            executed_at: to_offset_datetime(r.executed_at),
            execution_time_ms: r.execution_time_ms,
            kind: r.kind.as_str().to_string(),
            error: r.error.clone(),
            applied: r.applied,
            total: r.total,
            hash: r.hash.clone(),
            partial_hashes: r.partial_hashes.clone(),
            housekeeper_version: r.housekeeper_version.clone(),
        }
    }
}

impl TryFrom<RevisionRow> for Revision {
    type Error = BootstrapError;

    fn try_from(row: RevisionRow) -> Result<Self, BootstrapError> {
        let kind = RevisionKind::from_str(&row.kind).ok_or_else(|| BootstrapError {
            reason: format!("unknown revision kind '{}'", row.kind),
        })?;
        Ok(Revision {
            version: row.version,
            executed_at: to_chrono(row.executed_at),
            execution_time_ms: row.execution_time_ms,
            kind,
            error: row.error,
            applied: row.applied,
            total: row.total,
            hash: row.hash,
            partial_hashes: row.partial_hashes,
            housekeeper_version: row.housekeeper_version,
        })
    }
}

/// `ChClient` backed by a real ClickHouse server, via the `clickhouse`
/// crate's HTTP client.
pub struct ClickHouseExecClient {
    client: clickhouse::Client,
}

const CREATE_REVISIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS housekeeper.revisions (
    version String,
    executed_at DateTime64(3, 'UTC'),
    execution_time_ms UInt64,
    kind String,
    error Nullable(String),
    applied UInt32,
    total UInt32,
    hash String,
    partial_hashes Array(String),
    housekeeper_version String
) ENGINE = MergeTree ORDER BY version PARTITION BY toYYYYMM(executed_at)
"#;

impl ClickHouseExecClient {
    pub fn new(config: &ClickHouseConfig) -> Self {
        let mut client = clickhouse::Client::default()
            .with_url(config.url())
            .with_user(&config.user)
            .with_password(&config.password)
            .with_database(&config.database);
        if config.use_tls {
            client = client.with_option("verify", "1");
        }
        ClickHouseExecClient { client }
    }
}

#[async_trait]
impl ChClient for ClickHouseExecClient {
    async fn ensure_bootstrap(&self) -> Result<(), BootstrapError> {
        self.client
            .query("CREATE DATABASE IF NOT EXISTS housekeeper")
            .execute()
            .await
            .map_err(|e| BootstrapError {
                reason: format!("creating housekeeper database: {e}"),
            })?;
        self.client
            .query(CREATE_REVISIONS_TABLE)
            .execute()
            .await
            .map_err(|e| BootstrapError {
                reason: format!("creating housekeeper.revisions: {e}"),
            })?;
        Ok(())
    }

    async fn load_revisions(&self) -> Result<Vec<Revision>, BootstrapError> {
        let rows: Vec<RevisionRow> = self
            .client
            .query("SELECT ?fields FROM housekeeper.revisions")
            .fetch_all()
            .await
            .map_err(|e| BootstrapError {
                reason: format!("reading housekeeper.revisions: {e}"),
            })?;
        rows.into_iter().map(Revision::try_from).collect()
    }

    async fn insert_revision(&self, revision: &Revision) -> Result<(), String> {
        let mut insert = self
            .client
            .insert("housekeeper.revisions")
            .map_err(|e| e.to_string())?;
        insert
            .write(&RevisionRow::from(revision))
            .await
            .map_err(|e| e.to_string())?;
        insert.end().await.map_err(|e| e.to_string())
    }

    async fn exec_ddl(&self, sql: &str) -> Result<(), String> {
        self.client
            .query(sql)
            .execute()
            .await
            .map_err(|e| e.to_string())
    }
}

/// In-memory [`ChClient`] for executor tests (spec.md §8 scenario 6:
/// "stub Exec to fail at statement 3"). Not behind `#[cfg(test)]` so
/// integration tests in `tests/` can use it too.
pub struct MockClient {
    revisions: tokio::sync::Mutex<Vec<Revision>>,
    /// `(version, 0-based statement index)` pairs that fail when executed.
    pub fail_at: std::collections::HashSet<(String, usize)>,
    exec_count: std::sync::atomic::AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        MockClient {
            revisions: tokio::sync::Mutex::new(Vec::new()),
            fail_at: std::collections::HashSet::new(),
            exec_count: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn with_failure(mut self, version: impl Into<String>, index: usize) -> Self {
        self.fail_at.insert((version.into(), index));
        self
    }

    pub async fn revisions_snapshot(&self) -> Vec<Revision> {
        self.revisions.lock().await.clone()
    }

    pub fn exec_count(&self) -> usize {
        self.exec_count.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChClient for MockClient {
    async fn ensure_bootstrap(&self) -> Result<(), BootstrapError> {
        Ok(())
    }

    async fn load_revisions(&self) -> Result<Vec<Revision>, BootstrapError> {
        Ok(self.revisions.lock().await.clone())
    }

    async fn insert_revision(&self, revision: &Revision) -> Result<(), String> {
        self.revisions.lock().await.push(revision.clone());
        Ok(())
    }

    async fn exec_ddl(&self, _sql: &str) -> Result<(), String> {
        self.exec_count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Err(String::new())
    }
}
