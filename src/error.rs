//! Crate-wide error taxonomy.
//!
//! Each variant here is a *kind*, not a wrapper around a single upstream
//! type: parsing, diffing, migration-set integrity and execution each get
//! their own enum so a caller can match on what actually went wrong instead
//! of downcasting a boxed `dyn Error`.

use std::fmt;

/// A position in source text, used by [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Failure to parse ClickHouse DDL/SELECT text.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("parse error at {position}: expected {expected}, got {got}")]
pub struct ParseError {
    pub position: Position,
    pub expected: String,
    pub got: String,
}

impl ParseError {
    pub fn new(position: Position, expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self {
            position,
            expected: expected.into(),
            got: got.into(),
        }
    }
}

/// A change the differ refuses to express as a migration statement.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RefusedChange {
    #[error("engine change refused for '{object}': {from} -> {to}")]
    EngineChange {
        object: String,
        from: String,
        to: String,
    },
    #[error("cluster change refused for '{object}': {from:?} -> {to:?}")]
    ClusterChange {
        object: String,
        from: Option<String>,
        to: Option<String>,
    },
    #[error("refusing to operate on system object '{object}'")]
    SystemObject { object: String },
    #[error("unsupported ALTER on '{object}': {reason}")]
    UnsupportedAlter { object: String, reason: String },
}

/// Ordering could not be satisfied while sequencing a migration set.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("dependency ordering violated: {reason}")]
pub struct DependencyError {
    pub reason: String,
}

/// Sum-file or partial-resume hash verification failed.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum IntegrityMismatch {
    #[error("migration file '{file}' hash mismatch: expected {expected}, got {actual}")]
    FileHash {
        file: String,
        expected: String,
        actual: String,
    },
    #[error("sum file cumulative hash mismatch: expected {expected}, got {actual}")]
    CumulativeHash { expected: String, actual: String },
    #[error("sum file references '{file}' which is not present in the migration directory")]
    MissingFile { file: String },
    #[error("migration directory contains '{file}' which is not listed in the sum file")]
    UntrackedFile { file: String },
    #[error(
        "resume of migration '{version}' failed: statement {index} hash mismatch (file modified after partial execution)"
    )]
    ResumeHash { version: String, index: usize },
}

/// The `housekeeper` bookkeeping database/table could not be created or read.
#[derive(Debug, Clone, thiserror::Error)]
#[error("bootstrap failed: {reason}")]
pub struct BootstrapError {
    pub reason: String,
}

/// A statement was rejected by the ClickHouse server during execution.
#[derive(Debug, Clone, thiserror::Error)]
#[error("execution failed at statement {statement_index} of migration '{version}': {message}\n  -- {rendered_sql}")]
pub struct ExecutionError {
    pub version: String,
    pub statement_index: usize,
    pub rendered_sql: String,
    pub message: String,
}

/// File-system access failure while loading a migration set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("io error on '{path}': {message}")]
pub struct IOError {
    pub path: String,
    pub message: String,
}

/// The top-level error type returned by public entry points in this crate.
#[derive(Debug, thiserror::Error)]
pub enum HousekeeperError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    RefusedChange(#[from] RefusedChange),
    #[error(transparent)]
    Dependency(#[from] DependencyError),
    #[error(transparent)]
    Integrity(#[from] IntegrityMismatch),
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error(transparent)]
    Io(#[from] IOError),
}
