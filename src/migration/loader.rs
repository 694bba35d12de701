//! Loading a migration directory into a [`MigrationSet`] (spec.md §4.4
//! "Loading").

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::Statement;
use crate::error::{IOError, IntegrityMismatch, ParseError};
use crate::parser::parse_string;
use crate::render::render_statement_terminated;

use super::hash::h1_of_bytes;
use super::revision::{is_completed, RevisionSet};
use super::snapshot::is_snapshot_file;
use super::sumfile::{SumFile, SUM_FILE_NAME};

/// `[0-9]{14}(_[A-Za-z0-9_-]+)?\.sql` (spec.md §6.3).
static FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{14}(_[A-Za-z0-9_-]+)?\.sql$").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum MigrationLoadError {
    #[error(transparent)]
    Io(#[from] IOError),
    #[error(transparent)]
    Integrity(#[from] IntegrityMismatch),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: String,
    pub filename: String,
    pub is_snapshot: bool,
    pub statements: Vec<Statement>,
    pub raw_bytes: Vec<u8>,
    pub raw_hash: String,
    pub statement_hashes: Vec<String>,
}

impl Migration {
    pub fn total(&self) -> usize {
        self.statements.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MigrationSet {
    pub migrations: Vec<Migration>,
}

impl MigrationSet {
    /// Loads every `*.sql` file in `dir` matching the migration filename
    /// pattern, in lexicographic order, validating them against
    /// `housekeeper.sum` if present.
    pub fn load_dir(dir: &Path) -> Result<MigrationSet, MigrationLoadError> {
        let mut filenames: Vec<String> = std::fs::read_dir(dir)
            .map_err(|e| IOError {
                path: dir.display().to_string(),
                message: e.to_string(),
            })?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| FILENAME_RE.is_match(name))
            .collect();
        filenames.sort();

        let mut files_for_sum = Vec::with_capacity(filenames.len());
        let mut migrations = Vec::with_capacity(filenames.len());

        for filename in &filenames {
            let path = dir.join(filename);
            let bytes = std::fs::read(&path).map_err(|e| IOError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            let text = String::from_utf8_lossy(&bytes).into_owned();

            let schema = parse_string(&text)?;
            let statements: Vec<Statement> = schema.statements().to_vec();
            let statement_hashes: Vec<String> = statements
                .iter()
                .map(|s| h1_of_bytes(render_statement_terminated(s).as_bytes()))
                .collect();

            let version = filename.trim_end_matches(".sql").to_string();
            files_for_sum.push((filename.clone(), bytes.clone()));

            migrations.push(Migration {
                version,
                filename: filename.clone(),
                is_snapshot: is_snapshot_file(&text),
                statements,
                raw_hash: h1_of_bytes(&bytes),
                raw_bytes: bytes,
                statement_hashes,
            });
        }

        let sum_path = dir.join(SUM_FILE_NAME);
        if sum_path.exists() {
            let sum_text = std::fs::read_to_string(&sum_path).map_err(|e| IOError {
                path: sum_path.display().to_string(),
                message: e.to_string(),
            })?;
            let sum_file = SumFile::parse(&sum_text)?;
            sum_file.validate(&files_for_sum)?;
        }

        tracing::info!(count = migrations.len(), dir = %dir.display(), "loaded migration set");
        Ok(MigrationSet { migrations })
    }

    /// Recomputes and writes `housekeeper.sum` for the files currently in
    /// this set (spec.md §4.4 "Sum file"). `load; saveSumFile; load` is
    /// the identity (spec.md §8).
    pub fn save_sum_file(&self, dir: &Path) -> Result<(), MigrationLoadError> {
        let files: Vec<(String, Vec<u8>)> = self
            .migrations
            .iter()
            .map(|m| (m.filename.clone(), m.raw_bytes.clone()))
            .collect();
        let sum_file = SumFile::compute(&files);
        let path = dir.join(SUM_FILE_NAME);
        std::fs::write(&path, sum_file.render()).map_err(|e| IOError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// A preview of what `Executor::execute` would do against `revisions`,
    /// without touching the database (spec.md SPEC_FULL §C).
    pub fn pending<'a>(&'a self, revisions: &RevisionSet) -> Vec<&'a Migration> {
        self.migrations
            .iter()
            .filter(|m| !is_completed(m, revisions.get(&m.version)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn loads_in_lexicographic_order() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            "20240102000000.sql",
            "CREATE TABLE a.b (id UInt64) ENGINE = MergeTree() ORDER BY id;\n",
        );
        write_file(dir.path(), "20240101000000.sql", "CREATE DATABASE a;\n");

        let set = MigrationSet::load_dir(dir.path()).unwrap();
        assert_eq!(set.migrations.len(), 2);
        assert_eq!(set.migrations[0].version, "20240101000000");
        assert_eq!(set.migrations[1].version, "20240102000000");
    }

    #[test]
    fn ignores_non_matching_filenames() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "20240101000000.sql", "CREATE DATABASE a;\n");
        write_file(dir.path(), "README.md", "not a migration");

        let set = MigrationSet::load_dir(dir.path()).unwrap();
        assert_eq!(set.migrations.len(), 1);
    }

    #[test]
    fn load_save_load_is_identity() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "20240101000000.sql", "CREATE DATABASE a;\n");
        write_file(
            dir.path(),
            "20240102000000_add_events.sql",
            "CREATE TABLE a.events (id UInt64) ENGINE = MergeTree() ORDER BY id;\n",
        );

        let first = MigrationSet::load_dir(dir.path()).unwrap();
        first.save_sum_file(dir.path()).unwrap();
        let second = MigrationSet::load_dir(dir.path()).unwrap();

        let hashes_first: Vec<&str> = first.migrations.iter().map(|m| m.raw_hash.as_str()).collect();
        let hashes_second: Vec<&str> = second.migrations.iter().map(|m| m.raw_hash.as_str()).collect();
        assert_eq!(hashes_first, hashes_second);
    }

    #[test]
    fn mutating_a_byte_invalidates_the_set() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "20240101000000.sql", "CREATE DATABASE a;\n");
        let set = MigrationSet::load_dir(dir.path()).unwrap();
        set.save_sum_file(dir.path()).unwrap();

        write_file(dir.path(), "20240101000000.sql", "CREATE DATABASE b;\n");
        let err = MigrationSet::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, MigrationLoadError::Integrity(_)));
    }

    #[test]
    fn detects_snapshot_files() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            "20240101000000_snapshot.sql",
            "-- housekeeper:snapshot\n-- description: consolidated\nCREATE DATABASE a;\n",
        );
        let set = MigrationSet::load_dir(dir.path()).unwrap();
        assert!(set.migrations[0].is_snapshot);
    }
}
