//! Migration set loading, hashing, and snapshots (spec.md §4.4).

pub mod hash;
pub mod loader;
pub mod revision;
pub mod snapshot;
pub mod sumfile;

pub use loader::{Migration, MigrationLoadError, MigrationSet};
pub use revision::{is_completed, Revision, RevisionKind, RevisionSet};
pub use sumfile::SumFile;

use std::path::Path;

use crate::error::IOError;
use crate::render::render_statement_terminated;

/// Consolidates every migration currently in `dir` into a single snapshot
/// file, replacing the files it consumed and rewriting the sum file
/// (spec.md §4.4 "Snapshots": "Creating a snapshot replaces the N
/// consolidated files with one snapshot file and rewrites the sum file").
pub fn create_snapshot(
    dir: &Path,
    new_version: &str,
    description: &str,
) -> Result<MigrationSet, MigrationLoadError> {
    let set = MigrationSet::load_dir(dir)?;

    let consolidated_sql: String = set
        .migrations
        .iter()
        .flat_map(|m| m.statements.iter())
        .map(render_statement_terminated)
        .collect();

    let included: Vec<String> = set.migrations.iter().map(|m| m.filename.clone()).collect();
    let text = snapshot::build_snapshot_text(description, &included, &consolidated_sql);

    for migration in &set.migrations {
        let path = dir.join(&migration.filename);
        std::fs::remove_file(&path).map_err(|e| IOError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    }

    let new_filename = format!("{new_version}_snapshot.sql");
    let new_path = dir.join(&new_filename);
    std::fs::write(&new_path, &text).map_err(|e| IOError {
        path: new_path.display().to_string(),
        message: e.to_string(),
    })?;

    let new_set = MigrationSet::load_dir(dir)?;
    new_set.save_sum_file(dir)?;
    tracing::info!(
        version = new_version,
        replaced = included.len(),
        "created snapshot"
    );
    Ok(new_set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_snapshot_replaces_files_and_preserves_statements() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("20240101000000.sql"), "CREATE DATABASE a;\n").unwrap();
        std::fs::write(
            dir.path().join("20240102000000.sql"),
            "CREATE TABLE a.events (id UInt64) ENGINE = MergeTree() ORDER BY id;\n",
        )
        .unwrap();

        let set = create_snapshot(dir.path(), "20240103000000", "consolidate initial schema").unwrap();

        assert_eq!(set.migrations.len(), 1);
        assert!(set.migrations[0].is_snapshot);
        assert_eq!(set.migrations[0].statements.len(), 2);
        assert!(!dir.path().join("20240101000000.sql").exists());
        assert!(dir.path().join("housekeeper.sum").exists());
    }
}
