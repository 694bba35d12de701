//! The persisted `Revision` (spec.md §3 "Revision", §6.2) and the
//! in-memory `RevisionSet` the executor loads it into.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::loader::Migration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionKind {
    Migration,
    Snapshot,
}

impl RevisionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RevisionKind::Migration => "migration",
            RevisionKind::Snapshot => "snapshot",
        }
    }

    pub fn from_str(s: &str) -> Option<RevisionKind> {
        match s {
            "migration" => Some(RevisionKind::Migration),
            "snapshot" => Some(RevisionKind::Snapshot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Revision {
    pub version: String,
    pub executed_at: DateTime<Utc>,
    pub execution_time_ms: u64,
    pub kind: RevisionKind,
    pub error: Option<String>,
    pub applied: u32,
    pub total: u32,
    pub hash: String,
    pub partial_hashes: Vec<String>,
    pub housekeeper_version: String,
}

/// An immutable snapshot of `housekeeper.revisions`, indexed by version
/// and reduced to the latest row per version by `executed_at` (spec.md §5
/// "the 'current state' query selects the latest row per version").
#[derive(Debug, Clone, Default)]
pub struct RevisionSet {
    by_version: HashMap<String, Revision>,
}

impl RevisionSet {
    pub fn from_rows(rows: Vec<Revision>) -> Self {
        let mut by_version: HashMap<String, Revision> = HashMap::new();
        for row in rows {
            match by_version.get(&row.version) {
                Some(existing) if existing.executed_at >= row.executed_at => {}
                _ => {
                    by_version.insert(row.version.clone(), row);
                }
            }
        }
        RevisionSet { by_version }
    }

    pub fn get(&self, version: &str) -> Option<&Revision> {
        self.by_version.get(version)
    }
}

/// `IsCompleted(m)` (spec.md §4.5 "Status decision invariants"): a
/// migration is completed when its latest revision ran error-free, every
/// statement in the file was applied, and the revision's snapshot-ness
/// agrees with the file's.
pub fn is_completed(migration: &Migration, revision: Option<&Revision>) -> bool {
    match revision {
        Some(r) => {
            r.error.is_none()
                && r.applied == r.total
                && r.total as usize == migration.statements.len()
                && (r.kind == RevisionKind::Snapshot) == migration.is_snapshot
        }
        None => false,
    }
}
