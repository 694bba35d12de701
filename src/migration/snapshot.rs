//! Snapshot migrations (spec.md §4.4 "Snapshots").
//!
//! A snapshot is an ordinary migration file that opens with the
//! `-- housekeeper:snapshot` directive and carries the consolidated DDL
//! of every migration it replaces. At execute time it records a revision
//! of `kind = snapshot` without re-running its statements (spec.md §4.5).
//!
//! §9 flags that the original tool kept a cumulative hash both in the sum
//! file and in an ad-hoc snapshot comment header, and asks a
//! reimplementation to pick one canonical place. This implementation
//! picks the sum file: the snapshot header below carries only
//! descriptive metadata (what it replaces, why), never a hash, and the
//! sum file computed over the directory on disk is the only hash any
//! caller trusts (see `DESIGN.md`).

pub const SNAPSHOT_DIRECTIVE: &str = "-- housekeeper:snapshot";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotMetadata {
    pub description: Option<String>,
    pub included_migrations: Vec<String>,
}

pub fn is_snapshot_file(text: &str) -> bool {
    text.trim_start().starts_with(SNAPSHOT_DIRECTIVE)
}

/// Parses the metadata header: consecutive `-- key: value` comment lines
/// immediately following the directive line. The first line that isn't a
/// recognised `-- key:` comment ends the header.
pub fn parse_metadata(text: &str) -> SnapshotMetadata {
    let mut meta = SnapshotMetadata::default();
    let mut lines = text.lines();

    let Some(first) = lines.next() else {
        return meta;
    };
    if !first.trim().starts_with(SNAPSHOT_DIRECTIVE) {
        return meta;
    }

    for line in lines {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("-- description:") {
            meta.description = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("-- included:") {
            meta.included_migrations = rest
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        } else if line.is_empty() {
            continue;
        } else {
            break;
        }
    }

    meta
}

/// Builds the text of a new snapshot file from the statements it
/// consolidates (already rendered) and the set of filenames it replaces.
pub fn build_snapshot_text(description: &str, included: &[String], consolidated_sql: &str) -> String {
    let mut out = String::new();
    out.push_str(SNAPSHOT_DIRECTIVE);
    out.push('\n');
    out.push_str(&format!("-- description: {description}\n"));
    out.push_str(&format!("-- included: {}\n", included.join(",")));
    out.push('\n');
    out.push_str(consolidated_sql);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_snapshot_header() {
        let text = "-- housekeeper:snapshot\n-- description: x\nCREATE DATABASE a;\n";
        assert!(is_snapshot_file(text));
        assert!(!is_snapshot_file("CREATE DATABASE a;\n"));
    }

    #[test]
    fn parses_description_and_included() {
        let text = build_snapshot_text(
            "consolidate first two",
            &["20240101000000.sql".to_string(), "20240102000000.sql".to_string()],
            "CREATE DATABASE a;\n",
        );
        let meta = parse_metadata(&text);
        assert_eq!(meta.description.as_deref(), Some("consolidate first two"));
        assert_eq!(
            meta.included_migrations,
            vec!["20240101000000.sql".to_string(), "20240102000000.sql".to_string()]
        );
    }
}
