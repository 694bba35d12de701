//! The `housekeeper.sum` manifest (spec.md §4.4 "Sum file", §6.3).
//!
//! First line is the cumulative hash; subsequent lines are `<filename>
//! h1:<base64>=`, one per migration file, in the same order the
//! migration set was loaded (lexicographic by filename).

use std::collections::HashSet;

use crate::error::IntegrityMismatch;

use super::hash::merkle_chain;

pub const SUM_FILE_NAME: &str = "housekeeper.sum";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumFile {
    pub cumulative: String,
    pub entries: Vec<(String, String)>,
}

impl SumFile {
    /// Computes the sum file that corresponds to `files`, given in the
    /// canonical (lexicographic-by-filename) order.
    pub fn compute(files: &[(String, Vec<u8>)]) -> SumFile {
        let chain = merkle_chain(files.iter().map(|(_, b)| b.as_slice()));
        let entries = files
            .iter()
            .zip(chain.per_file)
            .map(|((name, _), hash)| (name.clone(), hash))
            .collect();
        SumFile {
            cumulative: chain.cumulative,
            entries,
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.cumulative);
        for (name, hash) in &self.entries {
            out.push_str(&format!("{name} {hash}\n"));
        }
        out
    }

    pub fn parse(text: &str) -> Result<SumFile, IntegrityMismatch> {
        let mut lines = text.lines();
        let cumulative = lines
            .next()
            .ok_or_else(|| IntegrityMismatch::CumulativeHash {
                expected: String::new(),
                actual: String::new(),
            })?
            .trim()
            .to_string();

        let mut entries = Vec::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((name, hash)) = line.rsplit_once(' ') else {
                continue;
            };
            entries.push((name.to_string(), hash.to_string()));
        }

        Ok(SumFile { cumulative, entries })
    }

    /// Validates this sum file against the migration files actually
    /// present on disk (name, bytes), in canonical order. Every byte
    /// mismatch, missing file, or untracked file invalidates the set.
    pub fn validate(&self, files: &[(String, Vec<u8>)]) -> Result<(), IntegrityMismatch> {
        let present: HashSet<&str> = files.iter().map(|(n, _)| n.as_str()).collect();
        let tracked: HashSet<&str> = self.entries.iter().map(|(n, _)| n.as_str()).collect();

        for (name, _) in &self.entries {
            if !present.contains(name.as_str()) {
                return Err(IntegrityMismatch::MissingFile { file: name.clone() });
            }
        }
        for (name, _) in files {
            if !tracked.contains(name.as_str()) {
                return Err(IntegrityMismatch::UntrackedFile { file: name.clone() });
            }
        }

        let recomputed = SumFile::compute(files);
        for ((name, expected), (_, actual)) in self.entries.iter().zip(recomputed.entries.iter()) {
            if expected != actual {
                return Err(IntegrityMismatch::FileHash {
                    file: name.clone(),
                    expected: expected.clone(),
                    actual: actual.clone(),
                });
            }
        }

        if self.cumulative != recomputed.cumulative {
            return Err(IntegrityMismatch::CumulativeHash {
                expected: self.cumulative.clone(),
                actual: recomputed.cumulative.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files() -> Vec<(String, Vec<u8>)> {
        vec![
            ("20240101000000.sql".to_string(), b"CREATE DATABASE a;".to_vec()),
            ("20240102000000.sql".to_string(), b"CREATE TABLE a.b (id UInt64) ENGINE = MergeTree() ORDER BY id;".to_vec()),
        ]
    }

    #[test]
    fn round_trip_render_parse() {
        let sum = SumFile::compute(&files());
        let rendered = sum.render();
        let parsed = SumFile::parse(&rendered).unwrap();
        assert_eq!(sum, parsed);
    }

    #[test]
    fn validate_accepts_matching_set() {
        let sum = SumFile::compute(&files());
        assert!(sum.validate(&files()).is_ok());
    }

    #[test]
    fn validate_rejects_mutated_byte() {
        let sum = SumFile::compute(&files());
        let mut mutated = files();
        mutated[0].1.push(b' ');
        assert!(matches!(
            sum.validate(&mutated),
            Err(IntegrityMismatch::FileHash { .. })
        ));
    }

    #[test]
    fn validate_rejects_untracked_file() {
        let sum = SumFile::compute(&files());
        let mut extra = files();
        extra.push(("20240103000000.sql".to_string(), b"DROP DATABASE a;".to_vec()));
        assert!(matches!(
            sum.validate(&extra),
            Err(IntegrityMismatch::UntrackedFile { .. })
        ));
    }

    #[test]
    fn validate_rejects_missing_file() {
        let sum = SumFile::compute(&files());
        let mut missing = files();
        missing.pop();
        assert!(matches!(
            sum.validate(&missing),
            Err(IntegrityMismatch::MissingFile { .. })
        ));
    }
}
