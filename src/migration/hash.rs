//! `h1:<base64>=` integrity hashing (spec.md §6.4).
//!
//! Every hash in the migration set and revision table is SHA-256,
//! base64-encoded, prefixed `h1:`. A 32-byte SHA-256 digest base64-encodes
//! to 44 characters with exactly one trailing `=` pad character, which is
//! where the "suffixed `=`" wording in the spec comes from — it falls out
//! of standard base64 padding rather than being appended separately.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

pub fn digest(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

pub fn h1_of_digest(d: &[u8; 32]) -> String {
    format!("h1:{}", STANDARD.encode(d))
}

pub fn h1_of_bytes(bytes: &[u8]) -> String {
    h1_of_digest(&digest(bytes))
}

/// The reverse one-branch Merkle chain over file bytes in order (spec.md
/// §4.4): `H0 = H(file0)`, `Hi = H(Hi-1 || filei)`. Returns the per-file
/// hashes (plain `H(file_i)`, as stored on each sum-file line) and the
/// final cumulative hash (the sum file's header line).
pub struct ChainResult {
    pub per_file: Vec<String>,
    pub cumulative: String,
}

pub fn merkle_chain<'a>(files: impl IntoIterator<Item = &'a [u8]>) -> ChainResult {
    let mut per_file = Vec::new();
    let mut cumulative: Option<[u8; 32]> = None;

    for file_bytes in files {
        per_file.push(h1_of_bytes(file_bytes));
        cumulative = Some(match cumulative {
            None => digest(file_bytes),
            Some(prev) => {
                let mut buf = Vec::with_capacity(32 + file_bytes.len());
                buf.extend_from_slice(&prev);
                buf.extend_from_slice(file_bytes);
                digest(&buf)
            }
        });
    }

    ChainResult {
        per_file,
        cumulative: cumulative.map(|d| h1_of_digest(&d)).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h1_has_prefix_and_single_pad() {
        let h = h1_of_bytes(b"hello world");
        assert!(h.starts_with("h1:"));
        assert!(h.ends_with('='));
        assert_eq!(h.matches('=').count(), 1);
    }

    #[test]
    fn chain_is_order_sensitive() {
        let a = merkle_chain([b"one".as_slice(), b"two".as_slice()]);
        let b = merkle_chain([b"two".as_slice(), b"one".as_slice()]);
        assert_ne!(a.cumulative, b.cumulative);
    }

    #[test]
    fn single_file_chain_equals_its_own_hash() {
        let chain = merkle_chain([b"solo".as_slice()]);
        assert_eq!(chain.cumulative, h1_of_bytes(b"solo"));
        assert_eq!(chain.per_file, vec![h1_of_bytes(b"solo")]);
    }
}
