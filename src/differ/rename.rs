//! Generic rename-pair matching shared by every per-kind differ
//! (spec.md §4.3 "Rename detection").
//!
//! For each (old-only, new-only) pair of the same object kind, a rename is
//! detected when their non-identity attributes are structurally equal.
//! Ties are broken by preferring a shared database qualifier; anything
//! still ambiguous is left unmatched, which makes the caller fall back to
//! DROP+CREATE for both sides (spec.md §9 open question: richer heuristics
//! such as name edit-distance are out of scope).

/// Returns `(old_index, new_index)` pairs, each index into its respective
/// slice, processed in `old_only` order with `new_only` candidates
/// consumed greedily and exactly once.
pub fn find_rename_pairs<T>(
    old_only: &[T],
    new_only: &[T],
    equal_ignoring_identity: impl Fn(&T, &T) -> bool,
    same_qualifier: impl Fn(&T, &T) -> bool,
) -> Vec<(usize, usize)> {
    let mut used_new = vec![false; new_only.len()];
    let mut pairs = Vec::new();

    for (oi, old) in old_only.iter().enumerate() {
        let mut candidates: Vec<usize> = new_only
            .iter()
            .enumerate()
            .filter(|(ni, new)| !used_new[*ni] && equal_ignoring_identity(old, new))
            .map(|(ni, _)| ni)
            .collect();

        if candidates.len() > 1 {
            let qualified: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&ni| same_qualifier(old, &new_only[ni]))
                .collect();
            if qualified.len() == 1 {
                candidates = qualified;
            }
        }

        if candidates.len() == 1 {
            let ni = candidates[0];
            used_new[ni] = true;
            pairs.push((oi, ni));
        }
    }

    pairs
}
