//! Ordering collaborators (§4.2): the fill-reducing permutation step.
//!
//! The distilled specification treats the ordering routine as an opaque
//! pure function `nd(N, adjPtr, adjIdx) → (perm, iperm)`. This crate exposes
//! that collaborator as an injectable [`Ordering`] trait rather than a
//! hardcoded external call, with Approximate Minimum Degree (AMD) shipped as
//! the one concrete, complete implementation — see `SPEC_FULL.md` §4.2.

mod amd;

use crate::error::{AnalyseError, AnalyseResult};
use crate::pattern::CscPattern;
use crate::utils::inverse_permutation;

pub use amd::{AmdControl, AmdInfo};

/// A fill-reducing ordering collaborator: a pure function from a symmetric
/// graph (given here as the canonicalised upper/lower pattern pair) to a
/// permutation of `0..n`.
pub trait Ordering {
    /// Compute `(perm, iperm)` for the symmetric pattern described by
    /// `upper`/`lower` (both already canonicalised: strictly ascending rows
    /// per column, `upper` strictly i ≤ j, `lower` its transpose).
    fn order(&self, upper: &CscPattern, lower: &CscPattern) -> AnalyseResult<(Vec<usize>, Vec<usize>)>;
}

/// Approximate Minimum Degree ordering — the crate's default [`Ordering`].
#[derive(Debug, Clone, Default)]
pub struct AmdOrdering {
    pub control: AmdControl,
}

impl AmdOrdering {
    pub fn new(control: AmdControl) -> Self {
        Self { control }
    }

    /// Build the AMD elimination-graph workspace (`pe`/`iw`/`len`) from the
    /// symmetric adjacency of `upper`/`lower`, excluding the diagonal, with
    /// each off-diagonal (i,j) stored twice.
    ///
    /// This is a simplified from of the teacher's `aat_first_phase` /
    /// `aat_second_phase` two-pass counting-sort: the general AAT routine
    /// has to cope with an arbitrary, possibly-non-canonical input matrix
    /// (duplicates, either triangle, or both). Our caller has already run
    /// every pattern through [`crate::pattern::ingest`], so the adjacency of
    /// vertex v is exactly `lower.col(v)` (neighbours j > v) union
    /// `upper.col(v)` minus the diagonal (neighbours i < v) — no merge pass
    /// needed.
    fn build_graph(n: usize, upper: &CscPattern, lower: &CscPattern) -> (Vec<isize>, Vec<isize>, Vec<usize>, usize) {
        let mut len = vec![0usize; n];
        for v in 0..n {
            let below = lower.col(v).len();
            let above = upper.col(v).iter().filter(|&&i| i != v).count();
            len[v] = below + above;
        }

        let mut pe = vec![0isize; n];
        let mut pfree = 0usize;
        for v in 0..n {
            pe[v] = pfree as isize;
            pfree += len[v];
        }

        let iwlen = pfree + pfree / 5 + n;
        let mut iw = vec![0isize; iwlen];
        let mut next_pos = vec![0usize; n];
        for v in 0..n {
            next_pos[v] = pe[v] as usize;
        }

        for v in 0..n {
            for &i in upper.col(v) {
                if i == v {
                    continue;
                }
                let pi = next_pos[i];
                iw[pi] = v as isize;
                next_pos[i] += 1;
                let pv = next_pos[v];
                iw[pv] = i as isize;
                next_pos[v] += 1;
            }
        }

        (pe, iw, len, pfree)
    }
}

impl Ordering for AmdOrdering {
    fn order(&self, upper: &CscPattern, lower: &CscPattern) -> AnalyseResult<(Vec<usize>, Vec<usize>)> {
        let n = upper.n;
        if n <= 1 {
            return Ok((vec![0; n], vec![0; n]));
        }

        let (mut pe, mut iw, mut len, pfree) = Self::build_graph(n, upper, lower);
        let iwlen = iw.len();

        let mut nv = vec![0isize; n];
        let mut next = vec![0isize; n];
        let mut last = vec![0isize; n];
        let mut head = vec![0isize; n];
        let mut elen = vec![0isize; n];
        let mut degree = vec![0isize; n];
        let mut w = vec![0isize; n];

        let _info = amd::amd(
            n, &mut pe, &mut iw, &mut len, iwlen, pfree, &mut nv, &mut next, &mut last, &mut head,
            &mut elen, &mut degree, &mut w, self.control.clone(),
        );

        // `last` holds the output permutation (last[k] = original index
        // placed at position k); `next` holds its inverse.
        let mut perm = vec![0usize; n];
        let mut iperm = vec![0usize; n];
        for k in 0..n {
            if last[k] < 0 || last[k] as usize >= n {
                return Err(AnalyseError::OrderingFailed {
                    reason: format!("amd returned out-of-range permutation entry {} at position {k}", last[k]),
                });
            }
            perm[k] = last[k] as usize;
        }
        if !crate::utils::is_valid_permutation(&perm, n) {
            return Err(AnalyseError::OrderingFailed {
                reason: "amd did not return a valid permutation of 0..n".to_string(),
            });
        }
        iperm.copy_from_slice(&inverse_permutation(&perm));
        Ok((perm, iperm))
    }
}

/// User-supplied permutation, validated but otherwise passed through
/// unchanged (§4.2 "user-supplied" mode).
pub struct UserOrdering {
    pub perm: Vec<usize>,
}

impl Ordering for UserOrdering {
    fn order(&self, upper: &CscPattern, _lower: &CscPattern) -> AnalyseResult<(Vec<usize>, Vec<usize>)> {
        let n = upper.n;
        if !crate::utils::is_valid_permutation(&self.perm, n) {
            for (position, &value) in self.perm.iter().enumerate() {
                if value >= n {
                    return Err(AnalyseError::InvalidPermutation {
                        n,
                        position,
                        value: value as i64,
                    });
                }
            }
            return Err(AnalyseError::InvalidPermutation {
                n,
                position: 0,
                value: -1,
            });
        }
        let iperm = inverse_permutation(&self.perm);
        Ok((self.perm.clone(), iperm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::ingest;

    #[test]
    fn amd_ordering_arrowhead_is_valid_permutation() {
        let ptr_in = vec![0, 1, 2, 3, 4, 9];
        let rows_in = vec![0, 1, 2, 3, 0, 1, 2, 3, 4];
        let (upper, lower) = ingest(&rows_in, &ptr_in).unwrap();
        let ordering = AmdOrdering::default();
        let (perm, iperm) = ordering.order(&upper, &lower).unwrap();
        assert!(crate::utils::is_valid_permutation(&perm, 5));
        for k in 0..5 {
            assert_eq!(iperm[perm[k]], k);
        }
    }

    #[test]
    fn amd_ordering_singleton() {
        let ptr_in = vec![0, 1];
        let rows_in = vec![0];
        let (upper, lower) = ingest(&rows_in, &ptr_in).unwrap();
        let ordering = AmdOrdering::default();
        let (perm, iperm) = ordering.order(&upper, &lower).unwrap();
        assert_eq!(perm, vec![0]);
        assert_eq!(iperm, vec![0]);
    }

    #[test]
    fn user_ordering_identity_round_trips() {
        let ptr_in = vec![0, 1, 2, 3];
        let rows_in = vec![0, 1, 2];
        let (upper, lower) = ingest(&rows_in, &ptr_in).unwrap();
        let user = UserOrdering { perm: vec![0, 1, 2] };
        let (perm, iperm) = user.order(&upper, &lower).unwrap();
        assert_eq!(perm, vec![0, 1, 2]);
        assert_eq!(iperm, vec![0, 1, 2]);
    }

    #[test]
    fn user_ordering_rejects_invalid_permutation() {
        let ptr_in = vec![0, 1, 2, 3];
        let rows_in = vec![0, 1, 2];
        let (upper, lower) = ingest(&rows_in, &ptr_in).unwrap();
        let user = UserOrdering { perm: vec![0, 0, 2] };
        let err = user.order(&upper, &lower).unwrap_err();
        assert!(matches!(err, AnalyseError::InvalidPermutation { .. }));
    }
}
