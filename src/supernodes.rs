//! Fundamental supernode detection (§4.7).
//!
//! A column j starts a new fundamental supernode unless every later column
//! that references one of j's rows in the same way continues to do so
//! contiguously — tested here via subtree sizes and a per-row
//! last-referencing-column table, rather than by comparing column patterns
//! directly.

use crate::pattern::CscPattern;
use crate::utils::{subtree_sizes, NONE};

/// The fundamental supernode partition: a coarsening of the postordered
/// column range `0..n` into contiguous runs, plus the induced supernodal
/// elimination tree.
#[derive(Debug, Clone)]
pub struct Supernodes {
    pub sn_count: usize,
    /// `sn_belong[j]`: the supernode column j belongs to.
    pub sn_belong: Vec<usize>,
    /// `sn_start[s]..sn_start[s+1]` are the columns of supernode s.
    /// Length `sn_count + 1`, with `sn_start[sn_count] == n`.
    pub sn_start: Vec<usize>,
    /// Parent of supernode s in the supernodal elimination tree, or `NONE`
    /// if s is a root.
    pub sn_parent: Vec<i64>,
}

/// Mark, for each column, whether it starts a new fundamental supernode.
/// Column 0 always starts one; every other column is marked either by its
/// own lower-triangle edges (a referenced row last touched outside the
/// contiguous window implied by j's subtree) or by a smaller column whose
/// subtree doesn't fill its parent's exactly (a branching point).
fn fundamental_starts(lower: &CscPattern, parent: &[i64], subtree_size: &[usize]) -> Vec<bool> {
    let n = lower.n;
    let mut is_start = vec![false; n];
    is_start[0] = true;
    let mut prev_nz = vec![NONE; n];

    for j in 0..n {
        let window_start = (j + 1) as i64 - subtree_size[j] as i64;
        for &i in lower.col(j) {
            if i == j {
                continue;
            }
            if prev_nz[i] < window_start {
                is_start[j] = true;
            }
            prev_nz[i] = j as i64;
        }
        if parent[j] != NONE {
            let p = parent[j] as usize;
            if subtree_size[j] + 1 != subtree_size[p] {
                is_start[p] = true;
            }
        }
    }
    is_start
}

/// Run the fundamental supernode detection stage on a postordered pattern.
pub fn detect(lower: &CscPattern, parent: &[i64]) -> Supernodes {
    let n = lower.n;
    let subtree_size = subtree_sizes(parent);
    let is_start = fundamental_starts(lower, parent, &subtree_size);

    let mut sn_start: Vec<usize> = (0..n).filter(|&j| is_start[j]).collect();
    let sn_count = sn_start.len();
    sn_start.push(n);

    let mut sn_belong = vec![0usize; n];
    for s in 0..sn_count {
        for j in sn_start[s]..sn_start[s + 1] {
            sn_belong[j] = s;
        }
    }

    let mut sn_parent = vec![NONE; sn_count];
    for s in 0..sn_count {
        let last_col = sn_start[s + 1] - 1;
        let p = parent[last_col];
        sn_parent[s] = if p == NONE { NONE } else { sn_belong[p as usize] as i64 };
    }

    Supernodes {
        sn_count,
        sn_belong,
        sn_start,
        sn_parent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etree;
    use crate::pattern::ingest;
    use crate::postorder;

    fn analyse_tree(rows_in: &[usize], ptr_in: &[usize]) -> (CscPattern, Vec<i64>) {
        let (upper, _lower) = ingest(rows_in, ptr_in).unwrap();
        let parent = etree::build(&upper);
        let n = upper.n;
        let identity: Vec<usize> = (0..n).collect();
        let (tree, _perm, _iperm) = postorder::apply(&parent, &upper, &identity);
        (tree.lower, tree.parent)
    }

    #[test]
    fn arrowhead_has_five_singleton_supernodes_scenario_a() {
        let ptr_in = vec![0, 1, 2, 3, 4, 9];
        let rows_in = vec![0, 1, 2, 3, 0, 1, 2, 3, 4];
        let (lower, parent) = analyse_tree(&rows_in, &ptr_in);
        let sn = detect(&lower, &parent);
        assert_eq!(sn.sn_count, 5);
        assert_eq!(sn.sn_start, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn dense_4x4_is_one_fundamental_supernode_scenario_b() {
        let n = 4;
        let mut rows_in = vec![];
        let mut ptr_in = vec![0usize];
        for j in 0..n {
            for i in 0..=j {
                rows_in.push(i);
            }
            ptr_in.push(rows_in.len());
        }
        let (lower, parent) = analyse_tree(&rows_in, &ptr_in);
        let sn = detect(&lower, &parent);
        assert_eq!(sn.sn_count, 1);
        assert_eq!(sn.sn_start, vec![0, 4]);
        assert_eq!(sn.sn_parent, vec![NONE]);
    }

    #[test]
    fn two_block_diagonal_has_two_root_supernodes_scenario_c() {
        let mut rows_in = vec![];
        let mut ptr_in = vec![0usize];
        for block in 0..2 {
            let base = block * 3;
            for j in 0..3 {
                for i in 0..=j {
                    rows_in.push(base + i);
                }
                ptr_in.push(rows_in.len());
            }
        }
        let (lower, parent) = analyse_tree(&rows_in, &ptr_in);
        let sn = detect(&lower, &parent);
        assert_eq!(sn.sn_count, 2);
        assert_eq!(sn.sn_start, vec![0, 3, 6]);
        assert_eq!(sn.sn_parent, vec![NONE, NONE]);
    }

    #[test]
    fn tridiagonal_is_all_singletons_scenario_d() {
        let n = 10;
        let mut rows_in = vec![];
        let mut ptr_in = vec![0usize];
        for j in 0..n {
            if j > 0 {
                rows_in.push(j - 1);
            }
            rows_in.push(j);
            ptr_in.push(rows_in.len());
        }
        let (lower, parent) = analyse_tree(&rows_in, &ptr_in);
        let sn = detect(&lower, &parent);
        assert_eq!(sn.sn_count, 10);
    }

    #[test]
    fn sn_belong_partitions_every_column_exactly_once() {
        let ptr_in = vec![0, 1, 2, 3, 4, 9];
        let rows_in = vec![0, 1, 2, 3, 0, 1, 2, 3, 4];
        let (lower, parent) = analyse_tree(&rows_in, &ptr_in);
        let sn = detect(&lower, &parent);
        for j in 0..5 {
            let s = sn.sn_belong[j];
            assert!(j >= sn.sn_start[s] && j < sn.sn_start[s + 1]);
        }
    }
}
