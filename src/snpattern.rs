//! Supernodal sparsity pattern (§4.9): for each (relaxed) supernode, the
//! full set of rows its dense front touches — the nonzero row pattern of
//! its first column, which by the fundamental-supernode monotonicity
//! property is a superset of every later column's own pattern in the same
//! supernode.
//!
//! Grounded on the classic elimination-tree "reach" technique (cf.
//! `crate::colcount::compute_rowcount`, the same climb-while-unmarked walk,
//! here collecting the visited set rather than just counting it).

use crate::pattern::CscPattern;
use crate::utils::NONE;

/// `snIndices`/`ptrLsn`/`rowsLsn` packaged together: `rowsLsn[ptrLsn[s]..ptrLsn[s+1]]`
/// is the ascending row pattern of supernode s's front.
pub struct SnPattern {
    pub ptr_lsn: Vec<usize>,
    pub rows_lsn: Vec<usize>,
}

impl SnPattern {
    pub fn sn_indices(&self, s: usize) -> &[usize] {
        &self.rows_lsn[self.ptr_lsn[s]..self.ptr_lsn[s + 1]]
    }
}

/// The ascending row pattern of column `j` of L: `{j}` plus every node
/// reached by climbing from a row `i < j` referenced in `upper.col(j)` up
/// through `parent` until an already-visited node is hit. `mark[k] ==
/// marker` means k has already been folded into *this* reach.
pub fn column_reach(j: usize, upper: &CscPattern, parent: &[i64], mark: &mut [i64], marker: i64) -> Vec<usize> {
    let mut reach = vec![j];
    mark[j] = marker;
    for &i in upper.col(j) {
        if i == j {
            continue;
        }
        let mut k = i as i64;
        while k != NONE && mark[k as usize] != marker {
            mark[k as usize] = marker;
            reach.push(k as usize);
            k = parent[k as usize];
        }
    }
    reach.sort_unstable();
    reach
}

/// Build the supernodal pattern for every supernode in ascending order,
/// scanning each supernode's first column's reach exactly once (§4.9).
pub fn build(upper: &CscPattern, parent: &[i64], sn_start: &[usize], sn_count: usize) -> SnPattern {
    let n = upper.n;
    let mut mark = vec![NONE; n];
    let mut ptr_lsn = vec![0usize; sn_count + 1];
    let mut rows_lsn = Vec::new();

    for s in 0..sn_count {
        let first_col = sn_start[s];
        let reach = column_reach(first_col, upper, parent, &mut mark, first_col as i64);
        rows_lsn.extend_from_slice(&reach);
        ptr_lsn[s + 1] = rows_lsn.len();
    }

    SnPattern { ptr_lsn, rows_lsn }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colcount;
    use crate::etree;
    use crate::pattern::ingest;
    use crate::postorder;
    use crate::supernodes;

    #[test]
    fn arrowhead_every_supernode_reaches_the_root() {
        let ptr_in = vec![0, 1, 2, 3, 4, 9];
        let rows_in = vec![0, 1, 2, 3, 0, 1, 2, 3, 4];
        let (upper, _lower) = ingest(&rows_in, &ptr_in).unwrap();
        let parent = etree::build(&upper);
        let identity: Vec<usize> = (0..5).collect();
        let (tree, _perm, _iperm) = postorder::apply(&parent, &upper, &identity);
        let sn = supernodes::detect(&tree.lower, &tree.parent);
        let snp = build(&tree.upper, &tree.parent, &sn.sn_start, sn.sn_count);
        for s in 0..4 {
            assert_eq!(snp.sn_indices(s), &[s, 4]);
        }
        assert_eq!(snp.sn_indices(4), &[4]);
    }

    #[test]
    fn dense_4x4_single_supernode_reaches_every_row() {
        let n = 4;
        let mut rows_in = vec![];
        let mut ptr_in = vec![0usize];
        for j in 0..n {
            for i in 0..=j {
                rows_in.push(i);
            }
            ptr_in.push(rows_in.len());
        }
        let (upper, _lower) = ingest(&rows_in, &ptr_in).unwrap();
        let parent = etree::build(&upper);
        let identity: Vec<usize> = (0..n).collect();
        let (tree, _perm, _iperm) = postorder::apply(&parent, &upper, &identity);
        let cc = colcount::compute(&tree.upper, &tree.lower, &tree.parent);
        let sn = supernodes::detect(&tree.lower, &tree.parent);
        let snp = build(&tree.upper, &tree.parent, &sn.sn_start, sn.sn_count);
        assert_eq!(sn.sn_count, 1);
        assert_eq!(snp.sn_indices(0), &[0, 1, 2, 3]);
        assert_eq!(snp.sn_indices(0).len(), cc.colcount[0]);
    }
}
