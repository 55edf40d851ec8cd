//! Column counts via the skeleton-matrix / least-common-ancestor algorithm
//! (§4.6) — exactly the Davis procedure: first descendants, a disjoint-set
//! forest tracking the LCA of previously-processed leaves, and a final
//! postorder propagation pass. Grounded on Davis's `cs_counts`/`cs_leaf`
//! (CSparse) and the equivalent description in §4.6.

use crate::pattern::CscPattern;
use crate::utils::{subtree_sizes, NONE};

/// Output of the column-count stage.
pub struct ColCounts {
    /// `colcount[j]`: nonzeros in column j of L, including the diagonal.
    pub colcount: Vec<usize>,
    /// `rowcount[i]`: nonzeros in row i of L (`[FULL]` §3, a convenience
    /// field derived from the same tree/colcount data, not consumed by any
    /// later stage of the analysis itself).
    pub rowcount: Vec<usize>,
}

/// Disjoint-set find with path compression: the LCA lookup used by
/// `ProcessEdge`.
fn find(ancestor: &mut [usize], mut i: usize) -> usize {
    let mut path = Vec::new();
    while ancestor[i] != i {
        path.push(i);
        i = ancestor[i];
    }
    for p in path {
        ancestor[p] = i;
    }
    i
}

/// Compute `colcount`/`rowcount` for a postordered, canonicalised
/// `upper`/`lower` pattern pair and its elimination tree `parent` (postorder
/// invariant: `parent[i] == -1 || parent[i] > i`). The no-relaxation flop
/// estimate consumed by `[crate::analyse]` is the dense-front count over
/// fundamental supernodes, not a function of `colcount` alone — see
/// `Symbolic::operations` in `crate::symbolic`.
pub fn compute(upper: &CscPattern, lower: &CscPattern, parent: &[i64]) -> ColCounts {
    let n = upper.n;
    let subtree_size = subtree_sizes(parent);

    // First descendant of j's subtree: since the tree is postordered, every
    // subtree is the contiguous interval [first[j], j]. A node is a leaf of
    // its own subtree (first[j] == j) exactly when it has no children.
    let first: Vec<usize> = (0..n).map(|j| j + 1 - subtree_size[j]).collect();

    let mut maxfirst = vec![NONE; n];
    let mut prevleaf = vec![NONE; n];
    let mut ancestor: Vec<usize> = (0..n).collect();

    // delta[j], reused in place as colcount: 1 for leaves, 0 for internal
    // nodes, corrected in the main loop below and finally accumulated
    // bottom-up into true column counts.
    let mut colcount: Vec<i64> = (0..n).map(|j| if subtree_size[j] == 1 { 1 } else { 0 }).collect();

    for j in 0..n {
        if parent[j] != NONE {
            colcount[parent[j] as usize] -= 1;
        }

        for &i in lower.col(j) {
            if i == j {
                continue; // the diagonal entry carries no row-subtree edge.
            }
            process_edge(i, j, &first, &mut maxfirst, &mut prevleaf, &mut ancestor, &mut colcount);
        }

        if parent[j] != NONE {
            ancestor[j] = parent[j] as usize;
        }
    }

    // Propagate by postorder: colcount[parent[j]] += colcount[j].
    for j in 0..n {
        if parent[j] != NONE {
            colcount[parent[j] as usize] += colcount[j];
        }
    }

    let colcount: Vec<usize> = colcount
        .into_iter()
        .map(|c| {
            debug_assert!(c >= 1, "colcount must be >= 1 after propagation, got {c}");
            c.max(1) as usize
        })
        .collect();

    let rowcount = compute_rowcount(lower, parent, n);

    ColCounts { colcount, rowcount }
}

/// `ProcessEdge` (§4.6 step 3, Davis's `cs_leaf`): for lower-triangle edge
/// (i, j) with i > j, decide whether j is a new leaf of the row-subtree of
/// i, and if so whether it is the first leaf (simple increment of
/// `colcount[j]`) or a later one (an additional LCA-indexed correction).
fn process_edge(
    i: usize,
    j: usize,
    first: &[usize],
    maxfirst: &mut [i64],
    prevleaf: &mut [i64],
    ancestor: &mut [usize],
    colcount: &mut [i64],
) {
    if (first[j] as i64) <= maxfirst[i] {
        // j is not a leaf of i's row-subtree: some earlier-processed column
        // already covers this portion of the subtree.
        return;
    }
    maxfirst[i] = first[j] as i64;
    let jprev = prevleaf[i];
    colcount[j] += 1;
    prevleaf[i] = j as i64;
    if jprev == NONE {
        // j is the first leaf of i's row-subtree: no LCA correction needed.
        return;
    }
    let lca = find(ancestor, jprev as usize);
    colcount[lca] -= 1;
}

/// `rowcount[i]`: number of nonzeros in row i of L. Derived from the tree
/// directly (`[FULL]` §3/§9 resolved Open Question, see `DESIGN.md`): row
/// i's nonzero columns are i itself plus every distinct ancestor reached by
/// climbing from each of row i's original upper-triangle column references
/// up to the root, deduplicated with a per-row mark array — the same
/// "climb while unmarked" technique the elimination-tree builder itself
/// uses, linear in nnz(U).
fn compute_rowcount(lower: &CscPattern, parent: &[i64], n: usize) -> Vec<usize> {
    let mut rowcount = vec![1usize; n]; // the diagonal itself.
    let mut mark = vec![usize::MAX; n]; // mark[k] = last row we climbed through k for.
    for i in 0..n {
        for &c in lower.col(i) {
            if c == i {
                continue;
            }
            // climb from c upward, counting unmarked ancestors, until we hit
            // one already marked for row i (everything above it was already
            // counted via an earlier, deeper column reference of row i).
            let mut k = c as i64;
            while k != NONE && mark[k as usize] != i {
                mark[k as usize] = i;
                rowcount[i] += 1;
                k = parent[k as usize];
            }
        }
    }
    rowcount
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etree;
    use crate::pattern::ingest;
    use crate::postorder;

    fn analyse_tree(rows_in: &[usize], ptr_in: &[usize]) -> (CscPattern, CscPattern, Vec<i64>) {
        let (upper, _lower) = ingest(rows_in, ptr_in).unwrap();
        let parent = etree::build(&upper);
        let n = upper.n;
        let identity: Vec<usize> = (0..n).collect();
        let (tree, _perm, _iperm) = postorder::apply(&parent, &upper, &identity);
        (tree.upper, tree.lower, tree.parent)
    }

    #[test]
    fn arrowhead_colcounts_match_scenario_a() {
        let ptr_in = vec![0, 1, 2, 3, 4, 9];
        let rows_in = vec![0, 1, 2, 3, 0, 1, 2, 3, 4];
        let (upper, lower, parent) = analyse_tree(&rows_in, &ptr_in);
        let cc = compute(&upper, &lower, &parent);
        assert_eq!(cc.colcount, vec![2, 2, 2, 2, 1]);
        assert_eq!(cc.colcount.iter().sum::<usize>(), 9);
    }

    #[test]
    fn dense_lower_triangle_colcounts_match_scenario_b() {
        // 4x4 dense: every column j has rows 0..=j.
        let n = 4;
        let mut rows_in = vec![];
        let mut ptr_in = vec![0usize];
        for j in 0..n {
            for i in 0..=j {
                rows_in.push(i);
            }
            ptr_in.push(rows_in.len());
        }
        let (upper, lower, parent) = analyse_tree(&rows_in, &ptr_in);
        let cc = compute(&upper, &lower, &parent);
        assert_eq!(cc.colcount, vec![4, 3, 2, 1]);
        assert_eq!(parent, vec![1, 2, 3, NONE]);
    }

    #[test]
    fn tridiagonal_colcounts_match_scenario_d() {
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
        let (upper, lower, parent) = analyse_tree(&rows_in, &ptr_in);
        let cc = compute(&upper, &lower, &parent);
        for j in 0..9 {
            assert_eq!(cc.colcount[j], 2, "colcount[{j}]");
        }
        assert_eq!(cc.colcount[9], 1);
    }

    #[test]
    fn two_block_diagonal_colcounts_match_scenario_c() {
        // two disjoint 3x3 dense upper blocks.
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
        let (upper, lower, parent) = analyse_tree(&rows_in, &ptr_in);
        let cc = compute(&upper, &lower, &parent);
        assert_eq!(cc.colcount, vec![3, 2, 1, 3, 2, 1]);
    }

    #[test]
    fn colcount_is_at_least_one_and_bounded_by_remaining_columns() {
        let ptr_in = vec![0, 1, 2, 3, 4, 9];
        let rows_in = vec![0, 1, 2, 3, 0, 1, 2, 3, 4];
        let (upper, lower, parent) = analyse_tree(&rows_in, &ptr_in);
        let cc = compute(&upper, &lower, &parent);
        let n = upper.n;
        for j in 0..n {
            assert!(cc.colcount[j] >= 1);
            assert!(cc.colcount[j] <= n - j);
        }
    }

    #[test]
    fn sum_colcount_equals_nzl() {
        // dense 4x4: sum(colcount) = 4+3+2+1 = 10 = |L|.
        let n = 4;
        let mut rows_in = vec![];
        let mut ptr_in = vec![0usize];
        for j in 0..n {
            for i in 0..=j {
                rows_in.push(i);
            }
            ptr_in.push(rows_in.len());
        }
        let (upper, lower, parent) = analyse_tree(&rows_in, &ptr_in);
        let cc = compute(&upper, &lower, &parent);
        assert_eq!(cc.colcount.iter().sum::<usize>(), 10);
    }
}
