//! Elimination tree construction (§4.4): the path-compressed algorithm from
//! Liu's "A Compact Row Storage Scheme for Cholesky Factors" as specialised
//! by Davis, applied to a strictly-upper-triangular, column-sorted pattern.

use crate::pattern::CscPattern;
use crate::utils::NONE;

/// Build `parent[i] ∈ {-1, 0..n-1}` such that `parent[i]` is the smallest
/// row index greater than i with a nonzero in column i of L. Requires
/// `upper` to already be canonicalised (strictly ascending rows per
/// column, i ≤ j for every stored (i, j)).
pub fn build(upper: &CscPattern) -> Vec<i64> {
    let n = upper.n;
    let mut parent = vec![NONE; n];
    let mut ancestor = vec![NONE; n];

    for j in 0..n {
        for &i in upper.col(j) {
            // Walk from i towards the root, stopping once we pass j; path
            // compression: everything walked is re-pointed straight at j.
            let mut k = i as i64;
            while k != NONE && (k as usize) < j {
                let next = ancestor[k as usize];
                ancestor[k as usize] = j as i64;
                if next == NONE {
                    parent[k as usize] = j as i64;
                }
                k = next;
            }
        }
    }

    parent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::ingest;

    #[test]
    fn arrowhead_tree() {
        let ptr_in = vec![0, 1, 2, 3, 4, 9];
        let rows_in = vec![0, 1, 2, 3, 0, 1, 2, 3, 4];
        let (upper, _lower) = ingest(&rows_in, &ptr_in).unwrap();
        let parent = build(&upper);
        assert_eq!(parent, vec![4, 4, 4, 4, NONE]);
    }

    #[test]
    fn tridiagonal_chain() {
        // columns j, j+1 connected: parent[i] = i+1 for i < n-1.
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
        let (upper, _lower) = ingest(&rows_in, &ptr_in).unwrap();
        let parent = build(&upper);
        for i in 0..n - 1 {
            assert_eq!(parent[i], (i + 1) as i64);
        }
        assert_eq!(parent[n - 1], NONE);
    }

    #[test]
    fn dense_upper_triangle() {
        // every column j has rows 0..=j: parent[i] = i+1, single chain.
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
        let parent = build(&upper);
        assert_eq!(parent, vec![1, 2, 3, NONE]);
    }

    #[test]
    fn disconnected_pattern_has_multiple_roots() {
        // two independent diagonal entries: no off-diagonal nonzeros.
        let ptr_in = vec![0, 1, 2, 3];
        let rows_in = vec![0, 1, 2];
        let (upper, _lower) = ingest(&rows_in, &ptr_in).unwrap();
        let parent = build(&upper);
        assert_eq!(parent, vec![NONE, NONE, NONE]);
    }
}
