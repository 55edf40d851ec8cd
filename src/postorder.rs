//! Postordering (§4.5): DFS postorder of the elimination tree, composed into
//! the running permutation, with the matrix repermuted to match.
//!
//! Iterative, explicit-stack DFS (§9 "Deep recursion... must be iterative")
//! grounded on the classic tree-depth-first-search-via-child-consumption
//! technique: each node is pushed once, and popped (emitted) only once its
//! entire head/next child chain has been consumed by pushing.

use crate::pattern::{self, CscPattern};
use crate::utils::{children_linked_list, permute_vector, NONE};

/// Compute the postorder of a forest given by `parent` (roots have
/// `parent[i] == NONE`). Roots are visited in ascending order; a root's
/// children (and every node's children) are visited in ascending original
/// index order, per the head/next convention built by
/// [`children_linked_list`].
pub fn postorder(parent: &[i64]) -> Vec<usize> {
    let n = parent.len();
    let (head, next) = children_linked_list(parent);
    let mut head = head; // consumed as we go
    let mut order = Vec::with_capacity(n);
    let mut stack = Vec::with_capacity(n);

    for root in 0..n {
        if parent[root] != NONE {
            continue;
        }
        stack.push(root);
        while let Some(&node) = stack.last() {
            let child = head[node];
            if child == NONE {
                order.push(node);
                stack.pop();
            } else {
                head[node] = next[child as usize];
                stack.push(child as usize);
            }
        }
    }

    debug_assert_eq!(order.len(), n);
    order
}

/// Remap `parent` through a postorder: `new_parent[k] = iperm[parent[old[k]]]`.
pub fn remap_parent(parent: &[i64], order: &[usize], iperm: &[usize]) -> Vec<i64> {
    order
        .iter()
        .map(|&i| {
            let p = parent[i];
            if p == NONE {
                NONE
            } else {
                iperm[p as usize] as i64
            }
        })
        .collect()
}

/// Result of applying the postorder stage: the new elimination tree (already
/// satisfying `parent[i] == NONE || parent[i] > i`) plus the repermuted
/// upper/lower pattern pair, ready for column-count computation.
pub struct PostorderedTree {
    pub parent: Vec<i64>,
    pub upper: CscPattern,
    pub lower: CscPattern,
}

/// Run the full postorder stage (§4.5): postorder the tree, compose the
/// postorder into the running global `(perm, iperm)`, remap `parent`, and
/// repermute/re-sort the matrix. Returns the updated tree/pattern and the
/// new global `(perm, iperm)`.
pub fn apply(
    parent: &[i64],
    upper: &CscPattern,
    global_perm: &[usize],
) -> (PostorderedTree, Vec<usize>, Vec<usize>) {
    let n = parent.len();
    let order = postorder(parent);

    // order[k] = local index placed at position k; iperm_local[i] = position of i.
    let mut iperm_local = vec![0usize; n];
    for (k, &i) in order.iter().enumerate() {
        iperm_local[i] = k;
    }

    let new_parent = remap_parent(parent, &order, &iperm_local);

    let (ptr_p, rows_p) = pattern::permute_upper(n, &upper.ptr, &upper.rows, &iperm_local);
    let (ptr_l, rows_l) = pattern::transpose(n, &ptr_p, &rows_p);
    let (ptr_u, rows_u) = pattern::transpose(n, &ptr_l, &rows_l);

    let new_upper = CscPattern {
        n,
        ptr: ptr_u,
        rows: rows_u,
    };
    let new_lower = CscPattern {
        n,
        ptr: ptr_l,
        rows: rows_l,
    };

    // Compose the local postorder permutation into the running global one:
    // new_global_perm[k] = global_perm[order[k]].
    let new_global_perm = permute_vector(global_perm, &order);
    let new_global_iperm = crate::utils::inverse_permutation(&new_global_perm);

    (
        PostorderedTree {
            parent: new_parent,
            upper: new_upper,
            lower: new_lower,
        },
        new_global_perm,
        new_global_iperm,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etree;
    use crate::pattern::ingest;

    #[test]
    fn postorder_of_arrowhead_is_already_postordered() {
        // Scenario A is already postordered (root 4 is last).
        let ptr_in = vec![0, 1, 2, 3, 4, 9];
        let rows_in = vec![0, 1, 2, 3, 0, 1, 2, 3, 4];
        let (upper, _lower) = ingest(&rows_in, &ptr_in).unwrap();
        let parent = etree::build(&upper);
        let order = postorder(&parent);
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn postorder_every_subtree_is_contiguous() {
        // chain 0->1->2->3->root(-1): already postordered trivially.
        let parent = vec![1, 2, 3, NONE];
        let order = postorder(&parent);
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn apply_preserves_invariant_parent_greater_than_self() {
        let ptr_in = vec![0, 1, 2, 3, 4, 9];
        let rows_in = vec![0, 1, 2, 3, 0, 1, 2, 3, 4];
        let (upper, _lower) = ingest(&rows_in, &ptr_in).unwrap();
        let parent = etree::build(&upper);
        let identity: Vec<usize> = (0..5).collect();
        let (tree, perm, iperm) = apply(&parent, &upper, &identity);
        for i in 0..5 {
            assert!(tree.parent[i] == NONE || tree.parent[i] > i as i64);
        }
        for k in 0..5 {
            assert_eq!(iperm[perm[k]], k);
        }
    }

    #[test]
    fn apply_on_disconnected_forest_has_multiple_roots() {
        let ptr_in = vec![0, 1, 2, 3];
        let rows_in = vec![0, 1, 2];
        let (upper, _lower) = ingest(&rows_in, &ptr_in).unwrap();
        let parent = etree::build(&upper);
        let identity: Vec<usize> = (0..3).collect();
        let (tree, _perm, _iperm) = apply(&parent, &upper, &identity);
        let roots = tree.parent.iter().filter(|&&p| p == NONE).count();
        assert_eq!(roots, 3);
    }
}
