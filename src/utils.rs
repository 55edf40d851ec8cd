//! Small arena-of-integers helpers shared by several pipeline stages.
//!
//! The elimination tree and supernodal tree are parent arrays with `-1`
//! sentinels rather than node objects with back-pointers (§9 of
//! `SPEC_FULL.md`); children are synthesised on demand as head/next linked
//! lists over plain index arrays. Everything here operates on that
//! convention.

/// Sentinel for "no parent" / "unvisited", mirroring the C convention used
/// throughout the algorithm this crate is grounded on.
pub const NONE: i64 = -1;

/// `iperm[perm[k]] = k` for all k.
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut iperm = vec![0usize; perm.len()];
    for (k, &i) in perm.iter().enumerate() {
        iperm[i] = k;
    }
    iperm
}

/// Checks that `perm` is a valid permutation of `0..n`.
pub fn is_valid_permutation(perm: &[usize], n: usize) -> bool {
    if perm.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &p in perm {
        if p >= n || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}

/// `new[k] = old[reorder[k]]` — the "gather" used to compose a permutation
/// into an existing vector (e.g. `perm` through a postorder or a
/// relaxation's supernodal permutation).
pub fn permute_vector(old: &[usize], reorder: &[usize]) -> Vec<usize> {
    reorder.iter().map(|&k| old[k]).collect()
}

/// Convert a counts array (`counts[i]` = size of bucket i) into a CSC
/// pointer array (`ptr[i+1] - ptr[i] = counts[i]`, `ptr[0] = 0`) via prefix
/// sum. Returns the pointer array; `counts` is left untouched.
pub fn counts_to_ptr(counts: &[usize]) -> Vec<usize> {
    let mut ptr = vec![0usize; counts.len() + 1];
    for i in 0..counts.len() {
        ptr[i + 1] = ptr[i] + counts[i];
    }
    ptr
}

/// Build a head/next singly linked list of the children of each node from a
/// `parent` array with `-1` roots. Children of a node are linked in
/// ascending original-index order (a concrete, deterministic tie-break; see
/// `DESIGN.md`).
pub fn children_linked_list(parent: &[i64]) -> (Vec<i64>, Vec<i64>) {
    let n = parent.len();
    let mut head = vec![NONE; n];
    let mut next = vec![NONE; n];
    for i in (0..n).rev() {
        let p = parent[i];
        if p != NONE {
            next[i] = head[p as usize];
            head[p as usize] = i as i64;
        }
    }
    (head, next)
}

/// Size of the subtree rooted at each node of a postordered tree (every
/// child has a strictly smaller index than its parent, so a single forward
/// pass suffices: by the time node i is visited, every child of i has
/// already folded its size into `sizes[i]`).
pub fn subtree_sizes(parent: &[i64]) -> Vec<usize> {
    let n = parent.len();
    let mut sizes = vec![1usize; n];
    for i in 0..n {
        let p = parent[i];
        if p != NONE {
            sizes[p as usize] += sizes[i];
        }
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_permutation_round_trips() {
        let perm = vec![2, 0, 3, 1];
        let iperm = inverse_permutation(&perm);
        for k in 0..perm.len() {
            assert_eq!(iperm[perm[k]], k);
        }
    }

    #[test]
    fn children_linked_list_visits_all_children() {
        // tree: 0 -> 2, 1 -> 2, 2 -> 3, 3 root
        let parent = vec![2, 2, 3, NONE];
        let (head, next) = children_linked_list(&parent);
        let mut kids = vec![];
        let mut c = head[2];
        while c != NONE {
            kids.push(c);
            c = next[c as usize];
        }
        kids.sort();
        assert_eq!(kids, vec![0, 1]);
    }

    #[test]
    fn subtree_sizes_simple_chain() {
        // 0 -> 1 -> 2 -> root(-1)
        let parent = vec![1, 2, NONE];
        assert_eq!(subtree_sizes(&parent), vec![1, 2, 3]);
    }

    #[test]
    fn subtree_sizes_arrowhead() {
        let parent = vec![4, 4, 4, 4, NONE];
        assert_eq!(subtree_sizes(&parent), vec![1, 1, 1, 1, 5]);
    }
}
