//! Relative-index tables (§4.10): positions of a supernode's own columns,
//! and of its clique rows in its parent's front, expressed as indices into
//! the parent's/own front rather than absolute row numbers. These are what
//! the numeric factorization actually walks at runtime; everything above
//! this module only ever produces the symbolic pattern they index into.

use crate::error::{AnalyseError, AnalyseResult};
use crate::pattern::CscPattern;
use crate::snpattern::SnPattern;
use crate::supernodes::Supernodes;
use crate::utils::NONE;

/// `relindCols[e]`: position, within the owning supernode's front, of the
/// row of *original-matrix* entry e — not of L's (possibly padded) fill
/// pattern. Indexed exactly like the final permuted lower-triangle pattern
/// itself (`ptr[c]..ptr[c+1]` are column c's entries, in the same order as
/// `lower.col(c)`), since the numeric phase already holds that same
/// `lower` pattern (it permutes the caller's own matrix by `perm`) and can
/// reuse its pointers verbatim.
pub struct RelIndCols {
    pub ptr: Vec<usize>,
    pub rel: Vec<usize>,
}

/// `relindClique[s]`: position of each of s's clique rows (the rows beyond
/// its own diagonal block) within its parent supernode's front. Empty for
/// roots. Ragged: length varies per supernode.
pub struct RelIndClique {
    pub ptr: Vec<usize>,
    pub rel: Vec<usize>,
}

/// Two ascending, subset-related row lists merged in lockstep: for every
/// entry of `needle` (which must be a subset of `haystack`), the position
/// it occupies in `haystack`.
fn lockstep_positions(needle: &[usize], haystack: &[usize]) -> Vec<usize> {
    let mut rel = Vec::with_capacity(needle.len());
    let mut h = 0;
    for &row in needle {
        while haystack[h] != row {
            h += 1;
            debug_assert!(h < haystack.len(), "needle row {row} not found in haystack");
        }
        rel.push(h);
    }
    rel
}

/// Build `relindCols` (§4.10 "Columns"): for each column c of supernode s,
/// walk `lower.col(c)` (the *original-matrix* lower-triangle entries of c,
/// in the final permuted/postordered/relaxed coordinate system) and the
/// supernodal front `snIndices[s]` in lockstep — both ascending, and the
/// former always a subset of the latter — recording the position each
/// original entry occupies in the front.
///
/// Grounded directly on the source's `RelativeInd_cols`: note this walks
/// `rowsLower`, not L's (possibly relaxation-padded) fill pattern, so the
/// output is sized `nnz(lower)`, not `nzL`.
pub fn relind_cols(sn: &Supernodes, snp: &SnPattern, lower: &CscPattern) -> RelIndCols {
    let mut rel = vec![0usize; lower.nnz()];
    for s in 0..sn.sn_count {
        let front = snp.sn_indices(s);
        let lo = sn.sn_start[s];
        let hi = sn.sn_start[s + 1];
        for c in lo..hi {
            let needle = lower.col(c);
            let positions = lockstep_positions(needle, front);
            let base = lower.col_start(c);
            rel[base..base + positions.len()].copy_from_slice(&positions);
        }
    }
    RelIndCols {
        ptr: lower.ptr.clone(),
        rel,
    }
}

/// Build `relindClique`: for each non-root supernode, the position of its
/// clique rows (`snIndices[s][ncols..]`) within its parent's front.
pub fn relind_clique(sn: &Supernodes, snp: &SnPattern) -> RelIndClique {
    let mut ptr = vec![0usize; sn.sn_count + 1];
    let mut rel = Vec::new();
    for s in 0..sn.sn_count {
        let parent = sn.sn_parent[s];
        if parent == NONE {
            ptr[s + 1] = rel.len();
            continue;
        }
        let ncols = sn.sn_start[s + 1] - sn.sn_start[s];
        let front = snp.sn_indices(s);
        let clique = &front[ncols..];
        let parent_front = snp.sn_indices(parent as usize);
        rel.extend(lockstep_positions(clique, parent_front));
        ptr[s + 1] = rel.len();
    }
    RelIndClique { ptr, rel }
}

/// `consecutiveSums[s]` (§4.10): same length as `relindClique[s]`. Entry k
/// is the number of consecutive clique rows starting at k whose
/// parent-frontal offsets are themselves consecutive, so the numeric
/// kernel can coalesce a run of scatter writes into a single BLAS-3 call
/// instead of one entry at a time.
///
/// Two passes, exactly the source algorithm: first the forward difference
/// `relind[k+1] - relind[k]` (the last entry is seeded to 1, having no
/// successor), then a reverse pass collapsing every run of consecutive
/// `1`s into its run length.
pub fn consecutive_sums(rel: &[usize]) -> AnalyseResult<Vec<usize>> {
    let len = rel.len();
    if len == 0 {
        return Ok(Vec::new());
    }
    let mut sums = vec![0i64; len];
    for i in 0..len - 1 {
        sums[i] = rel[i + 1] as i64 - rel[i] as i64;
    }
    sums[len - 1] = 1;

    for i in (0..len - 1).rev() {
        if sums[i] > 1 {
            sums[i] = 1;
        } else if sums[i] == 1 {
            sums[i] = sums[i + 1] + 1;
        } else {
            return Err(AnalyseError::invariant(
                "consecutive_sums",
                format!("entry {i} has difference {} < 1, pattern is not sorted", sums[i]),
            ));
        }
    }

    Ok(sums.into_iter().map(|v| v as usize).collect())
}
