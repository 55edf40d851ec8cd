//! The symmetric sparsity pattern the analysis core operates on.
//!
//! A [`CscPattern`] stores only column pointers and row indices — no
//! numeric values — because every stage of the symbolic analysis (§4 of
//! `SPEC_FULL.md`) only ever needs the nonzero structure. Value-carrying
//! matrices for ingestion/benchmarking live in [`crate::matrix`].

use crate::error::PatternError;

/// A compressed-sparse-column sparsity pattern: `rows[ptr[j]..ptr[j+1]]`
/// are the (strictly ascending) row indices stored in column j.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CscPattern {
    pub n: usize,
    pub ptr: Vec<usize>,
    pub rows: Vec<usize>,
}

impl CscPattern {
    pub fn nnz(&self) -> usize {
        self.rows.len()
    }

    pub fn col(&self, j: usize) -> &[usize] {
        &self.rows[self.ptr[j]..self.ptr[j + 1]]
    }

    pub fn col_start(&self, j: usize) -> usize {
        self.ptr[j]
    }

    pub fn col_end(&self, j: usize) -> usize {
        self.ptr[j + 1]
    }

    /// Build from raw `(rows, ptr)`, validating the CSC invariants that the
    /// rest of the pipeline relies on: monotone pointers and in-range,
    /// strictly-increasing row indices per column. Does *not* require the
    /// pattern to already be upper-triangular — callers pass it through
    /// [`ingest`] for that.
    pub fn from_raw(rows: Vec<usize>, ptr: Vec<usize>) -> Result<Self, PatternError> {
        if ptr.is_empty() {
            return Err(PatternError::InvalidPointerLength {
                expected: 1,
                actual: 0,
            });
        }
        let n = ptr.len() - 1;
        for j in 0..n {
            if ptr[j] > ptr[j + 1] {
                return Err(PatternError::PointersNotMonotone {
                    index: j,
                    prev: ptr[j],
                    next: ptr[j + 1],
                });
            }
        }
        if *ptr.last().unwrap() != rows.len() {
            return Err(PatternError::PointersNotMonotone {
                index: n,
                prev: rows.len(),
                next: *ptr.last().unwrap(),
            });
        }
        for j in 0..n {
            let mut prev: Option<usize> = None;
            for (k, &r) in rows[ptr[j]..ptr[j + 1]].iter().enumerate() {
                if r >= n {
                    return Err(PatternError::RowOutOfBounds {
                        entry: ptr[j] + k,
                        row: r,
                        n,
                    });
                }
                if let Some(p) = prev {
                    if r <= p {
                        return Err(PatternError::RowOutOfBounds {
                            entry: ptr[j] + k,
                            row: r,
                            n,
                        });
                    }
                }
                prev = Some(r);
            }
        }
        Ok(CscPattern { n, ptr, rows })
    }
}

/// Transpose a CSC pattern: column j of the result holds the indices i such
/// that i was a row index in some column of the original with that column
/// becoming the new row index. O(n + nnz), counting-sort based (§4.1/4.5).
pub fn transpose(n: usize, ptr: &[usize], rows: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let mut counts = vec![0usize; n];
    for &r in rows {
        counts[r] += 1;
    }
    let mut new_ptr = vec![0usize; n + 1];
    for i in 0..n {
        new_ptr[i + 1] = new_ptr[i] + counts[i];
    }
    let mut next = new_ptr.clone();
    let mut new_rows = vec![0usize; rows.len()];
    for j in 0..n {
        for &r in &rows[ptr[j]..ptr[j + 1]] {
            let p = next[r];
            new_rows[p] = j;
            next[r] += 1;
        }
    }
    (new_ptr, new_rows)
}

/// Number of distinct values in an already-sorted slice.
fn count_distinct(sorted: &[usize]) -> usize {
    let mut count = 0;
    let mut prev = None;
    for &v in sorted {
        if prev != Some(v) {
            count += 1;
            prev = Some(v);
        }
    }
    count
}

/// Symmetric permutation into a strictly-upper, deduplicated pattern (§4.3).
///
/// Every stored entry `(i, j)` of the input — regardless of which triangle
/// it happens to be stored in, or whether it's the diagonal — is folded to
/// its symmetric destination `(min(iperm[i], iperm[j]), max(iperm[i],
/// iperm[j]))`. This preserves a half-symmetric (upper-only or lower-only)
/// input exactly, since each logical entry is stored once and simply moves
/// to its correct upper-triangular slot; a full-symmetric input (both
/// triangles stored) has both physical copies of the same logical entry
/// fold to the *same* destination column (they share the same
/// `max(iperm[i], iperm[j])` regardless of which triangle contributed
/// them), so a per-column sort-and-collapse pass afterwards squashes them
/// into one stored entry — the same two-phase "fold, then dedup the
/// bucket" CHOLMOD's `Analyse.cpp` uses for the equivalent problem.
pub fn permute_upper(
    n: usize,
    ptr: &[usize],
    rows: &[usize],
    iperm: &[usize],
) -> (Vec<usize>, Vec<usize>) {
    // Pass 1: bucket every entry by destination column (not yet
    // deduplicated — both copies of a full-symmetric entry land in the
    // same bucket, see above).
    let mut raw_counts = vec![0usize; n];
    for j in 0..n {
        let pj = iperm[j];
        for &i in &rows[ptr[j]..ptr[j + 1]] {
            raw_counts[iperm[i].max(pj)] += 1;
        }
    }
    let mut raw_ptr = vec![0usize; n + 1];
    for c in 0..n {
        raw_ptr[c + 1] = raw_ptr[c] + raw_counts[c];
    }
    let mut next = raw_ptr.clone();
    let mut raw_rows = vec![0usize; *raw_ptr.last().unwrap()];
    for j in 0..n {
        let pj = iperm[j];
        for &i in &rows[ptr[j]..ptr[j + 1]] {
            let pi = iperm[i];
            let (row, col) = (pi.min(pj), pi.max(pj));
            let p = next[col];
            raw_rows[p] = row;
            next[col] += 1;
        }
    }

    // Pass 2: sort each bucket and collapse duplicate rows.
    for c in 0..n {
        raw_rows[raw_ptr[c]..raw_ptr[c + 1]].sort_unstable();
    }
    let counts: Vec<usize> = (0..n)
        .map(|c| count_distinct(&raw_rows[raw_ptr[c]..raw_ptr[c + 1]]))
        .collect();

    let mut new_ptr = vec![0usize; n + 1];
    for c in 0..n {
        new_ptr[c + 1] = new_ptr[c] + counts[c];
    }
    let mut write = new_ptr.clone();
    let mut new_rows = vec![0usize; *new_ptr.last().unwrap()];
    for c in 0..n {
        let mut prev = None;
        for &r in &raw_rows[raw_ptr[c]..raw_ptr[c + 1]] {
            if prev != Some(r) {
                let p = write[c];
                new_rows[p] = r;
                write[c] += 1;
                prev = Some(r);
            }
        }
    }

    (new_ptr, new_rows)
}

/// Double-transpose: sorts row indices within each column and is idempotent
/// on an already-sorted pattern. Used after every repermutation.
pub fn sort_columns(n: usize, ptr: &[usize], rows: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let (ptr_t, rows_t) = transpose(n, ptr, rows);
    transpose(n, &ptr_t, &rows_t)
}

/// Ingest a raw (possibly full-symmetric, possibly half-symmetric, possibly
/// diagonal-including) CSC pattern and canonicalise it into a strict
/// upper-triangle view plus its derived lower-triangle dual (§4.1).
///
/// An identity symmetric-permutation pass (§4.3) folds every stored entry
/// to its upper-triangular slot and squashes any duplicate triangle
/// entries; a single transpose then derives the lower-triangle dual (and,
/// since `permute_upper` already returns column-sorted buckets, a second
/// transpose to re-sort is unnecessary).
pub fn ingest(rows_in: &[usize], ptr_in: &[usize]) -> Result<(CscPattern, CscPattern), PatternError> {
    if ptr_in.is_empty() {
        return Err(PatternError::InvalidPointerLength {
            expected: 1,
            actual: 0,
        });
    }
    let n = ptr_in.len() - 1;
    for j in 0..n {
        if ptr_in[j] > ptr_in[j + 1] {
            return Err(PatternError::PointersNotMonotone {
                index: j,
                prev: ptr_in[j],
                next: ptr_in[j + 1],
            });
        }
    }
    let nz_in = *ptr_in.last().unwrap();
    if nz_in != rows_in.len() {
        return Err(PatternError::PointersNotMonotone {
            index: n,
            prev: rows_in.len(),
            next: nz_in,
        });
    }
    for (entry, &row) in rows_in.iter().enumerate() {
        if row >= n {
            return Err(PatternError::RowOutOfBounds { entry, row, n });
        }
    }

    // Identity symmetric permutation: folds every stored entry straight to
    // its upper-triangular slot, regardless of which triangle(s) the
    // caller's raw pattern stored it in, and dedups any entry present in
    // both triangles.
    let identity: Vec<usize> = (0..n).collect();
    let (ptr_upper, rows_upper) = permute_upper(n, ptr_in, rows_in, &identity);

    // Double transpose to derive the lower-triangle view (re-sorting upper
    // is a no-op here since `permute_upper` already returns sorted buckets).
    let (ptr_lower, rows_lower) = transpose(n, &ptr_upper, &rows_upper);
    let (ptr_upper, rows_upper) = transpose(n, &ptr_lower, &rows_lower);

    let upper = CscPattern {
        n,
        ptr: ptr_upper,
        rows: rows_upper,
    };
    let lower = CscPattern {
        n,
        ptr: ptr_lower,
        rows: rows_lower,
    };
    Ok((upper, lower))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_arrowhead_extracts_upper_triangle() {
        // Scenario A from SPEC_FULL.md: 5x5 arrowhead, upper triangle input.
        // col4 = [0,1,2,3,4] (the diagonal plus every arrowhead spine entry),
        // so nzU = 4 (singleton diagonals) + 5 = 9.
        let ptr_in = vec![0, 1, 2, 3, 4, 9];
        let rows_in = vec![0, 1, 2, 3, 0, 1, 2, 3, 4];
        let (upper, lower) = ingest(&rows_in, &ptr_in).unwrap();
        assert_eq!(upper.ptr, vec![0, 1, 2, 3, 4, 9]);
        assert_eq!(upper.rows, vec![0, 1, 2, 3, 0, 1, 2, 3, 4]);
        assert_eq!(lower.nnz(), upper.nnz());
    }

    #[test]
    fn ingest_rejects_out_of_bounds_row() {
        let ptr_in = vec![0, 1];
        let rows_in = vec![5];
        let err = ingest(&rows_in, &ptr_in).unwrap_err();
        assert!(matches!(err, PatternError::RowOutOfBounds { .. }));
    }

    #[test]
    fn ingest_squashes_full_symmetric_input_into_upper() {
        // Same arrowhead, but given as a full (both-triangle) pattern.
        let ptr_in = vec![0, 2, 4, 6, 8, 13];
        let rows_in = vec![0, 4, 1, 4, 2, 4, 3, 4, 0, 1, 2, 3, 4];
        let (upper, _lower) = ingest(&rows_in, &ptr_in).unwrap();
        assert_eq!(upper.ptr, vec![0, 1, 2, 3, 4, 9]);
        assert_eq!(upper.rows, vec![0, 1, 2, 3, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn ingest_preserves_half_symmetric_upper_only_input() {
        // A pure upper-only arrowhead must survive ingest unchanged: no
        // off-diagonal entry may be dropped just because it isn't also
        // mirrored into the lower triangle.
        let ptr_in = vec![0, 1, 2, 3, 4, 9];
        let rows_in = vec![0, 1, 2, 3, 0, 1, 2, 3, 4];
        let (upper, _lower) = ingest(&rows_in, &ptr_in).unwrap();
        assert_eq!(upper.nnz(), 9);
        assert_eq!(upper.col(4), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn ingest_accepts_half_symmetric_lower_only_input() {
        // The same arrowhead, but given as a lower-triangle-only pattern
        // (col j lists rows i >= j): column j carries its own diagonal plus
        // the spine entry (4, j).
        let ptr_in = vec![0, 2, 4, 6, 8, 9];
        let rows_in = vec![0, 4, 1, 4, 2, 4, 3, 4, 4];
        let (upper, _lower) = ingest(&rows_in, &ptr_in).unwrap();
        assert_eq!(upper.ptr, vec![0, 1, 2, 3, 4, 9]);
        assert_eq!(upper.rows, vec![0, 1, 2, 3, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn sort_columns_is_idempotent() {
        let ptr = vec![0, 1, 2, 3, 4, 9];
        let rows = vec![0, 1, 2, 3, 0, 1, 2, 3, 4];
        let (p1, r1) = sort_columns(5, &ptr, &rows);
        let (p2, r2) = sort_columns(5, &p1, &r1);
        assert_eq!(p1, p2);
        assert_eq!(r1, r2);
    }
}
