//! Advisory dense Cholesky verification (§8 Scenario E, `[FULL]` §4.11).
//!
//! Gated behind the `dense-check` feature: builds a dense, permuted copy of
//! the input matrix and attempts an LAPACK `dpotrf` (via `ndarray-linalg`)
//! to confirm the matrix really is symmetric positive definite. This is a
//! debugging aid, never consulted by [`crate::analyse::Analyse`] itself and
//! never part of a packaged [`crate::symbolic::Symbolic`] — a caller who
//! wants the guarantee asks for it explicitly.

use ndarray::Array2;
use ndarray_linalg::Cholesky;
use ndarray_linalg::UPLO;

use crate::error::{AnalyseError, AnalyseResult};
use crate::pattern::CscPattern;

/// Attempt a dense Cholesky factorization of the symmetric matrix described
/// by `upper` (diagonal values taken from `diag`, off-diagonals from
/// `values` in the same order as `upper`'s stored entries) under the given
/// permutation. Returns `Ok(())` if LAPACK accepts it as SPD, or an error
/// describing the failure otherwise.
pub fn check(upper: &CscPattern, values: &[f64], perm: &[usize]) -> AnalyseResult<()> {
    let n = upper.n;
    if values.len() != upper.nnz() {
        return Err(AnalyseError::invariant(
            "check",
            format!("expected {} values, got {}", upper.nnz(), values.len()),
        ));
    }

    let mut dense = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        for (k, &i) in upper.col(j).iter().enumerate() {
            let v = values[upper.col_start(j) + k];
            let (pi, pj) = (perm[i], perm[j]);
            dense[[pi, pj]] = v;
            dense[[pj, pi]] = v;
        }
    }

    dense
        .cholesky(UPLO::Lower)
        .map(|_| ())
        .map_err(|e| AnalyseError::invariant("check", format!("dense Cholesky failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::ingest;

    #[test]
    fn spd_arrowhead_passes() {
        // Strongly diagonally dominant arrowhead: guaranteed SPD.
        let ptr_in = vec![0, 1, 2, 3, 4, 9];
        let rows_in = vec![0, 1, 2, 3, 0, 1, 2, 3, 4];
        let (upper, _lower) = ingest(&rows_in, &ptr_in).unwrap();
        let values = vec![4.0, 4.0, 4.0, 4.0, 0.1, 0.1, 0.1, 0.1, 4.0];
        let perm: Vec<usize> = (0..5).collect();
        assert!(check(&upper, &values, &perm).is_ok());
    }

    #[test]
    fn indefinite_matrix_fails() {
        let ptr_in = vec![0, 1, 3];
        let rows_in = vec![0, 0, 1];
        let (upper, _lower) = ingest(&rows_in, &ptr_in).unwrap();
        // [[1, 5], [5, 1]] is indefinite.
        let values = vec![1.0, 5.0, 1.0];
        let perm: Vec<usize> = (0..2).collect();
        assert!(check(&upper, &values, &perm).is_err());
    }
}
