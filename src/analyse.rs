//! The analysis workspace (§3/§7): wires the ten pipeline stages together
//! and packages the result into an immutable [`Symbolic`].
//!
//! Mirrors the teacher's "build once, consume once" workspace convention —
//! the same shape as `KluSymbolic`/solver-state objects elsewhere in the
//! corpus: construct from raw input, run the analysis exactly once, and
//! error out on a repeat attempt rather than silently reusing stale state.

use std::time::Instant;

use crate::colcount;
use crate::config::AnalyseConfig;
use crate::error::{AnalyseError, AnalyseResult};
use crate::etree;
use crate::order::Ordering;
use crate::pattern::{self, CscPattern};
use crate::postorder;
use crate::relax::{self, front_flops};
use crate::relind;
use crate::snpattern;
use crate::supernodes;
use crate::symbolic::{StageTimings, Symbolic};

/// A single-use symbolic analysis workspace.
pub struct Analyse {
    upper: CscPattern,
    lower: CscPattern,
    config: AnalyseConfig,
    consumed: bool,
}

impl Analyse {
    /// Ingest a raw CSC pattern (§4.1) and prepare an analysis workspace.
    pub fn new(rows_in: &[usize], ptr_in: &[usize], config: AnalyseConfig) -> AnalyseResult<Self> {
        let (upper, lower) = pattern::ingest(rows_in, ptr_in)?;
        Ok(Self {
            upper,
            lower,
            config,
            consumed: false,
        })
    }

    pub fn n(&self) -> usize {
        self.upper.n
    }

    /// Run the full pipeline exactly once, producing the packaged result.
    /// A second call on the same workspace returns [`AnalyseError::ConsumedWorkspace`].
    pub fn run(&mut self, ordering: &dyn Ordering) -> AnalyseResult<Symbolic> {
        if self.consumed {
            return Err(AnalyseError::ConsumedWorkspace);
        }
        self.consumed = true;
        let mut timings = StageTimings::default();
        let n = self.upper.n;

        let t = Instant::now();
        let (perm, iperm) = ordering.order(&self.upper, &self.lower)?;
        timings.ordering = t.elapsed();

        let t = Instant::now();
        let (ptr_p, rows_p) = pattern::permute_upper(n, &self.upper.ptr, &self.upper.rows, &iperm);
        let (ptr_l, rows_l) = pattern::transpose(n, &ptr_p, &rows_p);
        let (ptr_u, rows_u) = pattern::transpose(n, &ptr_l, &rows_l);
        let upper = CscPattern {
            n,
            ptr: ptr_u,
            rows: rows_u,
        };
        let lower = CscPattern {
            n,
            ptr: ptr_l,
            rows: rows_l,
        };
        let parent = etree::build(&upper);
        timings.etree = t.elapsed();

        let t = Instant::now();
        let (tree, perm, iperm) = postorder::apply(&parent, &upper, &perm);
        debug_assert!((0..n).all(|k| iperm[perm[k]] == k));
        timings.postorder = t.elapsed();

        let t = Instant::now();
        let cc = colcount::compute(&tree.upper, &tree.lower, &tree.parent);
        timings.colcount = t.elapsed();

        let t = Instant::now();
        let fundamental = supernodes::detect(&tree.lower, &tree.parent);
        timings.supernodes = t.elapsed();

        // Flop estimate for the fundamental (un-relaxed) partition, used
        // below to attribute how much of the final operation count is
        // purely an artifact of relaxation's padding.
        let operations_no_relax: f64 = (0..fundamental.sn_count)
            .map(|s| {
                let lo = fundamental.sn_start[s];
                let hi = fundamental.sn_start[s + 1];
                let f = hi - lo;
                let r = cc.colcount[lo] - f;
                front_flops(f, r)
            })
            .sum();

        let t = Instant::now();
        let (relaxed, perm, iperm) = relax::apply(&fundamental, &cc.colcount, &tree.parent, &tree.upper, &perm, &self.config);
        timings.relax = t.elapsed();

        let t = Instant::now();
        let snp = snpattern::build(&relaxed.upper, &relaxed.parent, &relaxed.sn_start, relaxed.sn_count);
        timings.snpattern = t.elapsed();

        let sn = crate::supernodes::Supernodes {
            sn_count: relaxed.sn_count,
            sn_belong: relaxed.sn_belong.clone(),
            sn_start: relaxed.sn_start.clone(),
            sn_parent: relaxed.sn_parent.clone(),
        };

        let t = Instant::now();
        let rc = relind::relind_cols(&sn, &snp, &relaxed.lower);
        let rcl = relind::relind_clique(&sn, &snp);
        let mut consecutive_sums = Vec::with_capacity(sn.sn_count);
        for s in 0..sn.sn_count {
            let slice = &rcl.rel[rcl.ptr[s]..rcl.ptr[s + 1]];
            consecutive_sums.push(relind::consecutive_sums(slice)?);
        }
        timings.relind = t.elapsed();

        // Scalar summaries (§4.11, `[FULL]`).
        let mut nz_l = 0usize;
        let mut operations = 0.0f64;
        let mut largest_front = 0usize;
        let mut largest_sn = 0usize;
        let mut assembly_op = 0.0f64;
        for s in 0..sn.sn_count {
            let lo = sn.sn_start[s];
            let hi = sn.sn_start[s + 1];
            let f = hi - lo;
            let front_len = snp.sn_indices(s).len();
            let r = front_len - f;
            nz_l += f * front_len - f * f.saturating_sub(1) / 2;
            operations += front_flops(f, r);
            largest_front = largest_front.max(front_len);
            largest_sn = largest_sn.max(f);
            if sn.sn_parent[s] != crate::utils::NONE {
                assembly_op += (r as f64) * ((r + 1) as f64) / 2.0;
            }
        }
        let artificial_op = (operations - operations_no_relax).max(0.0);
        let fillin = nz_l as f64 / self.upper.nnz() as f64;

        Ok(Symbolic {
            n,
            nz_l,
            operations,
            sn_count: sn.sn_count,
            artificial_nz: relaxed.artificial_nz,
            artificial_op,
            assembly_op,
            largest_front,
            largest_sn,
            fillin,
            perm,
            iperm,
            sn_parent: sn.sn_parent,
            sn_start: sn.sn_start,
            ptr_lsn: snp.ptr_lsn,
            rows_lsn: snp.rows_lsn,
            relind_cols_ptr: rc.ptr,
            relind_cols: rc.rel,
            relind_clique_ptr: rcl.ptr,
            relind_clique: rcl.rel,
            consecutive_sums,
            rowcount: cc.rowcount,
            timings,
        })
    }
}
