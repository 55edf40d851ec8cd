//! Ambient configuration surface (`[FULL]` §6, following the teacher's
//! `KluConfig`-style `Default` + tunable-fields convention).

/// Which of the three interchangeable relaxation heuristics (§4.8) runs
/// during a single analysis. At most one runs per analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxHeuristic {
    /// H1 (fake-NZ): accept a merge if the new artificial-NZ count for the
    /// receiving supernode stays under [`AnalyseConfig::max_artificial_nz`].
    FakeNz,
    /// H2 (flop ratio): accept a merge if the merged-front flop count stays
    /// within `h2_ratio_bound` of the unmerged flop count.
    FlopRatio,
    /// H3 (fake-NZ fraction): accept a merge if the fraction of artificial
    /// nonzeros in the merged front stays under `h3_ratio_bound`.
    FakeNzFraction,
    /// No relaxation: ship the fundamental supernodes unmodified. Useful for
    /// testing and for callers who want maximal sparsity over front size.
    None,
}

/// Tunable constants for the analysis pipeline (§6 "Tuning constants",
/// `[FULL]` promoted into one `AnalyseConfig` struct with a `Default` impl,
/// matching `KluConfig`'s convention in the teacher crate).
#[derive(Debug, Clone, Copy)]
pub struct AnalyseConfig {
    /// Which relaxation heuristic to run. Defaults to [`RelaxHeuristic::FakeNz`].
    pub relax: RelaxHeuristic,
    /// H1 per-supernode fake-NZ cap. Chosen generously large by default so
    /// relaxation is a meaningful no-op unless the caller deliberately opts
    /// into tighter fronts, matching the original's "relaxation only merges
    /// if explicitly configured to" behaviour.
    pub max_artificial_nz: usize,
    /// H1 both-small rule threshold: when both parent and child supernode
    /// sizes fall below this, the secondary tie-break rule applies.
    pub small_sn_thresh: usize,
    /// H2 accept-merge ratio bound (default 1.2, per §4.8).
    pub h2_ratio_bound: f64,
    /// H3 accept-merge ratio bound (default 0.02, per §4.8).
    pub h3_ratio_bound: f64,
}

impl Default for AnalyseConfig {
    fn default() -> Self {
        Self {
            relax: RelaxHeuristic::FakeNz,
            max_artificial_nz: usize::MAX / 4,
            small_sn_thresh: 4,
            h2_ratio_bound: 1.2,
            h3_ratio_bound: 0.02,
        }
    }
}

impl AnalyseConfig {
    /// No relaxation at all: useful for tests that assert on the
    /// fundamental-supernode partition directly (Scenario A/F-style checks).
    pub fn no_relax() -> Self {
        Self {
            relax: RelaxHeuristic::None,
            ..Self::default()
        }
    }
}
