//! Symbolic analysis core for a sparse direct Cholesky solver (§1 OVERVIEW).
//!
//! Given the nonzero pattern of a symmetric positive-definite matrix, this
//! crate computes everything the numeric factorization needs before it
//! touches a single floating-point value: a fill-reducing ordering, the
//! elimination tree, column/row counts, the (optionally relaxed) supernode
//! partition, and the relative-index tables the numeric kernel walks at
//! runtime. No numeric factorization lives here — see `SPEC_FULL.md`
//! Non-goals.
//!
//! ```text
//! ingest -> order -> permute -> etree -> postorder -> colcount
//!        -> supernodes -> relax -> snpattern -> relind -> package
//! ```

pub mod analyse;
pub mod colcount;
pub mod config;
pub mod error;
pub mod etree;
pub mod matrix;
pub mod order;
pub mod pattern;
pub mod postorder;
pub mod relax;
pub mod relind;
pub mod snpattern;
pub mod supernodes;
pub mod symbolic;
pub mod utils;

#[cfg(feature = "dense-check")]
pub mod check;

pub use analyse::Analyse;
pub use config::{AnalyseConfig, RelaxHeuristic};
pub use error::{AnalyseError, AnalyseResult, PatternError};
pub use order::{AmdControl, AmdOrdering, Ordering, UserOrdering};
pub use pattern::CscPattern;
pub use symbolic::{StageTimings, Symbolic};
