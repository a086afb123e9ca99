//! transformation — Nataf transforms for elliptical copulas.
//!
//! Purpose
//! -------
//! Provide the inverse Nataf map (standard elliptical space → copula space)
//! and its forward counterpart for elliptical copulas, together with the
//! building blocks they are made of and a versioned persistence layer. This is
//! the main entry point of the crate.
//!
//! Key behaviors
//! -------------
//! - [`core`] holds the Cholesky factor algebra, the standard elliptical
//!   family and its common marginal, descriptions, instrumentation, runtime
//!   options, and input validation.
//! - [`evaluation`] holds the [`Evaluation`] trait and the two evaluators,
//!   [`InverseNatafEllipticalCopulaEvaluation`] and
//!   [`NatafEllipticalCopulaEvaluation`].
//! - [`persistence`] saves and reloads evaluators as versioned JSON archives.
//! - [`errors`] centralizes [`TransformError`] / [`TransformResult`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Transforms are dimension preserving; the dimension is the size of the
//!   Cholesky factor and must match the distribution dimension.
//! - Evaluation is deterministic. Batch row `j` equals the point evaluation of
//!   row `j` exactly, whether or not the batch ran in parallel.
//! - Call counters only grow; history is captured only while enabled.
//! - Instances are single-writer (`&mut self` evaluation); clone them for
//!   concurrent callers.
//!
//! Conventions
//! -----------
//! - Points are `ndarray` 1-D arrays of length `n`; samples are `m×n` tables
//!   with one point per row.
//! - Errors are returned, never masked; failed calls leave counters and
//!   history unchanged.
//! - The stack emits `tracing` events at `debug`/`trace` level and installs no
//!   subscriber.
//!
//! Downstream usage
//! ----------------
//! 1. Build a [`CholeskyFactor`], either directly from `L` or from a
//!    correlation matrix via [`CholeskyFactor::from_correlation`].
//! 2. Pick a [`StandardElliptical`] of the same dimension.
//! 3. Construct [`InverseNatafEllipticalCopulaEvaluation::new`] and call
//!    `evaluate` / `evaluate_sample`; use `inverse()` for the forward map.
//! 4. Persist with `save` / `load`.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/integration_nataf_pipeline.rs`
//!   exercises the full public surface.

pub mod core;
pub mod errors;
pub mod evaluation;
pub mod persistence;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    CholeskyFactor, Description, EllipticalMarginal, EvaluationHistory, EvaluationOptions,
    HistoryRecord, StandardElliptical,
};

pub use self::errors::{TransformError, TransformResult};

pub use self::evaluation::{
    Evaluation, InverseNatafEllipticalCopulaEvaluation, NatafEllipticalCopulaEvaluation,
};

pub use self::persistence::{ARCHIVE_VERSION, EvaluationArchive};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_copulas::transformation::prelude::*;
//
// to import the main transformation surface in a single line.

pub mod prelude {
    pub use super::{
        CholeskyFactor, Evaluation, EvaluationOptions, HistoryRecord,
        InverseNatafEllipticalCopulaEvaluation, NatafEllipticalCopulaEvaluation,
        StandardElliptical, TransformError, TransformResult,
    };
}
