//! core — shared building blocks for elliptical-copula transforms.
//!
//! Purpose
//! -------
//! Collect the pieces every Nataf evaluator is assembled from: the validated
//! Cholesky factor, the standard elliptical family and its common marginal,
//! default descriptions, instrumentation (call counter and history), runtime
//! options, and input validation.
//!
//! Key behaviors
//! -------------
//! - [`CholeskyFactor`] owns the triangular algebra (`L·u`, `L·U`, `L⁻¹·z`,
//!   `L⁻¹·Z`) and the factorization of correlation matrices.
//! - [`StandardElliptical`] yields the representative [`EllipticalMarginal`]
//!   with scalar and vectorized CDF/quantile entry points.
//! - [`Instrumentation`] counts calls and captures history per evaluator.
//! - [`validation`] rejects malformed inputs before any state changes.
//!
//! Invariants & assumptions
//! ------------------------
//! - Cholesky factors are square, non-empty, finite, and lower triangular.
//! - All coordinates of a standard elliptical distribution share one marginal
//!   law; nothing here checks elliptical symmetry.
//! - Call counters are monotone.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based. Samples are `m×n` tables (rows = points); the
//!   linear-algebra routines work on `n×m` operands (rows = coordinates).
//! - This module logs only at `debug` level and performs no I/O.
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule cover validation paths, triangular
//!   products/solves and their column consistency, marginal reference values,
//!   and history bookkeeping.

pub mod cholesky;
pub mod description;
pub mod elliptical;
pub mod history;
pub mod options;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::cholesky::CholeskyFactor;
pub use self::description::Description;
pub use self::elliptical::{EllipticalMarginal, StandardElliptical};
pub use self::history::{EvaluationHistory, HistoryRecord, Instrumentation};
pub use self::options::{DEFAULT_PARALLEL_THRESHOLD, EvaluationOptions};
pub use self::validation::{
    validate_point, validate_probability_point, validate_probability_sample, validate_sample,
};
