//! evaluation — Nataf evaluators and the shared evaluation contract.
//!
//! Purpose
//! -------
//! Host the concrete elliptical-copula transforms and the [`Evaluation`]
//! trait through which pipelines drive them.
//!
//! Key behaviors
//! -------------
//! - [`InverseNatafEllipticalCopulaEvaluation`]: standard elliptical space →
//!   copula space (`y = F(L·u)`).
//! - [`NatafEllipticalCopulaEvaluation`]: copula space → standard elliptical
//!   space (`u = L⁻¹·F⁻¹(y)`).
//! - Batch evaluation in both directions runs one vectorized marginal call
//!   per coordinate and one triangular product/solve per batch.
//!
//! Invariants & assumptions
//! ------------------------
//! - Both evaluators are dimension preserving; the dimension is fixed by the
//!   Cholesky factor.
//! - Evaluation mutates only the instrumentation, through `&mut self`.
//!
//! Testing notes
//! -------------
//! - Each evaluator module carries unit tests for its numerical contract and
//!   failure paths; end-to-end pipelines live in `tests/`.

mod batch;
pub mod inverse_nataf;
pub mod nataf;
pub mod traits;

pub use self::inverse_nataf::InverseNatafEllipticalCopulaEvaluation;
pub use self::nataf::NatafEllipticalCopulaEvaluation;
pub use self::traits::Evaluation;
