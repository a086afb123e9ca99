//! Errors for Nataf transformations (construction checks, input validation,
//! distribution failures, and archive round-trips).
//!
//! This module defines [`TransformError`], the single error type used across
//! the transformation stack, and the [`TransformResult`] alias. It implements
//! `Display`/`Error`, absorbs `statrs` and `serde_json` errors through `From`,
//! and converts to `PyErr` when the `python-bindings` feature is enabled.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy); `row` indexes sample points
//!   and `col` indexes coordinates.
//! - Errors raised by the marginal distribution are propagated as-is; they are
//!   never replaced by a default value.
//! - Every fallible operation validates before it mutates, so an `Err` never
//!   leaves a partially updated counter or history behind.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};
use statrs::distribution::{NormalError, StudentsTError};

/// Crate-wide result alias for operations that may produce [`TransformError`].
pub type TransformResult<T> = Result<T, TransformError>;

/// Unified error type for Nataf transformations.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    // ---- Cholesky factor ----
    /// Cholesky factor has no rows.
    EmptyCholesky,

    /// Cholesky factor must be square.
    NonSquareCholesky { rows: usize, cols: usize },

    /// Cholesky factor entries must be finite.
    NonFiniteCholesky { row: usize, col: usize, value: f64 },

    /// Entries above the diagonal must be exactly zero.
    NotLowerTriangular { row: usize, col: usize, value: f64 },

    /// Forward substitution requires a non-zero diagonal.
    SingularCholesky { index: usize, value: f64 },

    // ---- Correlation matrix ----
    /// Correlation matrix entry violates the correlation contract.
    InvalidCorrelation { row: usize, col: usize, value: f64, reason: &'static str },

    /// Correlation matrix has no Cholesky factorization.
    NotPositiveDefinite,

    // ---- Distribution ----
    /// Student degrees of freedom must be finite and > 0.
    InvalidDegreesOfFreedom { value: f64 },

    /// Distribution dimension differs from the Cholesky factor dimension.
    DistributionDimensionMismatch { expected: usize, actual: usize },

    /// Marginal index exceeds the distribution dimension.
    MarginalOutOfRange { index: usize, dimension: usize },

    // ---- Input validation ----
    /// Input point or sample has the wrong number of coordinates.
    DimensionMismatch { expected: usize, actual: usize },

    /// Input coordinate is NaN.
    NanInput { row: usize, col: usize },

    /// Input coordinate is ±inf.
    NonFiniteInput { row: usize, col: usize, value: f64 },

    /// Copula-space coordinate lies outside the open interval (0, 1).
    InvalidProbability { row: usize, col: usize, value: f64 },

    // ---- Persistence ----
    /// Archive was written with an unknown schema version.
    UnsupportedArchiveVersion { found: u32, supported: u32 },

    /// Archive holds a different evaluation class.
    ArchiveClassMismatch { expected: &'static str, found: String },

    /// Archive content is inconsistent.
    CorruptArchive { reason: String },

    /// Wrapper for serde_json::Error
    Serialization(String),

    // ---- statrs distribution errors ----
    /// Wrapper for statrs::distribution::NormalError::MeanInvalid
    MeanInvalid,

    /// Wrapper for statrs::distribution::NormalError::StandardDeviationInvalid
    StandardDeviationInvalid,

    /// Wrapper for statrs::distribution::StudentsTError::LocationInvalid
    LocationInvalid,

    /// Wrapper for statrs::distribution::StudentsTError::ScaleInvalid
    ScaleInvalid,

    /// Wrapper for statrs::distribution::StudentsTError::FreedomInvalid
    FreedomInvalid,

    /// ---- Fallback ----
    UnknownError,
}

impl std::error::Error for TransformError {}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Cholesky factor ----
            TransformError::EmptyCholesky => {
                write!(f, "Cholesky factor must have at least one row.")
            }
            TransformError::NonSquareCholesky { rows, cols } => {
                write!(f, "Cholesky factor must be square; got {rows}x{cols}.")
            }
            TransformError::NonFiniteCholesky { row, col, value } => {
                write!(f, "Cholesky factor entry ({row}, {col}) is non-finite: {value}")
            }
            TransformError::NotLowerTriangular { row, col, value } => {
                write!(
                    f,
                    "Cholesky factor must be lower triangular; entry ({row}, {col}) is {value}"
                )
            }
            TransformError::SingularCholesky { index, value } => {
                write!(f, "Cholesky factor diagonal entry {index} must be non-zero; got {value}")
            }
            // ---- Correlation matrix ----
            TransformError::InvalidCorrelation { row, col, value, reason } => {
                write!(f, "Invalid correlation entry ({row}, {col}) = {value}. {reason}")
            }
            TransformError::NotPositiveDefinite => {
                write!(f, "Correlation matrix is not positive definite.")
            }
            // ---- Distribution ----
            TransformError::InvalidDegreesOfFreedom { value } => {
                write!(f, "Student degrees of freedom must be finite and > 0; got: {value}")
            }
            TransformError::DistributionDimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Distribution dimension must match the Cholesky factor: expected {expected}, got {actual}"
                )
            }
            TransformError::MarginalOutOfRange { index, dimension } => {
                write!(f, "Marginal index {index} is out of range for dimension {dimension}")
            }
            // ---- Input validation ----
            TransformError::DimensionMismatch { expected, actual } => {
                write!(f, "Input dimension mismatch: expected {expected}, got {actual}")
            }
            TransformError::NanInput { row, col } => {
                write!(f, "Input value at row {row}, coordinate {col} is NaN.")
            }
            TransformError::NonFiniteInput { row, col, value } => {
                write!(f, "Input value at row {row}, coordinate {col} must be finite; got {value}")
            }
            TransformError::InvalidProbability { row, col, value } => {
                write!(
                    f,
                    "Copula coordinate at row {row}, coordinate {col} must lie in (0, 1); got {value}"
                )
            }
            // ---- Persistence ----
            TransformError::UnsupportedArchiveVersion { found, supported } => {
                write!(f, "Archive version {found} is not supported (expected {supported}).")
            }
            TransformError::ArchiveClassMismatch { expected, found } => {
                write!(f, "Archive holds class {found}; expected {expected}.")
            }
            TransformError::CorruptArchive { reason } => {
                write!(f, "Archive is corrupt: {reason}")
            }
            TransformError::Serialization(msg) => {
                write!(f, "Serialization failed: {msg}")
            }
            // ---- statrs distribution errors ----
            TransformError::MeanInvalid => {
                write!(f, "Normal distribution mean must be finite.")
            }
            TransformError::StandardDeviationInvalid => {
                write!(f, "Normal distribution standard deviation must be finite and > 0.")
            }
            TransformError::LocationInvalid => {
                write!(f, "Student distribution location must be finite.")
            }
            TransformError::ScaleInvalid => {
                write!(f, "Student distribution scale must be finite and > 0.")
            }
            TransformError::FreedomInvalid => {
                write!(f, "Student distribution degrees of freedom must be > 0.")
            }
            TransformError::UnknownError => {
                write!(f, "An unknown error occurred in the distribution.")
            }
        }
    }
}

/// Convert a [`TransformError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl std::convert::From<TransformError> for PyErr {
    fn from(err: TransformError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<NormalError> for TransformError {
    fn from(err: NormalError) -> TransformError {
        match err {
            NormalError::MeanInvalid => TransformError::MeanInvalid,
            NormalError::StandardDeviationInvalid => TransformError::StandardDeviationInvalid,
            #[allow(unreachable_patterns)]
            _ => TransformError::UnknownError,
        }
    }
}

impl From<StudentsTError> for TransformError {
    fn from(err: StudentsTError) -> TransformError {
        match err {
            StudentsTError::LocationInvalid => TransformError::LocationInvalid,
            StudentsTError::ScaleInvalid => TransformError::ScaleInvalid,
            StudentsTError::FreedomInvalid => TransformError::FreedomInvalid,
            #[allow(unreachable_patterns)]
            _ => TransformError::UnknownError,
        }
    }
}

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> TransformError {
        TransformError::Serialization(err.to_string())
    }
}
