//! Input validation for transform evaluators.
//!
//! Every evaluator checks its input before touching counters or history, so a
//! rejected call leaves the instance unchanged. Checks are explicit and fail
//! fast: a point or sample with the wrong number of coordinates is reported as
//! [`TransformError::DimensionMismatch`] instead of being truncated or
//! extended by the linear algebra.
//!
//! Only finite values reach the triangular products: `0·∞` and `∞ − ∞`
//! would otherwise turn into NaN coordinates. For the same reason
//! copula-space inputs must lie strictly inside `(0, 1)`, since the
//! quantiles of `0` and `1` are infinite.
use crate::transformation::errors::{TransformError, TransformResult};
use ndarray::{ArrayView1, ArrayView2};

/// Check that `point` has `expected` coordinates, all finite.
///
/// # Errors
/// - [`TransformError::DimensionMismatch`] on a length mismatch.
/// - [`TransformError::NanInput`] / [`TransformError::NonFiniteInput`]
///   (with `row = 0`) for the first NaN or ±inf.
pub fn validate_point(point: ArrayView1<f64>, expected: usize) -> TransformResult<()> {
    if point.len() != expected {
        return Err(TransformError::DimensionMismatch { expected, actual: point.len() });
    }
    match point.iter().position(|v| !v.is_finite()) {
        Some(col) => Err(non_finite(0, col, point[col])),
        None => Ok(()),
    }
}

/// Check that `sample` (`m×n`, rows = points) has `expected` columns, all
/// finite.
///
/// # Errors
/// - [`TransformError::DimensionMismatch`] if `ncols != expected`.
/// - [`TransformError::NanInput`] / [`TransformError::NonFiniteInput`] for
///   the first NaN or ±inf in row-major order.
pub fn validate_sample(sample: ArrayView2<f64>, expected: usize) -> TransformResult<()> {
    if sample.ncols() != expected {
        return Err(TransformError::DimensionMismatch { expected, actual: sample.ncols() });
    }
    match sample.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), &value)) => Err(non_finite(row, col, value)),
        None => Ok(()),
    }
}

/// Check that every coordinate of a copula-space point lies in `(0, 1)`.
///
/// Call after [`validate_point`]; non-finite values have already been
/// rejected there.
///
/// # Errors
/// Returns [`TransformError::InvalidProbability`] for the first offending
/// coordinate, endpoints included.
pub fn validate_probability_point(point: ArrayView1<f64>) -> TransformResult<()> {
    match point.iter().position(|&v| !is_open_probability(v)) {
        Some(col) => Err(TransformError::InvalidProbability { row: 0, col, value: point[col] }),
        None => Ok(()),
    }
}

/// Check that every entry of a copula-space sample lies in `(0, 1)`.
///
/// # Errors
/// Returns [`TransformError::InvalidProbability`] for the first offending
/// entry in row-major order.
pub fn validate_probability_sample(sample: ArrayView2<f64>) -> TransformResult<()> {
    match sample.indexed_iter().find(|(_, v)| !is_open_probability(**v)) {
        Some(((row, col), &value)) => Err(TransformError::InvalidProbability { row, col, value }),
        None => Ok(()),
    }
}

fn non_finite(row: usize, col: usize, value: f64) -> TransformError {
    if value.is_nan() {
        TransformError::NanInput { row, col }
    } else {
        TransformError::NonFiniteInput { row, col, value }
    }
}

#[inline]
fn is_open_probability(p: f64) -> bool {
    p > 0.0 && p < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Dimension, NaN, and infinity checks for points and samples.
    // - Open-interval probability checks for copula-space inputs.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Ensure length mismatches and NaNs are reported for points.
    //
    // Given
    // -----
    // - A 3-vector against `expected = 2`, and `(0, NaN)` against 2.
    //
    // Expect
    // ------
    // - `DimensionMismatch { expected: 2, actual: 3 }` and
    //   `NanInput { row: 0, col: 1 }`.
    fn validate_point_reports_mismatch_and_nan() {
        // Arrange
        let long = array![0.0, 1.0, 2.0];
        let nan = array![0.0, f64::NAN];

        // Act / Assert
        assert_eq!(
            validate_point(long.view(), 2).unwrap_err(),
            TransformError::DimensionMismatch { expected: 2, actual: 3 }
        );
        assert_eq!(validate_point(nan.view(), 2).unwrap_err(), TransformError::NanInput { row: 0, col: 1 });
    }

    #[test]
    // Purpose
    // -------
    // Ensure infinite coordinates are rejected before any linear algebra.
    //
    // Given
    // -----
    // - The point `(inf, 0)` and the sample `[[0, 1], [inf, -inf]]`.
    //
    // Expect
    // ------
    // - `NonFiniteInput` located at the first infinite entry.
    fn infinite_inputs_are_rejected() {
        // Arrange
        let point = array![f64::INFINITY, 0.0];
        let sample = array![[0.0, 1.0], [f64::INFINITY, f64::NEG_INFINITY]];

        // Act / Assert
        assert_eq!(
            validate_point(point.view(), 2).unwrap_err(),
            TransformError::NonFiniteInput { row: 0, col: 0, value: f64::INFINITY }
        );
        assert_eq!(
            validate_sample(sample.view(), 2).unwrap_err(),
            TransformError::NonFiniteInput { row: 1, col: 0, value: f64::INFINITY }
        );
        assert!(validate_point(array![1e300, -1e300].view(), 2).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Ensure sample checks locate the offending column count or entry.
    //
    // Given
    // -----
    // - A 2×3 sample against `expected = 2`, and a 2×2 sample with NaN at
    //   (1, 0).
    //
    // Expect
    // ------
    // - `DimensionMismatch { expected: 2, actual: 3 }` and
    //   `NanInput { row: 1, col: 0 }`.
    fn validate_sample_reports_mismatch_and_nan() {
        // Arrange
        let wide = array![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]];
        let nan = array![[0.0, 1.0], [f64::NAN, 2.0]];

        // Act / Assert
        assert_eq!(
            validate_sample(wide.view(), 2).unwrap_err(),
            TransformError::DimensionMismatch { expected: 2, actual: 3 }
        );
        assert_eq!(validate_sample(nan.view(), 2).unwrap_err(), TransformError::NanInput { row: 1, col: 0 });
    }

    #[test]
    // Purpose
    // -------
    // Ensure probability checks accept the open unit interval only.
    //
    // Given
    // -----
    // - `(1e-300, 1 - 1e-16)`, `(0, 0.5)`, `(0.5, 1)`, and `(0.5, 1.2)`; a
    //   sample with `-0.1` at (0, 1).
    //
    // Expect
    // ------
    // - First point accepted; the others rejected with their location,
    //   endpoints included.
    fn probability_checks_accept_open_unit_interval() {
        // Arrange
        let inside = array![1e-300, 1.0 - 1e-16];
        let above = array![0.5, 1.2];
        let sample = array![[0.2, -0.1], [0.3, 0.4]];

        // Act / Assert
        assert!(validate_probability_point(inside.view()).is_ok());
        assert_eq!(
            validate_probability_point(array![0.0, 0.5].view()).unwrap_err(),
            TransformError::InvalidProbability { row: 0, col: 0, value: 0.0 }
        );
        assert_eq!(
            validate_probability_point(array![0.5, 1.0].view()).unwrap_err(),
            TransformError::InvalidProbability { row: 0, col: 1, value: 1.0 }
        );
        assert_eq!(
            validate_probability_point(above.view()).unwrap_err(),
            TransformError::InvalidProbability { row: 0, col: 1, value: 1.2 }
        );
        assert_eq!(
            validate_probability_sample(sample.view()).unwrap_err(),
            TransformError::InvalidProbability { row: 0, col: 1, value: -0.1 }
        );
    }
}
