//! Standard elliptical distributions and their common marginal law.
//!
//! This module defines [`StandardElliptical`], the family of standard
//! (zero-location, unit-scale, identity-correlation) elliptical distributions
//! used as the reference law of the Nataf transforms, and
//! [`EllipticalMarginal`], the univariate marginal shared by every coordinate.
//!
//! ## Supported families
//! - [`StandardElliptical::Normal`]: standard multivariate normal; marginal
//!   `N(0, 1)`.
//! - [`StandardElliptical::Student`]: standard multivariate Student with `ν`
//!   degrees of freedom; marginal `t_ν(0, 1)`.
//!
//! ## Numerics
//! - CDFs and quantiles delegate to `statrs::distribution::ContinuousCDF`.
//! - Marginals are rebuilt from the stored parameters on demand, so an invalid
//!   parameter state (e.g. a corrupted archive) surfaces as a statrs error
//!   when the marginal is requested, never as a silent default.
//! - Vectorized entry points evaluate a whole coordinate column in one call.
use crate::transformation::errors::{TransformError, TransformResult};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use std::fmt;

/// Standard elliptical distribution of a given dimension.
///
/// All coordinates share one marginal law; the transforms rely on this and do
/// not check it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum StandardElliptical {
    /// Standard normal with identity correlation.
    Normal { dimension: usize },
    /// Standard Student with `nu` degrees of freedom and identity correlation.
    Student { nu: f64, dimension: usize },
}

impl StandardElliptical {
    /// Standard normal distribution of dimension `dimension`.
    pub const fn normal(dimension: usize) -> Self {
        StandardElliptical::Normal { dimension }
    }

    /// Standard Student distribution with `nu` degrees of freedom.
    ///
    /// # Errors
    /// Returns [`TransformError::InvalidDegreesOfFreedom`] if `nu` is not
    /// finite or ≤ 0.
    pub fn student(nu: f64, dimension: usize) -> TransformResult<Self> {
        if !nu.is_finite() || nu <= 0.0 {
            return Err(TransformError::InvalidDegreesOfFreedom { value: nu });
        }
        Ok(StandardElliptical::Student { nu, dimension })
    }

    /// Re-check the parameters of a value built without a constructor, e.g.
    /// deserialized from an archive.
    ///
    /// # Errors
    /// Same as [`StandardElliptical::student`].
    pub fn validated(self) -> TransformResult<Self> {
        match self {
            StandardElliptical::Normal { .. } => Ok(self),
            StandardElliptical::Student { nu, dimension } => Self::student(nu, dimension),
        }
    }

    /// Number of coordinates.
    pub fn dimension(&self) -> usize {
        match self {
            StandardElliptical::Normal { dimension } => *dimension,
            StandardElliptical::Student { dimension, .. } => *dimension,
        }
    }

    /// Marginal law of coordinate `index`.
    ///
    /// Every coordinate of a standard elliptical distribution has the same
    /// marginal; `index` is only checked against the dimension.
    ///
    /// # Errors
    /// - [`TransformError::MarginalOutOfRange`] if `index >= dimension`.
    /// - statrs constructor errors (e.g. [`TransformError::FreedomInvalid`])
    ///   if the stored parameters are invalid.
    pub fn marginal(&self, index: usize) -> TransformResult<EllipticalMarginal> {
        let dimension = self.dimension();
        if index >= dimension {
            return Err(TransformError::MarginalOutOfRange { index, dimension });
        }
        match self {
            StandardElliptical::Normal { .. } => {
                Ok(EllipticalMarginal::Normal(Normal::new(0.0, 1.0)?))
            }
            StandardElliptical::Student { nu, .. } => {
                Ok(EllipticalMarginal::Student(StudentsT::new(0.0, 1.0, *nu)?))
            }
        }
    }
}

impl fmt::Display for StandardElliptical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StandardElliptical::Normal { dimension } => write!(f, "Normal(dimension={dimension})"),
            StandardElliptical::Student { nu, dimension } => {
                write!(f, "Student(nu={nu}, dimension={dimension})")
            }
        }
    }
}

/// Univariate marginal of a [`StandardElliptical`] distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EllipticalMarginal {
    Normal(Normal),
    Student(StudentsT),
}

impl EllipticalMarginal {
    /// CDF at `x`; `±∞` map to `1`/`0`.
    pub fn cdf(&self, x: f64) -> f64 {
        match self {
            EllipticalMarginal::Normal(law) => law.cdf(x),
            EllipticalMarginal::Student(law) => law.cdf(x),
        }
    }

    /// CDF over a whole column in a single call.
    pub fn cdf_array(&self, x: ArrayView1<f64>) -> Array1<f64> {
        match self {
            EllipticalMarginal::Normal(law) => x.mapv(|v| law.cdf(v)),
            EllipticalMarginal::Student(law) => x.mapv(|v| law.cdf(v)),
        }
    }

    /// Quantile at probability `p ∈ [0, 1]`.
    ///
    /// Callers must check the range of `p` beforehand; statrs panics outside
    /// `[0, 1]`.
    pub fn quantile(&self, p: f64) -> f64 {
        match self {
            EllipticalMarginal::Normal(law) => law.inverse_cdf(p),
            EllipticalMarginal::Student(law) => law.inverse_cdf(p),
        }
    }

    /// Quantiles over a whole column in a single call.
    pub fn quantile_array(&self, p: ArrayView1<f64>) -> Array1<f64> {
        match self {
            EllipticalMarginal::Normal(law) => p.mapv(|v| law.inverse_cdf(v)),
            EllipticalMarginal::Student(law) => p.mapv(|v| law.inverse_cdf(v)),
        }
    }
}

impl fmt::Display for EllipticalMarginal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EllipticalMarginal::Normal(_) => write!(f, "Normal(mu=0, sigma=1)"),
            EllipticalMarginal::Student(law) => {
                write!(f, "Student(nu={}, mu=0, sigma=1)", law.freedom())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction and parameter validation of `StandardElliptical`.
    // - Marginal extraction, including error propagation for corrupted
    //   parameter states.
    // - Scalar vs vectorized CDF/quantile agreement and reference values.
    //
    // They intentionally DO NOT cover:
    // - statrs' own numerical accuracy beyond a few reference points.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the standard normal marginal against reference CDF values.
    //
    // Given
    // -----
    // - `StandardElliptical::normal(2)`.
    //
    // Expect
    // ------
    // - `Φ(0) = 0.5`, `Φ(1) ≈ 0.841345`, `Φ(0.5) ≈ 0.691462`.
    fn normal_marginal_matches_reference_values() {
        // Arrange
        let marginal = StandardElliptical::normal(2).marginal(0).unwrap();

        // Act / Assert
        assert_relative_eq!(marginal.cdf(0.0), 0.5, epsilon = 1e-15);
        assert_relative_eq!(marginal.cdf(1.0), 0.841_344_746_068_542_9, epsilon = 1e-9);
        assert_relative_eq!(marginal.cdf(0.5), 0.691_462_461_274_013_1, epsilon = 1e-9);
        assert_eq!(marginal.cdf(f64::INFINITY), 1.0);
        assert_eq!(marginal.cdf(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Ensure invalid degrees of freedom are rejected at construction.
    //
    // Given
    // -----
    // - `nu = 0`, `nu = -1`, `nu = NaN`.
    //
    // Expect
    // ------
    // - `InvalidDegreesOfFreedom` for each.
    fn student_rejects_invalid_degrees_of_freedom() {
        for nu in [0.0, -1.0, f64::NAN] {
            match StandardElliptical::student(nu, 2) {
                Err(TransformError::InvalidDegreesOfFreedom { .. }) => {}
                other => panic!("expected InvalidDegreesOfFreedom for nu={nu}, got {other:?}"),
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that a corrupted Student state surfaces the statrs error when the
    // marginal is requested.
    //
    // Given
    // -----
    // - `StandardElliptical::Student { nu: -3.0, dimension: 2 }` built without
    //   the validating constructor.
    //
    // Expect
    // ------
    // - `marginal(0)` returns `Err(TransformError::FreedomInvalid)`.
    fn corrupted_student_state_propagates_statrs_error() {
        // Arrange
        let dist = StandardElliptical::Student { nu: -3.0, dimension: 2 };

        // Act
        let err = dist.marginal(0).unwrap_err();

        // Assert
        assert_eq!(err, TransformError::FreedomInvalid);
    }

    #[test]
    // Purpose
    // -------
    // Verify that `validated` re-applies the constructor checks.
    //
    // Given
    // -----
    // - A Student state with `nu = -3`, a valid Student(2.5), and a normal.
    //
    // Expect
    // ------
    // - `InvalidDegreesOfFreedom { value: -3.0 }` for the first; the others
    //   come back unchanged.
    fn validated_rechecks_student_parameters() {
        // Arrange
        let corrupted = StandardElliptical::Student { nu: -3.0, dimension: 2 };
        let student = StandardElliptical::student(2.5, 3).unwrap();
        let normal = StandardElliptical::normal(4);

        // Act / Assert
        assert_eq!(
            corrupted.validated().unwrap_err(),
            TransformError::InvalidDegreesOfFreedom { value: -3.0 }
        );
        assert_eq!(student.validated().unwrap(), student);
        assert_eq!(normal.validated().unwrap(), normal);
    }

    #[test]
    // Purpose
    // -------
    // Ensure marginal indices are checked against the dimension.
    //
    // Given
    // -----
    // - A 2-dimensional normal, index 2.
    //
    // Expect
    // ------
    // - `MarginalOutOfRange { index: 2, dimension: 2 }`.
    fn marginal_rejects_out_of_range_index() {
        // Arrange
        let dist = StandardElliptical::normal(2);

        // Act / Assert
        assert_eq!(
            dist.marginal(2).unwrap_err(),
            TransformError::MarginalOutOfRange { index: 2, dimension: 2 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify vectorized CDF/quantile calls agree with the scalar calls and
    // that the Student marginal is symmetric.
    //
    // Given
    // -----
    // - Student marginal with `nu = 4` and a small grid of points.
    //
    // Expect
    // ------
    // - `cdf_array(x)[k] == cdf(x[k])`, `F(-x) = 1 - F(x)`, and
    //   `quantile(cdf(x)) ≈ x`.
    fn student_vectorized_calls_match_scalar_calls() {
        // Arrange
        let marginal = StandardElliptical::student(4.0, 3).unwrap().marginal(0).unwrap();
        let x = array![-2.5, -0.3, 0.0, 0.8, 3.0];

        // Act
        let cdf = marginal.cdf_array(x.view());
        let back = marginal.quantile_array(cdf.view());

        // Assert
        for (k, &xk) in x.iter().enumerate() {
            assert_eq!(cdf[k], marginal.cdf(xk));
            assert_relative_eq!(marginal.cdf(-xk), 1.0 - marginal.cdf(xk), epsilon = 1e-12);
            assert_relative_eq!(back[k], xk, epsilon = 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the textual renderings of distributions and marginals.
    //
    // Given
    // -----
    // - Normal(2) and Student(3, 2).
    //
    // Expect
    // ------
    // - Stable, parameter-bearing strings.
    fn display_renders_parameters() {
        // Arrange
        let normal = StandardElliptical::normal(2);
        let student = StandardElliptical::student(3.0, 2).unwrap();

        // Act / Assert
        assert_eq!(normal.to_string(), "Normal(dimension=2)");
        assert_eq!(student.to_string(), "Student(nu=3, dimension=2)");
        assert_eq!(normal.marginal(1).unwrap().to_string(), "Normal(mu=0, sigma=1)");
        assert_eq!(student.marginal(0).unwrap().to_string(), "Student(nu=3, mu=0, sigma=1)");
    }
}
