//! nataf — forward Nataf evaluation for elliptical copulas.
//!
//! Maps copula-space points (uniform marginals, correlation `R = L·Lᵀ`) back to
//! the standard elliptical space:
//!
//! ```text
//! z_i = F⁻¹(y_i),        u = L⁻¹·z,
//! ```
//!
//! the inverse of [`InverseNatafEllipticalCopulaEvaluation`]. Batch evaluation
//! computes the quantiles one coordinate column at a time and then runs a
//! single forward substitution over the whole `n×m` block. Counter, history,
//! gradient, and validation rules are those of the inverse transform; inputs
//! must additionally lie strictly inside `(0, 1)`. The endpoints are rejected
//! because their quantiles are `∓∞`, which forward substitution would turn
//! into NaN coordinates.
use crate::transformation::{
    core::{
        CholeskyFactor, Description, EvaluationOptions, Instrumentation, StandardElliptical,
        validate_point, validate_probability_point, validate_probability_sample, validate_sample,
    },
    errors::{TransformError, TransformResult},
    evaluation::{
        batch::{into_sample, map_dimensions},
        inverse_nataf::InverseNatafEllipticalCopulaEvaluation,
        traits::Evaluation,
    },
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::fmt;

/// Forward Nataf transformation for an elliptical copula.
#[derive(Debug, Clone, PartialEq)]
pub struct NatafEllipticalCopulaEvaluation {
    standard_distribution: StandardElliptical,
    cholesky: CholeskyFactor,
    description: Description,
    instrumentation: Instrumentation,
    options: EvaluationOptions,
}

impl NatafEllipticalCopulaEvaluation {
    pub const CLASS_NAME: &'static str = "NatafEllipticalCopulaEvaluation";

    /// Build the evaluator with default [`EvaluationOptions`].
    ///
    /// # Errors
    /// - [`TransformError::DistributionDimensionMismatch`] if the dimensions
    ///   disagree.
    /// - [`TransformError::SingularCholesky`] if `L` has a zero diagonal entry.
    pub fn new(
        standard_distribution: StandardElliptical, cholesky: CholeskyFactor,
    ) -> TransformResult<Self> {
        Self::with_options(standard_distribution, cholesky, EvaluationOptions::default())
    }

    /// Build the evaluator with explicit runtime options.
    ///
    /// # Errors
    /// See [`NatafEllipticalCopulaEvaluation::new`].
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
        let (index, value) = cholesky.min_abs_diagonal();
        if value == 0.0 {
            return Err(TransformError::SingularCholesky { index, value });
        }
        tracing::debug!(
            dimension,
            distribution = %standard_distribution,
            "built Nataf elliptical copula evaluation"
        );
        Ok(NatafEllipticalCopulaEvaluation {
            standard_distribution,
            cholesky,
            description: Description::for_transform(dimension, dimension),
            instrumentation: Instrumentation::new(options.history_enabled),
            options,
        })
    }

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

    /// Inverse (standard → copula space) transform with fresh instrumentation.
    ///
    /// # Errors
    /// Never fails for an instance built through the constructors; the
    /// `Result` mirrors [`InverseNatafEllipticalCopulaEvaluation::with_options`].
    pub fn inverse(&self) -> TransformResult<InverseNatafEllipticalCopulaEvaluation> {
        InverseNatafEllipticalCopulaEvaluation::with_options(
            self.standard_distribution,
            self.cholesky.clone(),
            self.options,
        )
    }
}

impl Evaluation for NatafEllipticalCopulaEvaluation {
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
        validate_probability_point(point)?;
        let marginal = self.standard_distribution.marginal(0)?;
        let quantiles = marginal.quantile_array(point);
        let result = self.cholesky.solve_vec(quantiles.view());
        self.instrumentation.record_point(point, &result);
        tracing::trace!(calls = self.instrumentation.calls_number(), "evaluated point");
        Ok(result)
    }

    fn evaluate_sample(&mut self, sample: ArrayView2<f64>) -> TransformResult<Array2<f64>> {
        let dimension = self.input_dimension();
        validate_sample(sample, dimension)?;
        validate_probability_sample(sample)?;
        let marginal = self.standard_distribution.marginal(0)?;
        let size = sample.nrows();

        let parallel = self.options.use_parallel(size * dimension);
        let quantiles = map_dimensions(sample.t(), parallel, |p| marginal.quantile_array(p));
        let result = into_sample(self.cholesky.solve_mat(quantiles.view()));

        self.instrumentation.record_sample(sample, &result);
        tracing::debug!(size, dimension, parallel, "evaluated Nataf sample");
        Ok(result)
    }

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

impl fmt::Display for NatafEllipticalCopulaEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(Copula(cholesky={}, E=",
            Self::CLASS_NAME,
            self.cholesky
        )?;
        match self.standard_distribution.marginal(0) {
            Ok(marginal) => write!(f, "{marginal})->{})", self.standard_distribution),
            Err(err) => write!(f, "<{err}>)->{})", self.standard_distribution),
        }
    }
}
