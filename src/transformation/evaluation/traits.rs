//! The evaluation capability shared by every transform.
//!
//! [`Evaluation`] is the polymorphic "point in, point out; sample in, sample
//! out" contract. Concrete transforms ([`InverseNatafEllipticalCopulaEvaluation`],
//! [`NatafEllipticalCopulaEvaluation`]) implement the required methods and get
//! instrumentation accessors for free. The trait is object safe, so pipelines
//! can hold `Box<dyn Evaluation>` and clone them.
//!
//! [`InverseNatafEllipticalCopulaEvaluation`]:
//!     crate::transformation::evaluation::InverseNatafEllipticalCopulaEvaluation
//! [`NatafEllipticalCopulaEvaluation`]:
//!     crate::transformation::evaluation::NatafEllipticalCopulaEvaluation
use crate::transformation::{
    core::{Description, HistoryRecord, Instrumentation},
    errors::TransformResult,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::fmt;

/// Evaluatable transform with instrumentation.
///
/// Evaluation takes `&mut self` because it updates the call counter and the
/// optional history; share an instance across threads behind a `Mutex`, or
/// give each thread its own clone.
pub trait Evaluation: fmt::Debug + fmt::Display + Send + Sync {
    /// Stable class name, also written into archives.
    fn class_name(&self) -> &'static str;

    fn input_dimension(&self) -> usize;

    fn output_dimension(&self) -> usize;

    /// Input labels followed by output labels.
    fn description(&self) -> &Description;

    /// Evaluate one point.
    ///
    /// # Errors
    /// - [`DimensionMismatch`](crate::transformation::errors::TransformError::DimensionMismatch)
    ///   if `point.len() != input_dimension()`.
    /// - [`NanInput`](crate::transformation::errors::TransformError::NanInput) /
    ///   [`NonFiniteInput`](crate::transformation::errors::TransformError::NonFiniteInput)
    ///   for NaN or ±inf coordinates.
    /// - Any error raised by the underlying distribution.
    fn evaluate(&mut self, point: ArrayView1<f64>) -> TransformResult<Array1<f64>>;

    /// Evaluate an `m×n` sample (rows = points); row `j` of the result equals
    /// `evaluate(sample.row(j))`.
    ///
    /// # Errors
    /// Same as [`Evaluation::evaluate`]; no partial result is returned.
    fn evaluate_sample(&mut self, sample: ArrayView2<f64>) -> TransformResult<Array2<f64>>;

    /// Gradient with respect to the transform parameters, `p×n` with `p` the
    /// number of exposed parameters.
    fn parameter_gradient(&self, point: ArrayView1<f64>) -> Array2<f64>;

    fn instrumentation(&self) -> &Instrumentation;

    fn instrumentation_mut(&mut self) -> &mut Instrumentation;

    /// Long textual form (`class=… description=… …`).
    fn repr(&self) -> String;

    fn boxed_clone(&self) -> Box<dyn Evaluation>;

    // ---- Provided instrumentation accessors ----

    /// Number of evaluated points since construction.
    fn calls_number(&self) -> u64 {
        self.instrumentation().calls_number()
    }

    fn is_history_enabled(&self) -> bool {
        self.instrumentation().history().is_enabled()
    }

    fn enable_history(&mut self) {
        self.instrumentation_mut().history_mut().enable();
    }

    fn disable_history(&mut self) {
        self.instrumentation_mut().history_mut().disable();
    }

    /// Drop recorded history; the call counter is unaffected.
    fn clear_history(&mut self) {
        self.instrumentation_mut().history_mut().clear();
    }

    fn input_history(&self) -> &[HistoryRecord] {
        self.instrumentation().history().inputs()
    }

    fn output_history(&self) -> &[HistoryRecord] {
        self.instrumentation().history().outputs()
    }
}

impl Clone for Box<dyn Evaluation> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}
