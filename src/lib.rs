//! rust_copulas — Nataf transforms for elliptical copulas with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the Nataf evaluators to Python via the `_rust_copulas` extension module.
//! When the `python-bindings` feature is enabled, this module defines the
//! Python-facing classes and the `transformations` submodule.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust module (`transformation`) as the public crate
//!   surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_rust_copulas` Python extension.
//! - Register the `rust_copulas.transformations` submodule so dotted imports
//!   work from Python.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in [`transformation`]; this file
//!   performs only FFI glue, argument parsing, and error mapping.
//! - Python wrappers preserve the Rust invariants: dimensions are fixed at
//!   construction, counters only grow, and failures surface as `ValueError`.
//!
//! Conventions
//! -----------
//! - Points are 1-D float64 arrays; samples are 2-D float64 arrays with one
//!   point per row. Calling a wrapper dispatches on the input rank.
//! - Errors from Rust are converted to `PyErr` through the `From` impl in
//!   [`transformation::errors`].
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`transformation`] (or its `prelude`)
//!   and ignore the PyO3 items guarded by the `python-bindings` feature.
//! - The Python packaging layer imports `_rust_copulas` and wraps its classes
//!   in user-facing APIs.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   the integration tests under `tests/`.

pub mod transformation;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    transformation::{
        Evaluation, InverseNatafEllipticalCopulaEvaluation, NatafEllipticalCopulaEvaluation,
    },
    utils::{build_cholesky, build_distribution, extract_f64_array},
};

/// Evaluate a Python point or sample through any evaluator.
#[cfg(feature = "python-bindings")]
fn call_evaluation<'py, E: Evaluation>(
    py: Python<'py>, inner: &mut E, x: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyAny>> {
    if let Ok(sample) = x.extract::<PyReadonlyArray2<f64>>() {
        let out = inner.evaluate_sample(sample.as_array())?;
        return Ok(out.into_pyarray(py).into_any());
    }
    let point = extract_f64_array(py, x)?;
    let out = inner.evaluate(point.as_array())?;
    Ok(out.into_pyarray(py).into_any())
}

/// InverseNatafEllipticalCopula — Python-facing wrapper for the inverse Nataf
/// transform.
///
/// Purpose
/// -------
/// Expose [`InverseNatafEllipticalCopulaEvaluation`] to Python callers.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `InverseNatafEllipticalCopula(cholesky, family="normal", nu=None, from_correlation=False)`:
/// - `cholesky`: 2-D array-like, the lower factor `L` (or a correlation
///   matrix when `from_correlation=True`).
/// - `family`: `"normal"` or `"student"`.
/// - `nu`: degrees of freedom, required for `"student"`.
///
/// Notes
/// -----
/// - Rust callers should use [`InverseNatafEllipticalCopulaEvaluation`]
///   directly; this wrapper exists solely for the PyO3 binding.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_copulas.transformations")]
pub struct InverseNatafEllipticalCopula {
    inner: InverseNatafEllipticalCopulaEvaluation,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl InverseNatafEllipticalCopula {
    #[new]
    #[pyo3(
        signature = (cholesky, family = None, nu = None, from_correlation = false),
        text_signature = "(cholesky, /, family='normal', nu=None, from_correlation=False)"
    )]
    pub fn new<'py>(
        py: Python<'py>, cholesky: &Bound<'py, PyAny>, family: Option<&str>, nu: Option<f64>,
        from_correlation: bool,
    ) -> PyResult<Self> {
        let factor = build_cholesky(py, cholesky, from_correlation)?;
        let distribution = build_distribution(family, nu, factor.dimension())?;
        let inner = InverseNatafEllipticalCopulaEvaluation::new(distribution, factor)?;
        Ok(InverseNatafEllipticalCopula { inner })
    }

    /// Evaluate a point (1-D) or a sample (2-D, rows = points).
    pub fn __call__<'py>(
        &mut self, py: Python<'py>, x: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyAny>> {
        call_evaluation(py, &mut self.inner, x)
    }

    /// Forward transform sharing the same distribution and factor.
    pub fn inverse(&self) -> PyResult<NatafEllipticalCopula> {
        Ok(NatafEllipticalCopula { inner: self.inner.inverse()? })
    }

    /// Empty `0×n` parameter gradient.
    pub fn parameter_gradient<'py>(
        &self, py: Python<'py>, x: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let point = extract_f64_array(py, x)?;
        Ok(self.inner.parameter_gradient(point.as_array()).into_pyarray(py))
    }

    #[getter]
    pub fn input_dimension(&self) -> usize {
        self.inner.input_dimension()
    }

    #[getter]
    pub fn output_dimension(&self) -> usize {
        self.inner.output_dimension()
    }

    #[getter]
    pub fn description(&self) -> Vec<String> {
        self.inner.description().as_slice().to_vec()
    }

    #[getter]
    pub fn calls_number(&self) -> u64 {
        self.inner.calls_number()
    }

    #[getter]
    pub fn history_enabled(&self) -> bool {
        self.inner.is_history_enabled()
    }

    pub fn enable_history(&mut self) {
        self.inner.enable_history();
    }

    pub fn disable_history(&mut self) {
        self.inner.disable_history();
    }

    pub fn clear_history(&mut self) {
        self.inner.clear_history();
    }

    /// Recorded inputs stacked into a `k×n` array.
    pub fn input_history<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let n = self.inner.input_dimension();
        Ok(self.inner.instrumentation().history().inputs_table(n)?.into_pyarray(py))
    }

    /// Recorded outputs stacked into a `k×n` array.
    pub fn output_history<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let n = self.inner.output_dimension();
        Ok(self.inner.instrumentation().history().outputs_table(n)?.into_pyarray(py))
    }

    /// Lower Cholesky factor as a 2-D array.
    pub fn cholesky<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.cholesky().matrix().to_owned().into_pyarray(py)
    }

    pub fn save(&self) -> PyResult<String> {
        Ok(self.inner.save()?)
    }

    #[staticmethod]
    pub fn load(raw: &str) -> PyResult<Self> {
        Ok(InverseNatafEllipticalCopula { inner: InverseNatafEllipticalCopulaEvaluation::load(raw)? })
    }

    pub fn __repr__(&self) -> String {
        self.inner.repr()
    }

    pub fn __str__(&self) -> String {
        self.inner.to_string()
    }
}

/// NatafEllipticalCopula — Python-facing wrapper for the forward Nataf
/// transform.
///
/// Notes
/// -----
/// - Constructed like [`InverseNatafEllipticalCopula`]; inputs must lie in
///   the open interval `(0, 1)`.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_copulas.transformations")]
pub struct NatafEllipticalCopula {
    inner: NatafEllipticalCopulaEvaluation,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl NatafEllipticalCopula {
    #[new]
    #[pyo3(
        signature = (cholesky, family = None, nu = None, from_correlation = false),
        text_signature = "(cholesky, /, family='normal', nu=None, from_correlation=False)"
    )]
    pub fn new<'py>(
        py: Python<'py>, cholesky: &Bound<'py, PyAny>, family: Option<&str>, nu: Option<f64>,
        from_correlation: bool,
    ) -> PyResult<Self> {
        let factor = build_cholesky(py, cholesky, from_correlation)?;
        let distribution = build_distribution(family, nu, factor.dimension())?;
        let inner = NatafEllipticalCopulaEvaluation::new(distribution, factor)?;
        Ok(NatafEllipticalCopula { inner })
    }

    pub fn __call__<'py>(
        &mut self, py: Python<'py>, x: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyAny>> {
        call_evaluation(py, &mut self.inner, x)
    }

    pub fn inverse(&self) -> PyResult<InverseNatafEllipticalCopula> {
        Ok(InverseNatafEllipticalCopula { inner: self.inner.inverse()? })
    }

    #[getter]
    pub fn input_dimension(&self) -> usize {
        self.inner.input_dimension()
    }

    #[getter]
    pub fn output_dimension(&self) -> usize {
        self.inner.output_dimension()
    }

    #[getter]
    pub fn calls_number(&self) -> u64 {
        self.inner.calls_number()
    }

    pub fn enable_history(&mut self) {
        self.inner.enable_history();
    }

    pub fn disable_history(&mut self) {
        self.inner.disable_history();
    }

    pub fn input_history<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let n = self.inner.input_dimension();
        Ok(self.inner.instrumentation().history().inputs_table(n)?.into_pyarray(py))
    }

    pub fn output_history<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let n = self.inner.output_dimension();
        Ok(self.inner.instrumentation().history().outputs_table(n)?.into_pyarray(py))
    }

    /// Diagonal of the Cholesky factor, handy for conditioning checks.
    pub fn cholesky_diagonal<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.cholesky().matrix().diag().to_owned().into_pyarray(py)
    }

    pub fn save(&self) -> PyResult<String> {
        Ok(self.inner.save()?)
    }

    #[staticmethod]
    pub fn load(raw: &str) -> PyResult<Self> {
        Ok(NatafEllipticalCopula { inner: NatafEllipticalCopulaEvaluation::load(raw)? })
    }

    pub fn __repr__(&self) -> String {
        self.inner.repr()
    }

    pub fn __str__(&self) -> String {
        self.inner.to_string()
    }
}

/// _rust_copulas — PyO3 module initializer for the Python extension.
///
/// Creates the `transformations` submodule, attaches it to `_rust_copulas`,
/// and registers it in `sys.modules` so it is importable via dotted paths.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_copulas<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let transformations_mod = PyModule::new(_py, "transformations")?;
    transformations_mod.add_class::<InverseNatafEllipticalCopula>()?;
    transformations_mod.add_class::<NatafEllipticalCopula>()?;
    m.add_submodule(&transformations_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_copulas.transformations", transformations_mod)?;
    Ok(())
}
