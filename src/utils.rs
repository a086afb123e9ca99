//! Helpers for the PyO3 boundary: array extraction and argument parsing.
//!
//! Everything here is compiled only with the `python-bindings` feature and is
//! used by the `#[pyclass]` wrappers in the crate root.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::transformation::core::{CholeskyFactor, StandardElliptical};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
    PyReadonlyArray2,
};

/// Borrow a 1-D float64 array from NumPy, pandas, or a Python sequence.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        return Ok(arr_ro);
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            return Ok(series_ro);
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Borrow a 2-D float64 array from NumPy, pandas, or nested Python sequences.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray2<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr_ro);
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (), None) {
        if let Ok(frame_ro) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(frame_ro);
        }
    }

    let rows: Vec<Vec<f64>> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 2-D numpy.ndarray, pandas.DataFrame, or nested sequence of float64",
        )
    })?;
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(PyValueError::new_err("all rows must have the same length"));
    }
    let nrows = rows.len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    let matrix = ndarray::Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(matrix.into_pyarray(py).readonly())
}

/// Build a validated Cholesky factor from a Python matrix.
///
/// With `from_correlation = true` the matrix is treated as a correlation
/// matrix and factorized.
#[cfg(feature = "python-bindings")]
pub fn build_cholesky<'py>(
    py: Python<'py>, raw_matrix: &Bound<'py, PyAny>, from_correlation: bool,
) -> PyResult<CholeskyFactor> {
    let matrix = extract_f64_matrix(py, raw_matrix)?;
    let view = matrix.as_array();
    let factor = if from_correlation {
        CholeskyFactor::from_correlation(view)?
    } else {
        CholeskyFactor::new(view.to_owned())?
    };
    Ok(factor)
}

/// Build a standard elliptical distribution from its family name.
///
/// Accepted families: `"normal"` and `"student"` (requires `nu`).
#[cfg(feature = "python-bindings")]
pub fn build_distribution(
    family: Option<&str>, nu: Option<f64>, dimension: usize,
) -> PyResult<StandardElliptical> {
    match family.unwrap_or("normal") {
        "normal" => Ok(StandardElliptical::normal(dimension)),
        "student" => {
            let nu = nu.ok_or_else(|| {
                PyValueError::new_err("nu must be provided when family='student'")
            })?;
            Ok(StandardElliptical::student(nu, dimension)?)
        }
        other => Err(PyValueError::new_err(format!(
            "unknown family {other:?}; expected 'normal' or 'student'"
        ))),
    }
}
