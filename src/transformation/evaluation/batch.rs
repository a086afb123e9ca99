//! Per-dimension batch kernels.
//!
//! Batch evaluation works on `n×m` blocks (rows = coordinates, columns =
//! sample points) so that each coordinate is handled by one vectorized
//! marginal call. Rows are independent; with the `parallel` feature they are
//! spread over the `rayon` pool. Each row is computed by the same closure in
//! both paths, so the result does not depend on the path taken.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Apply `f` to every row of `block` and stack the results into a new `n×m`
/// block.
///
/// `f` must return a vector of the same length as its input row.
pub(crate) fn map_dimensions<F>(block: ArrayView2<f64>, parallel: bool, f: F) -> Array2<f64>
where
    F: Fn(ArrayView1<f64>) -> Array1<f64> + Sync,
{
    let rows = collect_rows(block, parallel, &f);
    let mut out = Array2::<f64>::zeros(block.raw_dim());
    for (mut target, row) in out.rows_mut().into_iter().zip(rows) {
        target.assign(&row);
    }
    out
}

#[cfg(feature = "parallel")]
fn collect_rows<F>(block: ArrayView2<f64>, parallel: bool, f: &F) -> Vec<Array1<f64>>
where
    F: Fn(ArrayView1<f64>) -> Array1<f64> + Sync,
{
    if parallel {
        (0..block.nrows()).into_par_iter().map(|i| f(block.row(i))).collect()
    } else {
        (0..block.nrows()).map(|i| f(block.row(i))).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn collect_rows<F>(block: ArrayView2<f64>, _parallel: bool, f: &F) -> Vec<Array1<f64>>
where
    F: Fn(ArrayView1<f64>) -> Array1<f64> + Sync,
{
    (0..block.nrows()).map(|i| f(block.row(i))).collect()
}

/// Transpose an `n×m` block into a standard-layout `m×n` sample.
pub(crate) fn into_sample(block: Array2<f64>) -> Array2<f64> {
    let (n, m) = block.dim();
    let mut sample = Array2::<f64>::zeros((m, n));
    sample.assign(&block.t());
    sample
}
