//! Lower-triangular Cholesky factors for elliptical copulas.
//!
//! Purpose
//! -------
//! Carry a validated lower-triangular factor `L` of a correlation matrix
//! `R = L·Lᵀ` and provide the products and solves the Nataf transforms need:
//! `L·u`, `L·U`, `L⁻¹·z`, and `L⁻¹·Z`.
//!
//! Key behaviors
//! -------------
//! - [`CholeskyFactor::new`] validates shape, finiteness, and triangularity.
//! - [`CholeskyFactor::from_correlation`] factorizes a validated correlation
//!   matrix through `nalgebra`.
//! - Vector and matrix products touch only the lower triangle.
//!
//! Invariants & assumptions
//! ------------------------
//! - The factor is square, `n ≥ 1`, finite, and every entry above the diagonal
//!   is exactly zero.
//! - Vector and matrix routines accumulate `Σ_{j ≤ i} L[i, j]·x[j]` in the same
//!   order (ascending `j`, starting from `0.0`), so column `k` of
//!   [`CholeskyFactor::mul_mat`] is bit-identical to [`CholeskyFactor::mul_vec`]
//!   on that column. The same holds for the two solves.
//!
//! Conventions
//! -----------
//! - Matrix operands of `mul_mat` / `solve_mat` are `n×m` (rows = coordinates,
//!   columns = sample points); callers pass transposed views of `m×n` samples.
//! - Shape mismatches inside these routines are programming errors and panic
//!   through `ndarray`; evaluators validate caller input beforehand.
use crate::transformation::errors::{TransformError, TransformResult};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use std::fmt;

/// Tolerance used to check the symmetry and unit diagonal of correlation
/// matrices.
const CORRELATION_TOL: f64 = 1e-12;

/// Validated square lower-triangular matrix `L` with `L·Lᵀ = R`.
#[derive(Debug, Clone, PartialEq)]
pub struct CholeskyFactor {
    matrix: Array2<f64>,
}

impl CholeskyFactor {
    /// Wrap `matrix` after checking that it is a usable Cholesky factor.
    ///
    /// # Errors
    /// - [`TransformError::EmptyCholesky`] if `matrix` has no rows.
    /// - [`TransformError::NonSquareCholesky`] if `matrix` is not square.
    /// - [`TransformError::NonFiniteCholesky`] for NaN/±inf entries.
    /// - [`TransformError::NotLowerTriangular`] for non-zero entries above the
    ///   diagonal.
    pub fn new(matrix: Array2<f64>) -> TransformResult<Self> {
        let (rows, cols) = matrix.dim();
        if rows == 0 {
            return Err(TransformError::EmptyCholesky);
        }
        if rows != cols {
            return Err(TransformError::NonSquareCholesky { rows, cols });
        }
        for ((row, col), &value) in matrix.indexed_iter() {
            if !value.is_finite() {
                return Err(TransformError::NonFiniteCholesky { row, col, value });
            }
            if col > row && value != 0.0 {
                return Err(TransformError::NotLowerTriangular { row, col, value });
            }
        }
        Ok(CholeskyFactor { matrix })
    }

    /// Identity factor of size `n` (uncorrelated copula).
    ///
    /// # Errors
    /// Returns [`TransformError::EmptyCholesky`] if `n == 0`.
    pub fn identity(n: usize) -> TransformResult<Self> {
        Self::new(Array2::eye(n))
    }

    /// Factorize a correlation matrix `R` into its lower Cholesky factor.
    ///
    /// `R` must be square, finite, symmetric, have a unit diagonal, and have
    /// off-diagonal entries in `[-1, 1]`. The decomposition itself is done by
    /// `nalgebra`; the factor is copied back into an `ndarray` matrix and the
    /// strict upper triangle is zeroed.
    ///
    /// # Errors
    /// - [`TransformError::EmptyCholesky`] / [`TransformError::NonSquareCholesky`]
    ///   for malformed shapes.
    /// - [`TransformError::InvalidCorrelation`] if an entry breaks the contract.
    /// - [`TransformError::NotPositiveDefinite`] if the factorization fails.
    pub fn from_correlation(correlation: ArrayView2<f64>) -> TransformResult<Self> {
        let (rows, cols) = correlation.dim();
        if rows == 0 {
            return Err(TransformError::EmptyCholesky);
        }
        if rows != cols {
            return Err(TransformError::NonSquareCholesky { rows, cols });
        }
        validate_correlation(correlation)?;

        let n = rows;
        let dense = DMatrix::<f64>::from_fn(n, n, |i, j| correlation[[i, j]]);
        let lower = dense.cholesky().ok_or(TransformError::NotPositiveDefinite)?.unpack();
        let matrix = Array2::from_shape_fn((n, n), |(i, j)| if j > i { 0.0 } else { lower[(i, j)] });
        tracing::debug!(dimension = n, "factorized correlation matrix");
        Self::new(matrix)
    }

    /// Dimension `n` of the factor.
    pub fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    /// Read-only view of the underlying `n×n` matrix.
    pub fn matrix(&self) -> ArrayView2<'_, f64> {
        self.matrix.view()
    }

    /// Consume the factor and return the underlying matrix.
    pub fn into_matrix(self) -> Array2<f64> {
        self.matrix
    }

    /// Correlation matrix `R = L·Lᵀ` implied by this factor.
    pub fn correlation(&self) -> Array2<f64> {
        self.matrix.dot(&self.matrix.t())
    }

    /// Smallest absolute diagonal entry and its index.
    pub(crate) fn min_abs_diagonal(&self) -> (usize, f64) {
        self.matrix
            .diag()
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (i, d)| if d.abs() < best.1.abs() { (i, d) } else { best })
    }

    /// Triangular matrix–vector product `L·u`.
    ///
    /// # Panics
    /// If `u.len() != n`.
    pub fn mul_vec(&self, u: ArrayView1<f64>) -> Array1<f64> {
        let n = self.dimension();
        assert_eq!(u.len(), n, "mul_vec: operand length must equal the factor dimension");
        Array1::from_shape_fn(n, |i| {
            let mut acc = 0.0;
            for j in 0..=i {
                acc += self.matrix[[i, j]] * u[j];
            }
            acc
        })
    }

    /// Triangular matrix–matrix product `L·U` for an `n×m` operand.
    ///
    /// One pass over the lower triangle; each output row `i` accumulates the
    /// scaled operand rows `0..=i`.
    ///
    /// # Panics
    /// If `u.nrows() != n`.
    pub fn mul_mat(&self, u: ArrayView2<f64>) -> Array2<f64> {
        let n = self.dimension();
        assert_eq!(u.nrows(), n, "mul_mat: operand rows must equal the factor dimension");
        let mut out = Array2::<f64>::zeros((n, u.ncols()));
        for i in 0..n {
            let mut out_row = out.row_mut(i);
            for j in 0..=i {
                let l_ij = self.matrix[[i, j]];
                Zip::from(&mut out_row).and(u.row(j)).for_each(|acc, &x| *acc += l_ij * x);
            }
        }
        out
    }

    /// Forward substitution `L⁻¹·z`.
    ///
    /// Callers are expected to have checked that the diagonal has no zero
    /// entry (see [`TransformError::SingularCholesky`]).
    ///
    /// # Panics
    /// If `z.len() != n`.
    pub fn solve_vec(&self, z: ArrayView1<f64>) -> Array1<f64> {
        let n = self.dimension();
        assert_eq!(z.len(), n, "solve_vec: operand length must equal the factor dimension");
        let mut x = Array1::<f64>::zeros(n);
        for i in 0..n {
            let mut acc = 0.0;
            for j in 0..i {
                acc += self.matrix[[i, j]] * x[j];
            }
            x[i] = (z[i] - acc) / self.matrix[[i, i]];
        }
        x
    }

    /// Forward substitution `L⁻¹·Z` for an `n×m` operand, column-consistent
    /// with [`CholeskyFactor::solve_vec`].
    ///
    /// # Panics
    /// If `z.nrows() != n`.
    pub fn solve_mat(&self, z: ArrayView2<f64>) -> Array2<f64> {
        let n = self.dimension();
        assert_eq!(z.nrows(), n, "solve_mat: operand rows must equal the factor dimension");
        let m = z.ncols();
        let mut x = Array2::<f64>::zeros((n, m));
        let mut acc = Array1::<f64>::zeros(m);
        for i in 0..n {
            acc.fill(0.0);
            for j in 0..i {
                let l_ij = self.matrix[[i, j]];
                Zip::from(&mut acc).and(x.row(j)).for_each(|a, &xj| *a += l_ij * xj);
            }
            let l_ii = self.matrix[[i, i]];
            Zip::from(x.row_mut(i)).and(z.row(i)).and(&acc).for_each(|xi, &zi, &a| {
                *xi = (zi - a) / l_ii;
            });
        }
        x
    }
}

impl fmt::Display for CholeskyFactor {
    /// Row-major rendering, e.g. `[[1,0],[0.5,0.866]]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.matrix.rows().into_iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "[")?;
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{value}")?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

fn validate_correlation(correlation: ArrayView2<f64>) -> TransformResult<()> {
    for ((row, col), &value) in correlation.indexed_iter() {
        if !value.is_finite() {
            return Err(TransformError::InvalidCorrelation {
                row,
                col,
                value,
                reason: "Entries must be finite.",
            });
        }
        if row == col {
            if (value - 1.0).abs() > CORRELATION_TOL {
                return Err(TransformError::InvalidCorrelation {
                    row,
                    col,
                    value,
                    reason: "Diagonal entries must equal 1.",
                });
            }
            continue;
        }
        if value.abs() > 1.0 {
            return Err(TransformError::InvalidCorrelation {
                row,
                col,
                value,
                reason: "Off-diagonal entries must lie in [-1, 1].",
            });
        }
        if (value - correlation[[col, row]]).abs() > CORRELATION_TOL {
            return Err(TransformError::InvalidCorrelation {
                row,
                col,
                value,
                reason: "Matrix must be symmetric.",
            });
        }
    }
    Ok(())
}
