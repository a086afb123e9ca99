//! Integration tests for the Nataf elliptical copula transforms.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: from a correlation matrix or an
//!   explicit Cholesky factor, through inverse and forward Nataf evaluation,
//!   to instrumentation and JSON persistence.
//! - Exercise realistic regimes (Gaussian and Student marginals, correlated
//!   factors, batches large enough to take the parallel path) rather than toy
//!   edge cases only.
//!
//! Coverage
//! --------
//! - `transformation::core`:
//!   - `CholeskyFactor` construction from a factor and from a correlation
//!     matrix.
//!   - `StandardElliptical` for both families.
//! - `transformation::evaluation`:
//!   - Point and batch evaluation, forward/inverse round trips, and use
//!     through `Box<dyn Evaluation>`.
//! - `transformation::persistence`:
//!   - `save`/`load` round trips that preserve counters and history.
//!
//! Exclusions
//! ----------
//! - Fine-grained validation of low-level building blocks (triangular
//!   products, validation routines, marginal wrappers) — these are covered by
//!   unit tests.
//! - Python bindings — those are expected to be tested at the Python level.
use approx::assert_relative_eq;
use ndarray::{Array2, array};
use rust_copulas::transformation::{
    CholeskyFactor, Evaluation, EvaluationOptions, InverseNatafEllipticalCopulaEvaluation,
    NatafEllipticalCopulaEvaluation, StandardElliptical, TransformError,
};

/// Purpose
/// -------
/// Build a deterministic `m × n` sample spread over `[-3, 3]` in every
/// coordinate.
///
/// Parameters
/// ----------
/// - `m`: Number of points (rows).
/// - `n`: Number of coordinates (columns).
///
/// Returns
/// -------
/// `Array2<f64>`
///   Sample whose entries follow a fixed, non-trivial pattern.
fn spread_sample(m: usize, n: usize) -> Array2<f64> {
    Array2::from_shape_fn((m, n), |(i, j)| {
        let t = ((i * 7 + j * 13) % 61) as f64 / 60.0;
        6.0 * t - 3.0
    })
}

/// Purpose
/// -------
/// Correlation matrix with a Toeplitz structure `ρ^|i-j|`, positive definite
/// for `|ρ| < 1`.
fn toeplitz_correlation(n: usize, rho: f64) -> Array2<f64> {
    Array2::from_shape_fn((n, n), |(i, j)| rho.powi((i as i32 - j as i32).abs()))
}

#[test]
// Purpose
// -------
// Verify the reference scenario end-to-end through the public surface.
//
// Given
// -----
// - `L = [[1, 0], [0.5, 0.866]]` and a standard normal distribution.
//
// Expect
// ------
// - `(0, 0) ↦ (0.5, 0.5)` and `(1, 0) ↦ (Φ(1), Φ(0.5))`.
fn reference_scenario_through_public_surface() {
    // Arrange
    let factor = CholeskyFactor::new(array![[1.0, 0.0], [0.5, 0.866]]).unwrap();
    let mut eval =
        InverseNatafEllipticalCopulaEvaluation::new(StandardElliptical::normal(2), factor)
            .unwrap();

    // Act
    let sample = eval.evaluate_sample(array![[0.0, 0.0], [1.0, 0.0]].view()).unwrap();

    // Assert
    assert_eq!(sample.dim(), (2, 2));
    assert_relative_eq!(sample[[0, 0]], 0.5, epsilon = 1e-15);
    assert_relative_eq!(sample[[0, 1]], 0.5, epsilon = 1e-15);
    assert_relative_eq!(sample[[1, 0]], 0.8413, epsilon = 1e-4);
    assert_relative_eq!(sample[[1, 1]], 0.6915, epsilon = 1e-4);
    assert_eq!(eval.calls_number(), 2);
}

#[test]
// Purpose
// -------
// Verify that the forward transform undoes the inverse transform for a
// factor built from a correlation matrix.
//
// Given
// -----
// - A 4-dimensional Toeplitz correlation with `ρ = 0.6`, both families, and
//   a spread sample of 50 points.
//
// Expect
// ------
// - `T(T⁻¹(u)) ≈ u` for every point, and the factor reproduces the
//   correlation matrix.
fn forward_transform_inverts_inverse_transform() {
    let correlation = toeplitz_correlation(4, 0.6);
    let factor = CholeskyFactor::from_correlation(correlation.view()).unwrap();
    assert!(
        factor
            .correlation()
            .iter()
            .zip(correlation.iter())
            .all(|(a, b)| (a - b).abs() < 1e-12)
    );

    let families = [StandardElliptical::normal(4), StandardElliptical::student(5.0, 4).unwrap()];
    let sample = spread_sample(50, 4);

    for distribution in families {
        let mut inverse =
            InverseNatafEllipticalCopulaEvaluation::new(distribution, factor.clone()).unwrap();
        let mut forward: NatafEllipticalCopulaEvaluation = inverse.inverse().unwrap();

        let copula = inverse.evaluate_sample(sample.view()).unwrap();
        assert!(copula.iter().all(|&p| p > 0.0 && p < 1.0));

        let back = forward.evaluate_sample(copula.view()).unwrap();
        for (a, b) in back.iter().zip(sample.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-5);
        }
        assert_eq!(inverse.calls_number(), 50);
        assert_eq!(forward.calls_number(), 50);
    }
}

#[test]
// Purpose
// -------
// Verify that the parallel batch path returns exactly the point results.
//
// Given
// -----
// - A 3-dimensional correlated factor, Student(4) marginals, a threshold of
//   1 (always parallel when the feature is on), and 400 points.
//
// Expect
// ------
// - Every batch row equals the corresponding point evaluation bit for bit.
fn batch_rows_match_points_on_large_samples() {
    let factor = CholeskyFactor::from_correlation(toeplitz_correlation(3, -0.4).view()).unwrap();
    let distribution = StandardElliptical::student(4.0, 3).unwrap();
    let mut batch = InverseNatafEllipticalCopulaEvaluation::with_options(
        distribution,
        factor.clone(),
        EvaluationOptions::new(false, 1),
    )
    .unwrap();
    let mut point = InverseNatafEllipticalCopulaEvaluation::new(distribution, factor).unwrap();
    let sample = spread_sample(400, 3);

    let rows = batch.evaluate_sample(sample.view()).unwrap();

    for (i, input) in sample.outer_iter().enumerate() {
        let expected = point.evaluate(input).unwrap();
        assert_eq!(rows.row(i), expected);
    }
    assert_eq!(batch.calls_number(), point.calls_number());
}

#[test]
// Purpose
// -------
// Verify that heterogeneous evaluators compose through trait objects.
//
// Given
// -----
// - A `Vec<Box<dyn Evaluation>>` holding an inverse and a forward transform
//   over the same factor.
//
// Expect
// ------
// - Chaining them returns the input, each keeps its own counter, and cloned
//   boxes start from the same state but evolve independently.
fn trait_objects_compose_into_a_pipeline() {
    let factor = CholeskyFactor::new(array![[1.0, 0.0], [0.3, 0.95]]).unwrap();
    let inverse =
        InverseNatafEllipticalCopulaEvaluation::new(StandardElliptical::normal(2), factor)
            .unwrap();
    let forward = inverse.inverse().unwrap();
    let mut pipeline: Vec<Box<dyn Evaluation>> = vec![Box::new(inverse), Box::new(forward)];

    let input = array![0.7, -1.2];
    let mut value = input.clone();
    for stage in pipeline.iter_mut() {
        value = stage.evaluate(value.view()).unwrap();
    }

    assert_relative_eq!(value[0], input[0], epsilon = 1e-7);
    assert_relative_eq!(value[1], input[1], epsilon = 1e-7);
    assert_eq!(pipeline[0].class_name(), "InverseNatafEllipticalCopulaEvaluation");
    assert_eq!(pipeline[1].class_name(), "NatafEllipticalCopulaEvaluation");

    let mut cloned = pipeline.clone();
    cloned[0].evaluate(input.view()).unwrap();
    assert_eq!(cloned[0].calls_number(), 2);
    assert_eq!(pipeline[0].calls_number(), 1);
}

#[test]
// Purpose
// -------
// Verify that save/load preserves the transform and its instrumentation.
//
// Given
// -----
// - A Student evaluator with history enabled after one point and one batch.
//
// Expect
// ------
// - The JSON carries `standardDistribution_` and `cholesky_`, the reloaded
//   evaluator reports the same counter, history, and textual form, and both
//   produce identical results afterwards.
fn save_load_preserves_state() {
    let factor = CholeskyFactor::from_correlation(toeplitz_correlation(3, 0.25).view()).unwrap();
    let mut eval = InverseNatafEllipticalCopulaEvaluation::new(
        StandardElliptical::student(3.0, 3).unwrap(),
        factor,
    )
    .unwrap();
    eval.enable_history();
    eval.evaluate(array![0.1, 0.2, 0.3].view()).unwrap();
    eval.evaluate_sample(spread_sample(5, 3).view()).unwrap();

    let json = eval.save().unwrap();
    assert!(json.contains("standardDistribution_"));
    assert!(json.contains("cholesky_"));

    let mut restored = InverseNatafEllipticalCopulaEvaluation::load(&json).unwrap();
    assert_eq!(restored.calls_number(), 6);
    assert!(restored.is_history_enabled());
    assert_eq!(restored.input_history(), eval.input_history());
    assert_eq!(restored.output_history(), eval.output_history());
    assert_eq!(restored.to_string(), eval.to_string());
    assert_eq!(restored.cholesky(), eval.cholesky());

    let fixed = array![-0.4, 1.1, 2.0];
    assert_eq!(eval.evaluate(fixed.view()).unwrap(), restored.evaluate(fixed.view()).unwrap());

    // Archives are class-specific.
    assert!(matches!(
        NatafEllipticalCopulaEvaluation::load(&json),
        Err(TransformError::ArchiveClassMismatch { .. })
    ));
}

#[test]
// Purpose
// -------
// Verify the public error paths and that failures leave no side effects.
//
// Given
// -----
// - Mismatched distribution/factor dimensions, a non-triangular factor, an
//   indefinite correlation matrix, wrong-width inputs, and out-of-range
//   probabilities.
//
// Expect
// ------
// - The matching `TransformError` variant each time, and unchanged counters.
fn error_paths_are_reported() {
    let upper = CholeskyFactor::new(array![[1.0, 0.2], [0.0, 1.0]]);
    assert!(matches!(upper, Err(TransformError::NotLowerTriangular { row: 0, col: 1, .. })));

    let indefinite = array![[1.0, 0.9, -0.9], [0.9, 1.0, 0.9], [-0.9, 0.9, 1.0]];
    assert!(matches!(
        CholeskyFactor::from_correlation(indefinite.view()),
        Err(TransformError::NotPositiveDefinite)
    ));

    let mismatch = InverseNatafEllipticalCopulaEvaluation::new(
        StandardElliptical::normal(3),
        CholeskyFactor::identity(2).unwrap(),
    );
    assert!(matches!(
        mismatch,
        Err(TransformError::DistributionDimensionMismatch { expected: 2, actual: 3 })
    ));

    let mut inverse = InverseNatafEllipticalCopulaEvaluation::new(
        StandardElliptical::normal(2),
        CholeskyFactor::identity(2).unwrap(),
    )
    .unwrap();
    assert!(matches!(
        inverse.evaluate(array![1.0, 2.0, 3.0].view()),
        Err(TransformError::DimensionMismatch { expected: 2, actual: 3 })
    ));
    assert!(matches!(
        inverse.evaluate_sample(Array2::<f64>::zeros((4, 3)).view()),
        Err(TransformError::DimensionMismatch { expected: 2, actual: 3 })
    ));
    assert_eq!(inverse.calls_number(), 0);

    let mut forward = inverse.inverse().unwrap();
    assert!(matches!(
        forward.evaluate(array![0.5, 1.5].view()),
        Err(TransformError::InvalidProbability { .. })
    ));
    assert_eq!(forward.calls_number(), 0);
}
