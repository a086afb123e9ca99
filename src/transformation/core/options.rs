//! Evaluation options — runtime configuration for transform evaluators.
//!
//! Purpose
//! -------
//! Collect the knobs that change how an evaluator runs without changing what
//! it computes: whether history capture starts enabled, and from which batch
//! size the per-dimension CDF calls are spread over the `rayon` thread pool.
//!
//! Invariants & assumptions
//! ------------------------
//! - Options never affect results: the parallel and serial batch paths produce
//!   identical outputs.
//! - Options are runtime-only and are not persisted; a loaded evaluator uses
//!   [`EvaluationOptions::default`] with the archived history flag applied.

/// Batch size (`m·n` entries) from which batch evaluation runs in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 14;

/// EvaluationOptions — runtime configuration for evaluators.
///
/// Fields
/// ------
/// - `history_enabled`: `bool`
///   Initial state of history capture.
/// - `parallel_threshold`: `usize`
///   Minimum number of entries (`m·n`) in a batch before dimensions are
///   evaluated on the `rayon` pool. Ignored without the `parallel` feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationOptions {
    pub history_enabled: bool,
    pub parallel_threshold: usize,
}

impl EvaluationOptions {
    pub fn new(history_enabled: bool, parallel_threshold: usize) -> Self {
        EvaluationOptions { history_enabled, parallel_threshold }
    }

    /// Returns `true` if a batch with `entries` values should run in parallel.
    pub fn use_parallel(&self, entries: usize) -> bool {
        cfg!(feature = "parallel") && entries >= self.parallel_threshold
    }
}

impl Default for EvaluationOptions {
    /// History disabled, [`DEFAULT_PARALLEL_THRESHOLD`].
    fn default() -> Self {
        EvaluationOptions { history_enabled: false, parallel_threshold: DEFAULT_PARALLEL_THRESHOLD }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify that the defaults match the documented baseline.
    //
    // Given
    // -----
    // - `EvaluationOptions::default()`.
    //
    // Expect
    // ------
    // - History disabled and the default parallel threshold.
    fn default_matches_documented_baseline() {
        // Arrange / Act
        let opts = EvaluationOptions::default();

        // Assert
        assert!(!opts.history_enabled);
        assert_eq!(opts.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
    }

    #[test]
    // Purpose
    // -------
    // Verify the parallel switch respects the threshold.
    //
    // Given
    // -----
    // - Threshold 10 and batches of 9 and 10 entries.
    //
    // Expect
    // ------
    // - 9 entries never run in parallel; 10 entries do iff the `parallel`
    //   feature is compiled in.
    fn use_parallel_respects_threshold() {
        // Arrange
        let opts = EvaluationOptions::new(false, 10);

        // Act / Assert
        assert!(!opts.use_parallel(9));
        assert_eq!(opts.use_parallel(10), cfg!(feature = "parallel"));
    }
}
