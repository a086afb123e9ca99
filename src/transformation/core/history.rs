//! history — call counting and optional input/output capture.
//!
//! Purpose
//! -------
//! Provide the instrumentation every evaluator owns: a monotone invocation
//! counter and an append-only history of evaluated inputs and outputs that is
//! populated only while capture is enabled.
//!
//! Key behaviors
//! -------------
//! - A point evaluation counts 1 call and, when enabled, appends one
//!   [`HistoryRecord::Point`] to each side.
//! - A batch of `m` points counts `m` calls and, when enabled, appends one
//!   [`HistoryRecord::Sample`] to each side (the whole batch is one event).
//! - Flattened `k×n` tables of all recorded rows are available through
//!   [`EvaluationHistory::inputs_table`] / [`EvaluationHistory::outputs_table`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `calls_number` is only ever incremented; there is no reset.
//! - `inputs` and `outputs` always have the same number of records, and record
//!   `k` on both sides comes from the same call.
//! - Growth is unbounded while capture is enabled; `clear` drops the records
//!   but leaves the counter untouched.
use crate::transformation::errors::{TransformError, TransformResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, concatenate};

/// One recorded evaluation event.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryRecord {
    /// Single evaluated point.
    Point(Array1<f64>),
    /// Whole evaluated batch, rows = points.
    Sample(Array2<f64>),
}

impl HistoryRecord {
    /// Number of points carried by the record.
    pub fn len(&self) -> usize {
        match self {
            HistoryRecord::Point(_) => 1,
            HistoryRecord::Sample(sample) => sample.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The record as an `r×n` table (`1×n` for a point).
    pub fn rows(&self) -> ArrayView2<'_, f64> {
        match self {
            HistoryRecord::Point(point) => point.view().insert_axis(Axis(0)),
            HistoryRecord::Sample(sample) => sample.view(),
        }
    }
}

/// Append-only record of evaluated inputs and outputs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvaluationHistory {
    enabled: bool,
    inputs: Vec<HistoryRecord>,
    outputs: Vec<HistoryRecord>,
}

impl EvaluationHistory {
    pub fn new(enabled: bool) -> Self {
        EvaluationHistory { enabled, inputs: Vec::new(), outputs: Vec::new() }
    }

    /// Rebuild a history from archived records.
    pub(crate) fn from_records(
        enabled: bool, inputs: Vec<HistoryRecord>, outputs: Vec<HistoryRecord>,
    ) -> Self {
        EvaluationHistory { enabled, inputs, outputs }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Stop capturing; already recorded entries are kept.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Drop every recorded entry.
    pub fn clear(&mut self) {
        self.inputs.clear();
        self.outputs.clear();
    }

    pub fn inputs(&self) -> &[HistoryRecord] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[HistoryRecord] {
        &self.outputs
    }

    /// All recorded inputs stacked into one `k×dimension` table.
    ///
    /// # Errors
    /// Returns [`TransformError::DimensionMismatch`] if a record is not
    /// `dimension` wide.
    pub fn inputs_table(&self, dimension: usize) -> TransformResult<Array2<f64>> {
        stack_records(&self.inputs, dimension)
    }

    /// All recorded outputs stacked into one `k×dimension` table.
    ///
    /// # Errors
    /// See [`EvaluationHistory::inputs_table`].
    pub fn outputs_table(&self, dimension: usize) -> TransformResult<Array2<f64>> {
        stack_records(&self.outputs, dimension)
    }

    fn store(&mut self, input: HistoryRecord, output: HistoryRecord) {
        if self.enabled {
            self.inputs.push(input);
            self.outputs.push(output);
        }
    }
}

fn stack_records(records: &[HistoryRecord], dimension: usize) -> TransformResult<Array2<f64>> {
    let views: Vec<ArrayView2<'_, f64>> = records.iter().map(HistoryRecord::rows).collect();
    if let Some(view) = views.iter().find(|view| view.ncols() != dimension) {
        return Err(TransformError::DimensionMismatch { expected: dimension, actual: view.ncols() });
    }
    if views.is_empty() {
        return Ok(Array2::zeros((0, dimension)));
    }
    concatenate(Axis(0), &views[..])
        .map_err(|_| TransformError::DimensionMismatch { expected: dimension, actual: 0 })
}

/// Counter plus history, owned by each evaluator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Instrumentation {
    calls_number: u64,
    history: EvaluationHistory,
}

impl Instrumentation {
    pub fn new(history_enabled: bool) -> Self {
        Instrumentation { calls_number: 0, history: EvaluationHistory::new(history_enabled) }
    }

    /// Rebuild instrumentation from archived state.
    pub(crate) fn restore(calls_number: u64, history: EvaluationHistory) -> Self {
        Instrumentation { calls_number, history }
    }

    pub fn calls_number(&self) -> u64 {
        self.calls_number
    }

    pub fn history(&self) -> &EvaluationHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut EvaluationHistory {
        &mut self.history
    }

    /// Count one point evaluation and capture it if enabled.
    pub fn record_point(&mut self, input: ArrayView1<f64>, output: &Array1<f64>) {
        self.calls_number += 1;
        if self.history.is_enabled() {
            self.history
                .store(HistoryRecord::Point(input.to_owned()), HistoryRecord::Point(output.clone()));
        }
    }

    /// Count a batch of `input.nrows()` evaluations and capture it as one
    /// event if enabled. Empty batches leave the history untouched.
    pub fn record_sample(&mut self, input: ArrayView2<f64>, output: &Array2<f64>) {
        let size = input.nrows();
        self.calls_number += size as u64;
        if size > 0 && self.history.is_enabled() {
            self.history.store(
                HistoryRecord::Sample(input.to_owned()),
                HistoryRecord::Sample(output.clone()),
            );
        }
    }
}
