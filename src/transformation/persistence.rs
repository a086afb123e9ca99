//! persistence — versioned archives for Nataf evaluators.
//!
//! Purpose
//! -------
//! Save and reload evaluators through an explicit, versioned schema instead
//! of reflective by-name attributes. An archive lists exactly the observable
//! state of an evaluator:
//!
//! ```text
//! version, class, description, callsNumber, historyEnabled,
//! inputHistory, outputHistory, standardDistribution_, cholesky_
//! ```
//!
//! Key behaviors
//! -------------
//! - [`EvaluationArchive`] is the schema (version [`ARCHIVE_VERSION`]); it is
//!   serialized as JSON with `serde_json`.
//! - Loading re-runs every construction check (factor validation,
//!   distribution parameters, distribution/factor dimensions, singular
//!   diagonal for the forward map)
//!   and rejects unknown versions, foreign classes, and inconsistent history
//!   or description entries.
//! - Non-finite values, which an overflowing product of finite inputs can
//!   still leave in the history, are written as the strings `"inf"`,
//!   `"-inf"`, `"nan"`, since JSON numbers cannot carry them.
//!
//! Invariants & assumptions
//! ------------------------
//! - `save` followed by `load` yields an evaluator equal in dimension,
//!   factor, distribution, description, counter, history, and outputs.
//! - Runtime [`EvaluationOptions`](crate::transformation::core::EvaluationOptions)
//!   are not archived; loaded evaluators use the defaults.
use crate::transformation::{
    core::{
        CholeskyFactor, Description, EvaluationHistory, HistoryRecord, Instrumentation,
        StandardElliptical,
    },
    errors::{TransformError, TransformResult},
    evaluation::{Evaluation, InverseNatafEllipticalCopulaEvaluation, NatafEllipticalCopulaEvaluation},
};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Current archive schema version.
pub const ARCHIVE_VERSION: u32 = 1;

/// Versioned archive of an elliptical-copula evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EvaluationArchive {
    pub version: u32,
    pub class: String,
    pub description: Description,
    pub calls_number: u64,
    pub history_enabled: bool,
    pub input_history: Vec<RecordArchive>,
    pub output_history: Vec<RecordArchive>,
    #[serde(rename = "standardDistribution_")]
    pub standard_distribution: StandardElliptical,
    #[serde(rename = "cholesky_")]
    pub cholesky: MatrixArchive,
}

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixArchive {
    pub rows: usize,
    pub cols: usize,
    #[serde(with = "json_floats")]
    pub data: Vec<f64>,
}

/// One archived history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordArchive {
    Point {
        #[serde(with = "json_floats")]
        values: Vec<f64>,
    },
    Sample(MatrixArchive),
}

impl MatrixArchive {
    fn capture(matrix: ndarray::ArrayView2<f64>) -> Self {
        MatrixArchive { rows: matrix.nrows(), cols: matrix.ncols(), data: matrix.iter().copied().collect() }
    }

    fn restore(self) -> TransformResult<Array2<f64>> {
        let (rows, cols, len) = (self.rows, self.cols, self.data.len());
        Array2::from_shape_vec((rows, cols), self.data).map_err(|_| TransformError::CorruptArchive {
            reason: format!("matrix of shape {rows}x{cols} holds {len} values"),
        })
    }
}

impl RecordArchive {
    fn capture(record: &HistoryRecord) -> Self {
        match record {
            HistoryRecord::Point(point) => RecordArchive::Point { values: point.to_vec() },
            HistoryRecord::Sample(sample) => RecordArchive::Sample(MatrixArchive::capture(sample.view())),
        }
    }

    fn restore(self, dimension: usize) -> TransformResult<HistoryRecord> {
        let record = match self {
            RecordArchive::Point { values } => HistoryRecord::Point(Array1::from(values)),
            RecordArchive::Sample(matrix) => HistoryRecord::Sample(matrix.restore()?),
        };
        let width = record.rows().ncols();
        if width != dimension {
            return Err(TransformError::CorruptArchive {
                reason: format!("history record has {width} coordinates, expected {dimension}"),
            });
        }
        Ok(record)
    }
}

/// State recovered from an archive, already validated against the class.
struct RestoredParts {
    standard_distribution: StandardElliptical,
    cholesky: CholeskyFactor,
    description: Description,
    instrumentation: Instrumentation,
}

impl EvaluationArchive {
    /// Snapshot the observable state of `evaluation`.
    fn capture<E: Evaluation + ?Sized>(
        evaluation: &E, standard_distribution: StandardElliptical, cholesky: &CholeskyFactor,
    ) -> Self {
        let history = evaluation.instrumentation().history();
        EvaluationArchive {
            version: ARCHIVE_VERSION,
            class: evaluation.class_name().to_owned(),
            description: evaluation.description().clone(),
            calls_number: evaluation.calls_number(),
            history_enabled: history.is_enabled(),
            input_history: history.inputs().iter().map(RecordArchive::capture).collect(),
            output_history: history.outputs().iter().map(RecordArchive::capture).collect(),
            standard_distribution,
            cholesky: MatrixArchive::capture(cholesky.matrix()),
        }
    }

    /// Validate the archive header and payload for `expected_class`.
    fn restore(self, expected_class: &'static str) -> TransformResult<RestoredParts> {
        if self.version != ARCHIVE_VERSION {
            return Err(TransformError::UnsupportedArchiveVersion {
                found: self.version,
                supported: ARCHIVE_VERSION,
            });
        }
        if self.class != expected_class {
            return Err(TransformError::ArchiveClassMismatch { expected: expected_class, found: self.class });
        }
        let standard_distribution = self.standard_distribution.validated()?;
        let cholesky = CholeskyFactor::new(self.cholesky.restore()?)?;
        let dimension = cholesky.dimension();
        if self.description.len() != 2 * dimension {
            return Err(TransformError::CorruptArchive {
                reason: format!(
                    "description has {} labels, expected {}",
                    self.description.len(),
                    2 * dimension
                ),
            });
        }
        if self.input_history.len() != self.output_history.len() {
            return Err(TransformError::CorruptArchive {
                reason: format!(
                    "{} input records but {} output records",
                    self.input_history.len(),
                    self.output_history.len()
                ),
            });
        }
        let inputs = self
            .input_history
            .into_iter()
            .map(|record| record.restore(dimension))
            .collect::<TransformResult<Vec<_>>>()?;
        let outputs = self
            .output_history
            .into_iter()
            .map(|record| record.restore(dimension))
            .collect::<TransformResult<Vec<_>>>()?;
        let history = EvaluationHistory::from_records(self.history_enabled, inputs, outputs);
        Ok(RestoredParts {
            standard_distribution,
            cholesky,
            description: self.description,
            instrumentation: Instrumentation::restore(self.calls_number, history),
        })
    }

    pub fn to_json(&self) -> TransformResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> TransformResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl InverseNatafEllipticalCopulaEvaluation {
    /// Versioned archive of this evaluator.
    pub fn to_archive(&self) -> EvaluationArchive {
        EvaluationArchive::capture(self, *self.standard_distribution(), self.cholesky())
    }

    /// Rebuild an evaluator from an archive.
    ///
    /// # Errors
    /// Any construction error, plus the archive errors
    /// ([`TransformError::UnsupportedArchiveVersion`],
    /// [`TransformError::ArchiveClassMismatch`], [`TransformError::CorruptArchive`]).
    pub fn from_archive(archive: EvaluationArchive) -> TransformResult<Self> {
        let parts = archive.restore(Self::CLASS_NAME)?;
        let mut evaluation = Self::new(parts.standard_distribution, parts.cholesky)?;
        evaluation.restore_state(parts.description, parts.instrumentation);
        Ok(evaluation)
    }

    /// Serialize to a JSON document.
    pub fn save(&self) -> TransformResult<String> {
        let json = self.to_archive().to_json()?;
        tracing::debug!(class = Self::CLASS_NAME, bytes = json.len(), "saved evaluation");
        Ok(json)
    }

    pub fn save_to_writer<W: Write>(&self, writer: W) -> TransformResult<()> {
        Ok(serde_json::to_writer_pretty(writer, &self.to_archive())?)
    }

    /// Deserialize from a JSON document produced by [`Self::save`].
    pub fn load(raw: &str) -> TransformResult<Self> {
        let evaluation = Self::from_archive(EvaluationArchive::from_json(raw)?)?;
        tracing::debug!(class = Self::CLASS_NAME, dimension = evaluation.input_dimension(), "loaded evaluation");
        Ok(evaluation)
    }

    pub fn load_from_reader<R: Read>(reader: R) -> TransformResult<Self> {
        Self::from_archive(serde_json::from_reader(reader)?)
    }
}

impl NatafEllipticalCopulaEvaluation {
    /// Versioned archive of this evaluator.
    pub fn to_archive(&self) -> EvaluationArchive {
        EvaluationArchive::capture(self, *self.standard_distribution(), self.cholesky())
    }

    /// Rebuild an evaluator from an archive.
    ///
    /// # Errors
    /// Same as [`InverseNatafEllipticalCopulaEvaluation::from_archive`], plus
    /// [`TransformError::SingularCholesky`].
    pub fn from_archive(archive: EvaluationArchive) -> TransformResult<Self> {
        let parts = archive.restore(Self::CLASS_NAME)?;
        let mut evaluation = Self::new(parts.standard_distribution, parts.cholesky)?;
        evaluation.restore_state(parts.description, parts.instrumentation);
        Ok(evaluation)
    }

    pub fn save(&self) -> TransformResult<String> {
        let json = self.to_archive().to_json()?;
        tracing::debug!(class = Self::CLASS_NAME, bytes = json.len(), "saved evaluation");
        Ok(json)
    }

    pub fn save_to_writer<W: Write>(&self, writer: W) -> TransformResult<()> {
        Ok(serde_json::to_writer_pretty(writer, &self.to_archive())?)
    }

    pub fn load(raw: &str) -> TransformResult<Self> {
        let evaluation = Self::from_archive(EvaluationArchive::from_json(raw)?)?;
        tracing::debug!(class = Self::CLASS_NAME, dimension = evaluation.input_dimension(), "loaded evaluation");
        Ok(evaluation)
    }

    pub fn load_from_reader<R: Read>(reader: R) -> TransformResult<Self> {
        Self::from_archive(serde_json::from_reader(reader)?)
    }
}

/// JSON-safe `f64` sequences: finite values as numbers, the rest as strings.
mod json_floats {
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum JsonFloat {
        Number(f64),
        Special(String),
    }

    impl From<f64> for JsonFloat {
        fn from(value: f64) -> Self {
            if value.is_finite() {
                JsonFloat::Number(value)
            } else if value.is_nan() {
                JsonFloat::Special("nan".to_owned())
            } else if value > 0.0 {
                JsonFloat::Special("inf".to_owned())
            } else {
                JsonFloat::Special("-inf".to_owned())
            }
        }
    }

    impl JsonFloat {
        fn into_f64(self) -> Result<f64, String> {
            match self {
                JsonFloat::Number(value) => Ok(value),
                JsonFloat::Special(text) => match text.as_str() {
                    "inf" => Ok(f64::INFINITY),
                    "-inf" => Ok(f64::NEG_INFINITY),
                    "nan" => Ok(f64::NAN),
                    other => Err(format!("invalid float literal {other:?}")),
                },
            }
        }
    }

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|&v| JsonFloat::from(v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<JsonFloat>::deserialize(deserializer)?
            .into_iter()
            .map(|v| v.into_f64().map_err(D::Error::custom))
            .collect()
    }
}
