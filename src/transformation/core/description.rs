//! Default component labels for transformation inputs and outputs.
//!
//! A transform of dimension `n` is described by `n` input labels
//! `x0…x{n-1}` followed by `n` output labels `y0…y{n-1}`. Labels are purely
//! informational; they are persisted with the evaluator and shown by its
//! long textual form.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered list of component labels (inputs first, then outputs).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Description(Vec<String>);

impl Description {
    /// Labels `{prefix}0 … {prefix}{size-1}`.
    pub fn build_default(size: usize, prefix: &str) -> Self {
        Description((0..size).map(|i| format!("{prefix}{i}")).collect())
    }

    /// Input labels `x…` followed by output labels `y…`.
    pub fn for_transform(input_dimension: usize, output_dimension: usize) -> Self {
        let mut description = Self::build_default(input_dimension, "x");
        description.extend(Self::build_default(output_dimension, "y"));
        description
    }

    /// Append all labels of `other`.
    pub fn extend(&mut self, other: Description) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Description {
    fn from(labels: Vec<String>) -> Self {
        Description(labels)
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(","))
    }
}
