pub mod batch;
pub mod config;
pub mod error;
pub mod inference;
pub mod migration;
pub mod model;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod tokenizer;

pub use batch::{BatchInput, BatchReport, BatchRow, BatchRunner, BatchState, LabelCounts, FAILED_ROW_MARKER};
pub use config::{Backend, SentimentConfig};
pub use error::{InferenceError, Result};
pub use inference::SentimentInference;
pub use model::{KerasSequenceModel, SequenceClassifier};
#[cfg(feature = "onnx")]
pub use onnx::OnnxSequenceModel;
pub use tokenizer::{KerasVocabulary, PaddedSequence, SentimentTokenizer, MAX_SEQUENCE_LENGTH};

use serde::{Deserialize, Serialize};
use std::fmt;

pub const NUM_CLASSES: usize = 3;

/// Class decided for a text. The first three follow the classifier's output
/// order; `Error` marks a prediction that could not be made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(alias = "Negatif")]
    Negative,
    #[serde(alias = "Netral")]
    Neutral,
    #[serde(alias = "Positif")]
    Positive,
    Error,
}

impl SentimentLabel {
    pub const CLASSES: [SentimentLabel; NUM_CLASSES] =
        [SentimentLabel::Negative, SentimentLabel::Neutral, SentimentLabel::Positive];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::CLASSES.get(index).copied()
    }

    pub fn index(&self) -> Option<usize> {
        Self::CLASSES.iter().position(|label| label == self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Error => "Error",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class distribution indexed as {0: Negative, 1: Neutral, 2: Positive}.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityVector([f64; NUM_CLASSES]);

impl ProbabilityVector {
    pub fn new(values: [f64; NUM_CLASSES]) -> Self {
        Self(values)
    }

    pub fn zeros() -> Self {
        Self([0.0; NUM_CLASSES])
    }

    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let values: [f64; NUM_CLASSES] = values.try_into().map_err(|_| InferenceError::Shape {
            expected: NUM_CLASSES,
            actual: values.len(),
        })?;
        Ok(Self(values))
    }

    pub fn as_array(&self) -> &[f64; NUM_CLASSES] {
        &self.0
    }

    pub fn get(&self, label: SentimentLabel) -> f64 {
        label.index().map(|idx| self.0[idx]).unwrap_or(0.0)
    }

    /// Index of the largest probability; the lowest index wins ties.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (idx, &value) in self.0.iter().enumerate().skip(1) {
            if value > self.0[best] {
                best = idx;
            }
        }
        best
    }

    pub fn max(&self) -> f64 {
        self.0[self.argmax()]
    }

    pub fn is_distribution(&self, tolerance: f64) -> bool {
        let in_range = self.0.iter().all(|p| (0.0..=1.0).contains(p));
        let total: f64 = self.0.iter().sum();
        in_range && (total - 1.0).abs() <= tolerance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: SentimentLabel,
    /// Percentage in [0, 100].
    pub confidence: f64,
    pub probabilities: ProbabilityVector,
    pub cleaned_text: String,
}

impl PredictionResult {
    pub fn error(raw_text: &str) -> Self {
        Self {
            label: SentimentLabel::Error,
            confidence: 0.0,
            probabilities: ProbabilityVector::zeros(),
            cleaned_text: raw_text.to_string(),
        }
    }

    pub fn from_probabilities(probabilities: ProbabilityVector, cleaned_text: String) -> Self {
        let label_idx = probabilities.argmax();
        // argmax is always < NUM_CLASSES
        let label = SentimentLabel::from_index(label_idx).unwrap_or(SentimentLabel::Error);

        Self {
            label,
            confidence: probabilities.as_array()[label_idx] * 100.0,
            probabilities,
            cleaned_text,
        }
    }

    pub fn is_error(&self) -> bool {
        self.label == SentimentLabel::Error
    }
}
