use crate::{InferenceError, PredictionResult, ProbabilityVector, Result, SentimentInference, SentimentLabel};
use serde::Serialize;

/// Cleaned-text value written for a row whose prediction failed.
pub const FAILED_ROW_MARKER: &str = "GAGAL DIPROSES";

/// A batch row that carries a text to classify.
pub trait BatchInput {
    fn text(&self) -> &str;
}

impl BatchInput for String {
    fn text(&self) -> &str {
        self
    }
}

impl BatchInput for &str {
    fn text(&self) -> &str {
        self
    }
}

/// Input row with the prediction merged in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRow<R> {
    pub row: R,
    pub cleaned_text: String,
    pub label: SentimentLabel,
    pub confidence: f64,
    pub probabilities: ProbabilityVector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Validating,
    /// `row` is 1-based.
    Processing { row: usize, total: usize },
    Completed { successes: usize, failures: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelCounts {
    pub negative: usize,
    pub neutral: usize,
    pub positive: usize,
    pub error: usize,
}

impl LabelCounts {
    fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Error => self.error += 1,
        }
    }

    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Error => self.error,
        }
    }

    pub fn total(&self) -> usize {
        self.negative + self.neutral + self.positive + self.error
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport<R> {
    pub total: usize,
    pub failures: usize,
    pub rows: Vec<BatchRow<R>>,
}

impl<R> BatchReport<R> {
    pub fn successes(&self) -> usize {
        self.total - self.failures
    }

    pub fn label_counts(&self) -> LabelCounts {
        let mut counts = LabelCounts::default();
        for row in &self.rows {
            counts.record(row.label);
        }
        counts
    }
}

/// Classifies a sequence of rows, isolating each row's failure.
pub struct BatchRunner<'a> {
    inference: &'a SentimentInference,
}

impl<'a> BatchRunner<'a> {
    pub fn new(inference: &'a SentimentInference) -> Self {
        Self { inference }
    }

    pub fn run<R: BatchInput>(&self, rows: Vec<R>) -> Result<BatchReport<R>> {
        self.run_with_progress(rows, |_| {})
    }

    pub fn run_with_progress<R, F>(&self, rows: Vec<R>, mut progress: F) -> Result<BatchReport<R>>
    where
        R: BatchInput,
        F: FnMut(BatchState),
    {
        progress(BatchState::Idle);
        progress(BatchState::Validating);

        if rows.is_empty() {
            return Err(InferenceError::InvalidInput("Batch has no rows".to_string()));
        }

        let total = rows.len();
        let mut failures = 0;
        let mut output = Vec::with_capacity(total);
        tracing::info!("Processing batch of {} rows", total);

        for (idx, row) in rows.into_iter().enumerate() {
            progress(BatchState::Processing { row: idx + 1, total });

            let (cleaned_text, label, confidence, probabilities) = if row.text().trim().is_empty() {
                (String::new(), SentimentLabel::Neutral, 0.0, ProbabilityVector::zeros())
            } else {
                match self.classify(row.text()) {
                    Ok(result) => (result.cleaned_text, result.label, result.confidence, result.probabilities),
                    Err(reason) => {
                        tracing::warn!("Row {} failed: {}", idx + 1, reason);
                        failures += 1;
                        (
                            FAILED_ROW_MARKER.to_string(),
                            SentimentLabel::Error,
                            0.0,
                            ProbabilityVector::zeros(),
                        )
                    }
                }
            };

            output.push(BatchRow {
                row,
                cleaned_text,
                label,
                confidence,
                probabilities,
            });
        }

        let report = BatchReport {
            total,
            failures,
            rows: output,
        };
        tracing::info!("Batch complete: {} succeeded, {} failed", report.successes(), failures);
        progress(BatchState::Completed {
            successes: report.successes(),
            failures,
        });

        Ok(report)
    }

    /// An unavailable runtime answers with the ordinary `Error` result; only
    /// faults raised while scoring the row count as failures.
    fn classify(&self, text: &str) -> Result<PredictionResult> {
        match self.inference.try_predict(text) {
            Err(InferenceError::Unavailable(_)) | Err(InferenceError::InvalidInput(_)) => {
                Ok(PredictionResult::error(text))
            }
            other => other,
        }
    }
}
