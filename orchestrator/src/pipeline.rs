use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::history::{HistoryEntry, HistoryStore};
use crate::output::ResultFormatter;
use crate::table::{self, CsvTable};

use sentimen_inference::{BatchRunner, LabelCounts, PredictionResult, SentimentConfig, SentimentInference};

/// Default name of the batch result file, written next to the input.
pub const BATCH_OUTPUT_FILE: &str = "Hasil_Analisis_Batch.csv";

/// Ties the inference service to the history store and terminal output.
pub struct SentimentDashboard {
    inference: Arc<SentimentInference>,
    history: HistoryStore,
    formatter: ResultFormatter,
}

impl SentimentDashboard {
    pub fn new(config: &SentimentConfig, history_path: PathBuf) -> Self {
        info!("Initializing sentiment dashboard...");

        let inference = SentimentInference::shared(config);
        if let Some(reason) = inference.unavailable_reason() {
            warn!("Continuing without a model: {}", reason);
        }

        Self::with_inference(inference, HistoryStore::load(history_path))
    }

    pub fn with_inference(inference: Arc<SentimentInference>, history: HistoryStore) -> Self {
        Self {
            inference,
            history,
            formatter: ResultFormatter::new(),
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Predicts one text, prints it and, unless `record` is false, appends
    /// it to the history.
    pub fn analyze_text(&mut self, text: &str, record: bool) -> Result<PredictionResult> {
        if text.trim().is_empty() {
            bail!("Mohon masukkan teks terlebih dahulu");
        }

        let result = self.inference.predict(text);
        self.formatter.display_prediction(text, &result);

        if record {
            self.history
                .append(HistoryEntry::from_prediction(text, &result))
                .context("Failed to save analysis history")?;
        }

        Ok(result)
    }

    /// Classifies every row of a CSV file and writes the augmented table.
    pub fn analyze_file(&mut self, input: &Path, column: Option<&str>, output: Option<&Path>) -> Result<LabelCounts> {
        let table = CsvTable::read(input).with_context(|| format!("Failed to read {:?}", input))?;
        let column_index = table.resolve_column(column)?;
        info!(
            "Analyzing {} rows from column {:?}",
            table.len(),
            table.headers()[column_index]
        );

        let (headers, rows) = table.into_rows(column_index);
        let formatter = &self.formatter;
        let report = BatchRunner::new(&self.inference).run_with_progress(rows, |state| formatter.display_progress(state))?;

        let output_path = match output {
            Some(path) => path.to_path_buf(),
            None => input.with_file_name(BATCH_OUTPUT_FILE),
        };
        table::write_report_file(&output_path, &headers, &report)?;

        let counts = report.label_counts();
        self.formatter.display_batch_summary(&counts, &output_path);
        Ok(counts)
    }
}
