use crate::history::HistoryEntry;
use chrono::{DateTime, Local};
use sentimen_inference::{BatchState, LabelCounts, PredictionResult, SentimentLabel};
use std::io::Write;
use std::path::Path;

pub struct ResultFormatter {
    prediction_count: u64,
    start_time: DateTime<Local>,
}

impl ResultFormatter {
    pub fn new() -> Self {
        Self {
            prediction_count: 0,
            start_time: Local::now(),
        }
    }

    pub fn display_prediction(&mut self, original_text: &str, result: &PredictionResult) {
        self.prediction_count += 1;

        println!("\n{}", "=".repeat(80));
        println!("🎯 HASIL PREDIKSI #{}", self.prediction_count);
        println!("{}", "=".repeat(80));

        println!("📝 Teks Asli: {}", truncate_text(original_text, 100));
        println!("🧹 Teks Bersih: {}", truncate_text(&result.cleaned_text, 100));

        if result.is_error() {
            println!("\n❌ Prediksi gagal: model tidak tersedia atau teks kosong");
            return;
        }

        println!(
            "\n{} Sentimen: {} ({:.2}%)",
            label_emoji(result.label),
            result.label,
            result.confidence
        );

        println!("\n{}", "-".repeat(40));
        println!("📊 PROBABILITAS");
        println!("{}", "-".repeat(40));
        for label in SentimentLabel::CLASSES {
            let probability = result.probabilities.get(label);
            println!(
                "   {:<9} {:>6.2}% {}",
                label.as_str(),
                probability * 100.0,
                "█".repeat((probability * 30.0).round() as usize)
            );
        }
    }

    pub fn display_progress(&self, state: BatchState) {
        match state {
            BatchState::Idle => {}
            BatchState::Validating => println!("🔎 Memvalidasi data..."),
            BatchState::Processing { row, total } => {
                let percent = row * 100 / total.max(1);
                print!("\r🤖 Memproses: {} dari {} data ({}%)", row, total, percent);
                let _ = std::io::stdout().flush();
            }
            BatchState::Completed { successes, failures } => {
                println!("\n✅ Selesai: {} berhasil, {} gagal", successes, failures);
            }
        }
    }

    pub fn display_batch_summary(&self, counts: &LabelCounts, output_path: &Path) {
        let total = counts.total().max(1) as f64;

        println!("\n{}", "-".repeat(40));
        println!("📊 STATISTIK SENTIMEN");
        println!("{}", "-".repeat(40));
        for label in [
            SentimentLabel::Negative,
            SentimentLabel::Neutral,
            SentimentLabel::Positive,
            SentimentLabel::Error,
        ] {
            let count = counts.get(label);
            if label == SentimentLabel::Error && count == 0 {
                continue;
            }
            println!(
                "   {} {:<9} {:>6} ({:.1}%)",
                label_emoji(label),
                label.as_str(),
                count,
                count as f64 * 100.0 / total
            );
        }
        println!("\n📥 Hasil lengkap: {}", output_path.display());
        self.display_runtime();
    }

    pub fn display_history(&self, entries: &[&HistoryEntry]) {
        if entries.is_empty() {
            println!("📝 Belum ada riwayat analisis.");
            return;
        }

        println!("\n📚 RIWAYAT ANALISIS ({} entri)", entries.len());
        println!("{}", "-".repeat(80));
        for entry in entries {
            println!(
                "{}  {} {:<9} {:>6.2}%  {}",
                entry.timestamp,
                label_emoji(entry.label),
                entry.label.as_str(),
                entry.confidence,
                truncate_text(&entry.original_text, 50)
            );
        }
    }

    pub fn display_error(&self, error: &anyhow::Error) {
        eprintln!("\n❌ Error: {:#}", error);
    }

    fn display_runtime(&self) {
        let runtime = Local::now().signed_duration_since(self.start_time);
        println!("⏱️  Waktu proses: {}ms", runtime.num_milliseconds());
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn label_emoji(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "😊",
        SentimentLabel::Neutral => "😐",
        SentimentLabel::Negative => "😡",
        SentimentLabel::Error => "❌",
    }
}

/// Cuts at a char boundary so multi-byte text never splits.
fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}
