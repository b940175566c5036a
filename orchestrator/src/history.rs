use chrono::Local;
use sentimen_inference::{PredictionResult, SentimentLabel};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_HISTORY_PATH: &str = "data/riwayat_analisis.json";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, HistoryError>;

/// One interactive prediction, stored under the keys existing history
/// files already use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "Waktu")]
    pub timestamp: String,
    #[serde(rename = "Teks Asli")]
    pub original_text: String,
    #[serde(rename = "Teks Bersih")]
    pub cleaned_text: String,
    #[serde(rename = "Label")]
    pub label: SentimentLabel,
    #[serde(rename = "Keyakinan (%)")]
    pub confidence: f64,
}

impl HistoryEntry {
    pub fn from_prediction(original_text: &str, result: &PredictionResult) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            original_text: original_text.to_string(),
            cleaned_text: result.cleaned_text.clone(),
            label: result.label,
            confidence: (result.confidence * 100.0).round() / 100.0,
        }
    }
}

/// Append-only log of interactive predictions, persisted as one JSON array.
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Never fails: a missing or unreadable file starts an empty history.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<HistoryEntry>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring corrupt history file {:?}: {}", path, e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("Failed to read history file {:?}: {}", path, e);
                Vec::new()
            }
        };

        debug!("Loaded {} history entries from {:?}", entries.len(), path);
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Oldest first, as stored.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, entry: HistoryEntry) -> Result<()> {
        self.entries.push(entry);
        self.save()
    }

    /// Rewrites the whole file, creating its directory if needed.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.entries.serialize(&mut serializer)?;

        std::fs::write(&self.path, buffer)?;
        debug!("Saved {} history entries to {:?}", self.entries.len(), self.path);
        Ok(())
    }

    /// Newest first; case-insensitive substring match on the original
    /// text. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&HistoryEntry> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .rev()
            .filter(|entry| needle.is_empty() || entry.original_text.to_lowercase().contains(&needle))
            .collect()
    }

    /// Drops every entry whose timestamp is listed; returns how many went.
    pub fn remove(&mut self, timestamps: &[String]) -> Result<usize> {
        let targets: HashSet<&str> = timestamps.iter().map(String::as_str).collect();
        let before = self.entries.len();
        self.entries.retain(|entry| !targets.contains(entry.timestamp.as_str()));

        let removed = before - self.entries.len();
        if removed > 0 {
            self.save()?;
            info!("Removed {} history entries", removed);
        }
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()?;
        info!("Cleared analysis history");
        Ok(())
    }

    /// Writes the history as CSV, newest first.
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for entry in self.entries.iter().rev() {
            writer.serialize(entry)?;
        }
        writer.flush()?;

        info!("Exported {} history entries to {:?}", self.entries.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentimen_inference::ProbabilityVector;

    fn entry(timestamp: &str, text: &str, label: SentimentLabel) -> HistoryEntry {
        HistoryEntry {
            timestamp: timestamp.to_string(),
            original_text: text.to_string(),
            cleaned_text: text.to_lowercase(),
            label,
            confidence: 87.5,
        }
    }

    fn seeded_store(dir: &Path) -> HistoryStore {
        let mut store = HistoryStore::load(dir.join("data/riwayat_analisis.json"));
        store.append(entry("2024-05-01 10:00:00", "Anggaran dipotong lagi", SentimentLabel::Negative)).unwrap();
        store.append(entry("2024-05-01 10:05:00", "Program KIP bagus", SentimentLabel::Positive)).unwrap();
        store.append(entry("2024-05-01 10:10:00", "anggaran pendidikan naik", SentimentLabel::Positive)).unwrap();
        store
    }

    #[test]
    fn test_entry_from_prediction_rounds_confidence() {
        let result = PredictionResult {
            label: SentimentLabel::Neutral,
            confidence: 66.66666,
            probabilities: ProbabilityVector::new([0.2, 0.6666666, 0.1333334]),
            cleaned_text: "biasa saja".to_string(),
        };

        let entry = HistoryEntry::from_prediction("Biasa aja", &result);

        assert_eq!(entry.confidence, 66.67);
        assert_eq!(entry.original_text, "Biasa aja");
        assert_eq!(entry.cleaned_text, "biasa saja");
        assert!(chrono::NaiveDateTime::parse_from_str(&entry.timestamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_round_trip_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(dir.path());

        let reloaded = HistoryStore::load(store.path());
        assert_eq!(reloaded.entries(), store.entries());
        assert_eq!(reloaded.len(), 3);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"Keyakinan (%)\": 87.5"));
        assert!(raw.contains("\n    {"));
    }

    #[test]
    fn test_missing_and_corrupt_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(HistoryStore::load(dir.path().join("absent.json")).is_empty());

        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "[{\"Waktu\": ").unwrap();
        assert!(HistoryStore::load(&corrupt).is_empty());
    }

    #[test]
    fn test_loads_legacy_label_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("riwayat_analisis.json");
        std::fs::write(
            &path,
            r#"[{"Waktu": "2024-01-01 08:00:00", "Teks Asli": "Mantap", "Teks Bersih": "mantap", "Label": "Positif", "Keyakinan (%)": 91.2}]"#,
        )
        .unwrap();

        let store = HistoryStore::load(&path);
        assert_eq!(store.entries()[0].label, SentimentLabel::Positive);
    }

    #[test]
    fn test_search_is_case_insensitive_and_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(dir.path());

        let hits: Vec<&str> = store.search("ANGGARAN").iter().map(|e| e.timestamp.as_str()).collect();
        assert_eq!(hits, vec!["2024-05-01 10:10:00", "2024-05-01 10:00:00"]);
        assert_eq!(store.search("").len(), 3);
        assert!(store.search("tidak ada").is_empty());
    }

    #[test]
    fn test_remove_and_clear_persist() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = seeded_store(dir.path());

        let removed = store
            .remove(&["2024-05-01 10:05:00".to_string(), "1999-01-01 00:00:00".to_string()])
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(HistoryStore::load(store.path()).len(), 2);

        store.clear().unwrap();
        assert!(HistoryStore::load(store.path()).is_empty());
    }

    #[test]
    fn test_export_csv_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(dir.path());
        let export = dir.path().join("Riwayat_Analisis.csv");

        store.export_csv(&export).unwrap();

        let content = std::fs::read_to_string(&export).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Waktu,Teks Asli,Teks Bersih,Label,Keyakinan (%)");
        assert!(lines[1].starts_with("2024-05-01 10:10:00,anggaran pendidikan naik"));
        assert!(lines[3].ends_with("Negative,87.5"));
    }
}
