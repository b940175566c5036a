use sentimen_inference::{BatchInput, BatchReport};
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Header fragments that mark the column holding the opinion text.
pub const TEXT_COLUMN_KEYWORDS: &[&str] = &["komentar", "teks", "tweet", "text", "opini", "caption", "review", "isi"];

pub const CLEANED_TEXT_COLUMN: &str = "Teks_Bersih";
pub const PREDICTION_COLUMN: &str = "Prediksi_Sentimen";

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Input file has no {0}")]
    Empty(&'static str),

    #[error("Line {line} has {found} cells but the header has {expected}")]
    TooManyCells { line: u64, expected: usize, found: usize },

    #[error("Column {column:?} not found (available: {available})")]
    MissingColumn { column: String, available: String },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;

/// A delimited table read fully into memory, every cell already a string.
#[derive(Debug, Clone)]
pub struct CsvTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn read(path: &Path) -> Result<Self> {
        info!("Reading batch input from: {:?}", path);
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.iter().all(|header| header.trim().is_empty()) {
            return Err(TableError::Empty("header row"));
        }

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(TableError::TooManyCells {
                    line: record.position().map(|p| p.line()).unwrap_or_default(),
                    expected: headers.len(),
                    found: record.len(),
                });
            }

            // short rows are padded so every row has a cell per header
            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            if cells.len() < headers.len() {
                cells.resize(headers.len(), String::new());
            }
            records.push(cells);
        }

        if records.is_empty() {
            return Err(TableError::Empty("data rows"));
        }

        debug!("Read {} rows with columns {:?}", records.len(), headers);
        Ok(Self { headers, records })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First header containing a text keyword (case-insensitive), else 0.
    pub fn detect_text_column(headers: &[String]) -> usize {
        headers
            .iter()
            .position(|header| {
                let header = header.to_lowercase();
                TEXT_COLUMN_KEYWORDS.iter().any(|keyword| header.contains(keyword))
            })
            .unwrap_or(0)
    }

    /// An explicit column must exist; otherwise the text column is detected.
    pub fn resolve_column(&self, requested: Option<&str>) -> Result<usize> {
        match requested {
            Some(name) => self
                .headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| TableError::MissingColumn {
                    column: name.to_string(),
                    available: self.headers.join(", "),
                }),
            None => Ok(Self::detect_text_column(&self.headers)),
        }
    }

    pub fn into_rows(self, column: usize) -> (Vec<String>, Vec<TextRow>) {
        let rows = self
            .records
            .into_iter()
            .map(|cells| TextRow { cells, column })
            .collect();
        (self.headers, rows)
    }
}

/// A table row whose text is taken from one column.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRow {
    pub cells: Vec<String>,
    column: usize,
}

impl BatchInput for TextRow {
    fn text(&self) -> &str {
        self.cells.get(self.column).map(String::as_str).unwrap_or("")
    }
}

/// Writes the input table with the cleaned text and predicted label appended.
pub fn write_report<W: Write>(headers: &[String], report: &BatchReport<TextRow>, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header_row: Vec<&str> = headers.iter().map(String::as_str).collect();
    header_row.extend([CLEANED_TEXT_COLUMN, PREDICTION_COLUMN]);
    writer.write_record(&header_row)?;

    for row in &report.rows {
        let mut record: Vec<&str> = row.row.cells.iter().map(String::as_str).collect();
        if record.len() < headers.len() {
            record.resize(headers.len(), "");
        }
        record.push(&row.cleaned_text);
        record.push(row.label.as_str());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_report_file(path: &Path, headers: &[String], report: &BatchReport<TextRow>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_report(headers, report, file)?;

    info!("Batch results written to: {:?}", path);
    Ok(())
}
