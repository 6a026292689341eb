use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while rating a diary export.
#[derive(Error, Debug)]
pub enum DiaryError {
    /// The input diary does not exist.
    #[error("Input file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// A file exists but could not be opened or read.
    #[error("Failed to read file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single diary row is malformed. Recovered by skipping the row.
    #[error("Row {row}: {reason}")]
    RowParse { row: u64, reason: String },

    /// The diary produced neither consumption nor symptom events.
    #[error("No usable records in {}", .path.display())]
    NoUsableRecords { path: PathBuf },

    /// No consumable passed the occurrence threshold.
    #[error("No consumables passed filtering")]
    EmptyResult,

    /// The report could not be written.
    #[error("Failed to write report {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DiaryError>;
