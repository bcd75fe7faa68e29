//! Error types for case table ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing case tables and mapping files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Errors ===
    /// Polars could not parse the file.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    #[error("failed to write CSV {path}: {message}")]
    CsvWrite { path: PathBuf, message: String },

    #[error("CSV file has no header row: {path}")]
    EmptyCsv { path: PathBuf },

    #[error("CSV file {path} has an empty column name")]
    EmptyColumnName { path: PathBuf },

    /// Failed DataFrame operation outside of file I/O.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    // === Mapping Errors ===
    #[error("invalid mapping file {path}: {source}")]
    MappingJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("mapping file {path} entry {index} has an empty {field}")]
    MappingEntry {
        path: PathBuf,
        index: usize,
        field: &'static str,
    },
}

impl IngestError {
    pub(crate) fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
