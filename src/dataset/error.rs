use std::path::PathBuf;

use crate::parameters::ParameterError;
use crate::raw::RawDataError;

/// Errors that can occur while opening or converting a dataset
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reading a parameter document
    #[error("Parameter error: {0}")]
    ParameterError(#[from] ParameterError),

    /// Error generating or decoding raw data records
    #[error("Raw data error: {0}")]
    RawDataError(#[from] RawDataError),

    /// A file the dataset cannot do without is absent
    #[error("Missing dataset file: {}", .0.display())]
    MissingFile(PathBuf),

    /// Error serializing JSON output
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// The finished temporary file could not replace the destination
    #[error("Unable to persist output: {0}")]
    PersistError(#[from] tempfile::PersistError),
}
