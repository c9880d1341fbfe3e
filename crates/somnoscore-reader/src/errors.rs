use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("failed to read source file {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("delimited parse error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("fixed-numeric source line {line}: {message}")]
    FixedNumericRow { line: usize, message: String },

    #[error("label column {column} out of range for a table with {column_count} columns")]
    LabelColumnOutOfRange { column: usize, column_count: usize },

    #[error("numeric value {value} at row {row}, column {column} has no lossless label form")]
    NonIntegerCell { value: f64, row: usize, column: usize },

    #[error("failed to decode scoring record: {source}")]
    Record {
        #[from]
        source: serde_json::Error,
    },
}

impl ReadError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        ReadError::Config {
            message: message.into(),
        }
    }
}
