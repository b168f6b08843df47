//! Error types for the taxonomy tools

use thiserror::Error;

/// Result type for taxonomy operations
pub type Result<T> = std::result::Result<T, TabiyaError>;

/// Fatal errors. Anything recoverable is reported through
/// [`Diagnostics`](crate::diagnostics::Diagnostics) instead.
#[derive(Error, Debug)]
pub enum TabiyaError {
    #[error("Duplicate conceptUri: {0}")]
    DuplicateConcept(String),

    #[error("{pillar}: unknown {role} concept type: {value}")]
    UnknownConceptType {
        pillar: &'static str,
        role: &'static str,
        value: String,
    },

    #[error("Column '{column}' not found in {table}")]
    MissingColumn { column: String, table: String },

    #[error("Row {row} has {fields} fields but the header has {columns} columns")]
    RowTooWide { row: usize, fields: usize, columns: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Log file error: {0}")]
    LogFile(#[from] tracing_appender::rolling::InitError),
}
