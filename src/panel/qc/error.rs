use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, QcError>;

/// Error type covering the failures that stop a validation pass outright.
///
/// Malformed cells and rule violations are not errors: cells degrade to
/// null and violations become [`Anomaly`](crate::report::Anomaly) records.
#[derive(Debug, Error)]
pub enum QcError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the TOML configuration cannot be decoded.
    #[error("configuration file error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Errors bubbled up from the CSV reader or writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook lacks the requested sheet or any sheet at all.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a table header lacks `ticker` or `fiscal_year`.
    #[error("table '{table}' is missing required key column '{column}'")]
    MissingKeyColumn { table: String, column: String },

    /// Raised when thresholds or field lists are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when a path has an extension no reader or writer handles.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
