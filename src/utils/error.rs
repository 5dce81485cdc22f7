use crate::config::BrowserEngine;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrollError {
    #[error("Table file has no header row")]
    NoHeaders,

    #[error("Unsupported table format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Table has no data rows")]
    EmptyTable,

    #[error("Table must have exactly 4 columns, found {found}")]
    ColumnCountMismatch { found: usize },

    #[error("No supported browser found, you need to have {engine} and its {driver} driver installed on your system: {reason}")]
    DriverLaunch {
        engine: BrowserEngine,
        driver: &'static str,
        reason: String,
    },

    #[error("Login failed, check your credentials")]
    Authentication,

    #[error("No enrollment found at index {index}")]
    IndexOutOfRange { index: u32 },

    #[error("Expected page element not found: {selector}")]
    MissingElement { selector: String },

    #[error("Browser driver returned an error: {code}: {message}")]
    Driver { code: String, message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet processing error: {0}")]
    SpreadsheetError(#[from] calamine::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, EnrollError>;
