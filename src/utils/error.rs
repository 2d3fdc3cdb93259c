// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Could not open PDF document {path}: {reason}")]
    DocumentUnreadable { path: String, reason: String },

    #[error("Could not read text of page {page}: {reason}")]
    PageUnreadable { page: usize, reason: String },
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error in {path}: {reason}")]
    Spreadsheet { path: String, reason: String },

    #[error("Spreadsheet {0} contains no worksheet")]
    NoWorksheet(String),
}

/// A table that lacks columns the reconciliation needs.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{table} table is missing column(s) {missing:?}; available columns: {available:?}")]
pub struct SchemaError {
    pub table: &'static str,
    pub missing: Vec<String>,
    pub available: Vec<String>,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Workbook rendering failed: {0}")]
    Render(#[from] rust_xlsxwriter::XlsxError),

    #[error("Could not replace {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Sheet '{sheet}' exceeds worksheet bounds at row {row}, column {column}")]
    OutOfBounds { sheet: String, row: usize, column: usize },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input discovery failed: {0}")]
    Input(#[from] InputError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
