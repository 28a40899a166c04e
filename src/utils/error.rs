// src/utils/error.rs
#![allow(dead_code)]
use thiserror::Error;

// Define specific error types for different parts of the application.
// A missing findings table is deliberately NOT represented here: projects
// without findings are a valid outcome, surfaced as Option::None plus a
// console notice rather than through this taxonomy.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error reading report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse .docx report: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("Failed to open workbook: {0}")]
    Open(String),

    #[error("Worksheet \"{0}\" not found in workbook")]
    SheetNotFound(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Report reading failed: {0}")]
    Report(#[from] ReportError),

    #[error("Workbook access failed: {0}")]
    Workbook(#[from] WorkbookError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
