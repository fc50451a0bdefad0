//! Error types for the plan validation pipeline.
//!
//! - [`ReadError`] - failures while turning an uploaded file into a table
//! - [`ConfigError`] - failures loading options or hub catalogues from disk
//! - [`ServerError`] - HTTP surface errors
//!
//! `ReadError` never reaches callers of [`crate::validation::validate_file`]:
//! the pipeline folds it into a single `file_structure` or `parse_error`
//! issue on the returned result.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{category, ValidationIssue};

// =============================================================================
// Tabular Reader Errors
// =============================================================================

/// Errors while reading a CSV or spreadsheet upload.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Text could not be decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Malformed delimited text.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// The workbook could not be opened or a sheet could not be read.
    #[error("Invalid workbook: {0}")]
    Workbook(String),

    /// Workbook without any worksheet.
    #[error("Workbook contains no sheets")]
    NoSheets,

    /// Header only, or nothing at all.
    #[error("File is empty or contains only headers")]
    EmptyFile,
}

impl ReadError {
    /// Convert into the single issue reported on a short-circuited result.
    pub fn into_issue(self) -> ValidationIssue {
        match self {
            ReadError::EmptyFile => {
                ValidationIssue::error(self.to_string()).with_category(category::FILE_STRUCTURE)
            }
            other => ValidationIssue::error(format!("Failed to parse file: {}", other))
                .with_category(category::PARSE_ERROR),
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON for the expected shape.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Socket error.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for tabular reading.
pub type ReadResult<T> = Result<T, ReadError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    #[test]
    fn test_empty_file_becomes_structure_issue() {
        let issue = ReadError::EmptyFile.into_issue();
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.category.as_deref(), Some(category::FILE_STRUCTURE));
        assert!(issue.message.contains("only headers"));
    }

    #[test]
    fn test_other_errors_become_parse_issue() {
        let issue = ReadError::Workbook("zip header missing".into()).into_issue();
        assert_eq!(issue.category.as_deref(), Some(category::PARSE_ERROR));
        assert!(issue.message.starts_with("Failed to parse file"));
        assert!(issue.message.contains("zip header missing"));
    }

    #[test]
    fn test_config_error_format() {
        let err = ConfigError::Io {
            path: PathBuf::from("hubs.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("hubs.json"));
        assert!(msg.contains("gone"));
    }
}
