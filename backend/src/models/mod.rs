//! Domain models for the plan validation pipeline.
//!
//! - [`ValidationIssue`] - one error or warning raised during a run
//! - [`IssueSummary`] - per-category counts over an issue list
//! - [`ParseResult`] - everything a validation run hands back to its caller
//! - [`HubUnit`] - a known hub office, used for hub matching

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Issue Categories
// =============================================================================

/// Category tags attached to issues.
///
/// Categories are open-ended strings so summaries can group tags produced
/// by callers too; these are the ones the pipeline itself emits.
pub mod category {
    pub const FILE_STRUCTURE: &str = "file_structure";
    pub const PARSE_ERROR: &str = "parse_error";
    pub const MISSING_HEADERS: &str = "missing_headers";
    pub const MISSING_FIELD: &str = "missing_field";
    pub const MISSING_DATE: &str = "missing_date";
    pub const INVALID_DATE_FORMAT: &str = "invalid_date_format";
    pub const INVALID_SITE_CODE: &str = "invalid_site_code";
    pub const DUPLICATE_SITE_CODE: &str = "duplicate_site_code";
    pub const DUPLICATE_SITE: &str = "duplicate_site";
    pub const INVALID_BOOLEAN: &str = "invalid_boolean";
    pub const HUB_MISMATCH: &str = "hub_mismatch";
    pub const SUMMARY: &str = "summary";
    /// Bucket for issues without a category.
    pub const OTHER: &str = "other";
}

// =============================================================================
// Validation Issue
// =============================================================================

/// Blocking or non-blocking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The file must not be ingested.
    Error,
    /// The file may be ingested; surface to the user.
    Warning,
}

/// A single validation finding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
    /// 1-based line number in the source file, header line included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ValidationIssue {
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            row: None,
            column: None,
            category: None,
        }
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Category, or the `other` bucket.
    pub fn category_or_other(&self) -> &str {
        self.category.as_deref().unwrap_or(category::OTHER)
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.row, &self.column) {
            (Some(row), Some(col)) => write!(f, "Row {}, column '{}': {}", row, col, self.message),
            (Some(row), None) => write!(f, "Row {}: {}", row, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

// =============================================================================
// Summaries and Results
// =============================================================================

/// Counts of an issue list, overall and per category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssueSummary {
    pub total: usize,
    pub categories: BTreeMap<String, usize>,
}

/// Outcome of validating one uploaded file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    /// True iff `errors` is empty.
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    /// Display list; may be truncated with a trailing `summary` notice.
    pub warnings: Vec<ValidationIssue>,
    /// One JSON object per accepted row, keyed by original header.
    pub records: Vec<Value>,
    /// Distinct hub office names in first-seen order.
    pub hub_offices: Vec<String>,
    /// Computed over the full error list.
    pub error_summary: IssueSummary,
    /// Computed over the full warning list, before truncation.
    pub warning_summary: IssueSummary,
}

// =============================================================================
// Hub Catalogue
// =============================================================================

/// A hub office known to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HubUnit {
    pub id: String,
    pub name: String,
    /// Codes of the states this hub governs.
    #[serde(default)]
    pub states: Vec<String>,
}
