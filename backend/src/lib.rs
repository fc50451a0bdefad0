//! # MMP Validator - monthly monitoring plan ingestion and validation
//!
//! Turns an uploaded monitoring plan (CSV or spreadsheet) into canonical
//! site-visit records plus a categorized list of errors and warnings.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ CSV / XLSX  │────▶│   Parser    │────▶│ Row checks  │────▶│ ParseResult │
//! │  (upload)   │     │ (header     │     │ (per row,   │     │ + summary   │
//! │             │     │  detection) │     │  chunked)   │     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mmp_validator::{create_validation_summary, validate_file, UploadedFile, ValidationOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let file = UploadedFile::from_path("plan.csv").unwrap();
//!     let result = validate_file(&file, &ValidationOptions::default(), None).await;
//!     println!("{}", create_validation_summary(&result));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Issues, summaries, results, hub units
//! - [`parser`] - CSV / spreadsheet reading and header normalization
//! - [`validation`] - Row validation, summaries, hub matching
//! - [`ids`] - Plan IDs, site codes, versions
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Reading
pub mod parser;

// Validation
pub mod validation;

// Identifiers
pub mod ids;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, ReadError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{HubUnit, IssueSummary, ParseResult, Severity, ValidationIssue};

// =============================================================================
// Re-exports - Reading
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    read_tabular,
    header::{normalize_header, CanonicalField, REQUIRED_HEADERS},
    FileKind,
    TabularData,
    UploadedFile,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    apply_hub_check,
    create_validation_headline,
    create_validation_summary,
    format_category_name,
    load_hub_catalogue,
    summary::summarize_issues,
    validate_file,
    validate_hub_match,
    ProgressFn,
    ValidationOptions,
};

// =============================================================================
// Re-exports - IDs
// =============================================================================

pub use ids::{
    generate_id,
    generate_site_code,
    generate_site_code_from_prefix,
    increment_version,
    parse_id,
    site_code_prefix,
    validate_site_code,
    PlanId,
    Version,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, HubMatchRequest, HubMatchResponse, ValidationResponse};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
