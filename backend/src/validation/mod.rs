//! Plan upload validation.
//!
//! [`validate_file`] is the entry point: it reads the upload, checks the
//! header row, walks the data rows in chunks and returns a [`ParseResult`].
//! It never fails; unreadable input comes back as a single error issue.
//!
//! # Example
//!
//! ```rust,ignore
//! use mmp_validator::{validate_file, UploadedFile, ValidationOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let file = UploadedFile::from_path("plan.xlsx").unwrap();
//!     let result = validate_file(&file, &ValidationOptions::default(), None).await;
//!     println!("{} records, valid: {}", result.records.len(), result.is_valid);
//! }
//! ```

pub mod hub;
pub mod rows;
pub mod summary;

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::logs::{log_error, log_info, log_progress, log_success, log_warning};
use crate::error::{ConfigError, ConfigResult};
use crate::models::{HubUnit, IssueSummary, ParseResult, ValidationIssue};
use crate::parser::{read_tabular, UploadedFile};
use rows::RowValidator;
use summary::summarize_issues;

pub use hub::validate_hub_match;
pub use summary::{create_validation_headline, create_validation_summary, format_category_name};

/// Progress callback: `(current, total, stage label)`.
pub type ProgressFn<'a> = dyn Fn(usize, usize, &str) + Sync + 'a;

/// Tuning knobs for a validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Rows validated between progress reports and yields.
    pub row_chunk_size: usize,

    /// Spreadsheet rows converted per buffered chunk.
    pub read_chunk_size: usize,

    /// How many leading rows of a sheet are scanned for the header.
    pub header_scan_rows: usize,

    /// Warnings returned before the rest is folded into one notice.
    pub max_displayed_warnings: usize,

    /// Yield to the runtime after every row chunk.
    pub yield_between_chunks: bool,

    /// Date substituted for missing or unreadable visit dates; local date if unset.
    pub today: Option<NaiveDate>,

    /// Suppress pipeline log output.
    pub quiet: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            row_chunk_size: 50,
            read_chunk_size: 100,
            header_scan_rows: 20,
            max_displayed_warnings: 15,
            yield_between_chunks: true,
            today: None,
            quiet: false,
        }
    }
}

impl ValidationOptions {
    /// Load options from a JSON file; absent keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        read_json(path.as_ref())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Load a hub catalogue: a JSON array of `{ id, name, states }`.
pub fn load_hub_catalogue<P: AsRef<Path>>(path: P) -> ConfigResult<Vec<HubUnit>> {
    read_json(path.as_ref())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate an uploaded plan file.
pub async fn validate_file(
    file: &UploadedFile,
    options: &ValidationOptions,
    on_progress: Option<&ProgressFn<'_>>,
) -> ParseResult {
    let quiet = options.quiet;
    if !quiet {
        log_info(format!("Reading {} ({} bytes)", file.name, file.bytes.len()));
    }

    let table = match read_tabular(file, options, on_progress) {
        Ok(table) => table,
        Err(e) => {
            if !quiet {
                log_error(e.to_string());
            }
            return failed(e.into_issue());
        }
    };

    if !quiet {
        log_success(format!(
            "Read {} columns, {} rows",
            table.headers.len(),
            table.rows.len()
        ));
    }

    let total = table.rows.len();
    let mut validator = RowValidator::new(&table.headers, options.today());
    validator.check_headers();

    if let Some(report) = on_progress {
        report(0, total, "Validating data");
    }

    let chunk_size = options.row_chunk_size.max(1);
    for (chunk_idx, chunk) in table.rows.chunks(chunk_size).enumerate() {
        let start = chunk_idx * chunk_size;
        for (offset, row) in chunk.iter().enumerate() {
            validator.validate_row(start + offset, row);
        }

        let done = start + chunk.len();
        let stage = format!("Validated {} of {} rows", done, total);
        if let Some(report) = on_progress {
            report(done, total, &stage);
        }
        if !quiet {
            log_progress(stage, done, total);
        }

        if options.yield_between_chunks {
            tokio::task::yield_now().await;
        }
    }

    let accepted = validator.rows_accepted();
    let result = validator.finish(options.max_displayed_warnings);

    if !quiet {
        if result.is_valid {
            log_success(format!("{} records accepted", accepted));
        } else {
            log_error(format!(
                "{} errors in {} records",
                result.error_summary.total, accepted
            ));
        }
        if result.warning_summary.total > 0 {
            log_warning(format!("{} warnings", result.warning_summary.total));
        }
    }

    result
}

/// Run the hub check against the offices a result detected and fold any
/// mismatches into its errors. Returns the number of mismatches.
pub fn apply_hub_check(result: &mut ParseResult, selected_hub_id: &str, hubs: &[HubUnit]) -> usize {
    let mismatches = validate_hub_match(&result.hub_offices, selected_hub_id, hubs);
    let count = mismatches.len();
    if count > 0 {
        result.errors.extend(mismatches);
        result.error_summary = summarize_issues(&result.errors);
        result.is_valid = false;
    }
    count
}

/// A result holding a single blocking issue and nothing else.
fn failed(issue: ValidationIssue) -> ParseResult {
    let errors = vec![issue];
    ParseResult {
        is_valid: false,
        error_summary: summarize_issues(&errors),
        warning_summary: IssueSummary::default(),
        errors,
        ..Default::default()
    }
}
