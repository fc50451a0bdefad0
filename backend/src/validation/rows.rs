//! Per-row validation.
//!
//! [`RowValidator`] holds the state of one validation run: issue lists,
//! accepted records, and the seen-sets used for duplicate detection. It is
//! fed rows one at a time so the caller decides how to chunk and pace work.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::summary::summarize_issues;
use crate::ids::validate_site_code;
use crate::models::{category, ParseResult, ValidationIssue};
use crate::parser::header::{CanonicalField, FieldColumns, REQUIRED_HEADERS};

pub const HUB_OFFICE: &str = "Hub Office";
pub const SITE_CODE: &str = "Site Code";
pub const VISIT_DATE: &str = "Visit Date";
/// Record key holding the visit date as `yyyy-MM-dd`.
pub const ORIGINAL_DATE: &str = "OriginalDate";

const BOOLEAN_COLUMNS: [&str; 2] = ["Use Market Diversion Monitoring", "Use Warehouse Monitoring"];
const BOOLEAN_VALUES: [&str; 7] = ["yes", "no", "true", "false", "1", "0", ""];

const DISPLAY_DATE: &str = "%d-%m-%Y";
const ISO_DATE: &str = "%Y-%m-%d";

/// Accumulates issues and records across the rows of one file.
pub struct RowValidator<'h> {
    headers: &'h [String],
    columns: FieldColumns,
    today: NaiveDate,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
    records: Vec<Value>,
    hub_offices: Vec<String>,
    seen_site_codes: HashSet<String>,
    /// Dedup key -> file row number of first occurrence.
    seen_sites: HashMap<String, usize>,
}

impl<'h> RowValidator<'h> {
    pub fn new(headers: &'h [String], today: NaiveDate) -> Self {
        Self {
            headers,
            columns: FieldColumns::new(headers),
            today,
            errors: Vec::new(),
            warnings: Vec::new(),
            records: Vec::new(),
            hub_offices: Vec::new(),
            seen_site_codes: HashSet::new(),
            seen_sites: HashMap::new(),
        }
    }

    /// Warn once about template headers absent from the file.
    pub fn check_headers(&mut self) {
        let missing: Vec<&str> = REQUIRED_HEADERS
            .iter()
            .copied()
            .filter(|required| !self.headers.iter().any(|h| h.trim() == *required))
            .collect();

        if !missing.is_empty() {
            self.warnings.push(
                ValidationIssue::warning(format!("Missing required headers: {}", missing.join(", ")))
                    .with_category(category::MISSING_HEADERS),
            );
        }
    }

    /// Validate one data row; `index` is 0-based among data rows.
    pub fn validate_row(&mut self, index: usize, values: &[String]) {
        let row = index + 2;

        if CanonicalField::REQUIRED
            .iter()
            .all(|&field| self.columns.value(field, values).is_empty())
        {
            return;
        }

        let mut record = Map::new();
        for (idx, header) in self.headers.iter().enumerate() {
            if header.trim().is_empty() {
                continue;
            }
            let value = values.get(idx).map(|v| v.trim()).unwrap_or("");
            record.insert(header.clone(), Value::String(value.to_string()));
        }
        let literal = |record: &Map<String, Value>, key: &str| -> String {
            record
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };

        let hub_office = literal(&record, HUB_OFFICE);
        if !hub_office.is_empty() && !self.hub_offices.contains(&hub_office) {
            self.hub_offices.push(hub_office);
        }

        let raw_date = self.columns.value(CanonicalField::VisitDate, values);
        let visit_date = self.resolve_visit_date(row, raw_date);
        record.insert(
            VISIT_DATE.to_string(),
            Value::String(visit_date.format(DISPLAY_DATE).to_string()),
        );
        record.insert(
            ORIGINAL_DATE.to_string(),
            Value::String(visit_date.format(ISO_DATE).to_string()),
        );

        let site_code = literal(&record, SITE_CODE);
        if !site_code.is_empty() {
            self.check_site_code(row, &site_code);
        }

        for field in CanonicalField::REQUIRED {
            if self.columns.has(field) && self.columns.value(field, values).is_empty() {
                self.errors.push(
                    ValidationIssue::error(format!("Missing required field: {}", field.label()))
                        .at_row(row)
                        .with_column(field.label())
                        .with_category(category::MISSING_FIELD),
                );
            }
        }

        self.check_duplicate_site(row, values);

        for column in BOOLEAN_COLUMNS {
            let value = literal(&record, column);
            if !BOOLEAN_VALUES.contains(&value.to_lowercase().as_str()) {
                self.warnings.push(
                    ValidationIssue::warning(format!(
                        "{} should be Yes or No, found '{}'",
                        column, value
                    ))
                    .at_row(row)
                    .with_column(column)
                    .with_category(category::INVALID_BOOLEAN),
                );
            }
        }

        self.records.push(Value::Object(record));
    }

    /// Parse `dd-MM-yyyy` then `yyyy-MM-dd`; fall back to today with a warning.
    fn resolve_visit_date(&mut self, row: usize, raw: &str) -> NaiveDate {
        if raw.is_empty() {
            self.warnings.push(
                ValidationIssue::warning("No visit date provided, using today's date")
                    .at_row(row)
                    .with_column(VISIT_DATE)
                    .with_category(category::MISSING_DATE),
            );
            return self.today;
        }

        match parse_visit_date(raw) {
            Some(date) => date,
            None => {
                self.warnings.push(
                    ValidationIssue::warning(format!(
                        "Visit Date '{}' is not in DD-MM-YYYY or YYYY-MM-DD format, using today's date",
                        raw
                    ))
                    .at_row(row)
                    .with_column(VISIT_DATE)
                    .with_category(category::INVALID_DATE_FORMAT),
                );
                self.today
            }
        }
    }

    fn check_site_code(&mut self, row: usize, code: &str) {
        if !validate_site_code(code) {
            self.warnings.push(
                ValidationIssue::warning(
                    "Site Code must follow pattern [HH][SS][YYMMDD]-[0001] (e.g., KOKH230524-0001)",
                )
                .at_row(row)
                .with_column(SITE_CODE)
                .with_category(category::INVALID_SITE_CODE),
            );
        } else if !self.seen_site_codes.insert(code.to_string()) {
            self.warnings.push(
                ValidationIssue::warning(format!("Duplicate Site Code: {}", code))
                    .at_row(row)
                    .with_column(SITE_CODE)
                    .with_category(category::DUPLICATE_SITE_CODE),
            );
        }
    }

    /// Key on the site code when present, else on hub/state/locality/site/CP.
    fn check_duplicate_site(&mut self, row: usize, values: &[String]) {
        let code = self.columns.value(CanonicalField::SiteCode, values);
        let key = if !code.is_empty() {
            code.to_string()
        } else {
            let parts: Vec<String> = CanonicalField::COMPOSITE_KEY
                .iter()
                .map(|&field| self.columns.value(field, values).to_lowercase())
                .collect();
            if parts.iter().all(|p| p.is_empty()) {
                return;
            }
            parts.join("|")
        };

        match self.seen_sites.get(&key) {
            Some(&first_row) => self.errors.push(
                ValidationIssue::error(format!(
                    "Duplicate site: same site as row {}",
                    first_row
                ))
                .at_row(row)
                .with_column(if code.is_empty() { "Site Name" } else { SITE_CODE })
                .with_category(category::DUPLICATE_SITE),
            ),
            None => {
                self.seen_sites.insert(key, row);
            }
        }
    }

    pub fn rows_accepted(&self) -> usize {
        self.records.len()
    }

    /// Build the result. Summaries see every warning; the returned warning
    /// list is cut to `max_warnings` plus a trailing notice.
    pub fn finish(self, max_warnings: usize) -> ParseResult {
        let error_summary = summarize_issues(&self.errors);
        let warning_summary = summarize_issues(&self.warnings);

        let mut warnings = self.warnings;
        if warnings.len() > max_warnings {
            let extra = warnings.len() - max_warnings;
            warnings.truncate(max_warnings);
            warnings.push(
                ValidationIssue::warning(format!(
                    "...and {} more warnings. See validation results for details.",
                    extra
                ))
                .with_category(category::SUMMARY),
            );
        }

        ParseResult {
            is_valid: self.errors.is_empty(),
            errors: self.errors,
            warnings,
            records: self.records,
            hub_offices: self.hub_offices,
            error_summary,
            warning_summary,
        }
    }
}

/// Visit date in either accepted spelling.
pub fn parse_visit_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DISPLAY_DATE)
        .or_else(|_| NaiveDate::parse_from_str(raw, ISO_DATE))
        .ok()
}
