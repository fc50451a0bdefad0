//! Issue counting and the human-readable summary texts.

use crate::models::{category, IssueSummary, ParseResult, ValidationIssue};

/// Count issues overall and per category (`other` when untagged).
pub fn summarize_issues(issues: &[ValidationIssue]) -> IssueSummary {
    let mut summary = IssueSummary {
        total: issues.len(),
        ..Default::default()
    };
    for issue in issues {
        *summary
            .categories
            .entry(issue.category_or_other().to_string())
            .or_insert(0) += 1;
    }
    summary
}

/// Display label for a category.
pub fn format_category_name(name: &str) -> String {
    let label = match name {
        category::MISSING_HEADERS => "Missing required headers",
        category::MISSING_FIELD => "Missing required fields",
        category::INVALID_DATE_FORMAT => "Invalid date format",
        category::MISSING_DATE => "Missing dates",
        category::INVALID_SITE_CODE => "Invalid site codes",
        category::DUPLICATE_SITE_CODE => "Duplicate site codes",
        category::DUPLICATE_SITE => "Duplicate sites",
        category::INVALID_BOOLEAN => "Invalid yes/no values",
        category::HUB_MISMATCH => "Hub office mismatches",
        category::FILE_STRUCTURE => "File structure issues",
        category::PARSE_ERROR => "File parsing issues",
        other => return title_case(other),
    };
    label.to_string()
}

/// `"some_new_tag"` -> `"Some New Tag"`.
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Categories sorted by count, highest first; ties alphabetical.
fn ranked(summary: &IssueSummary) -> Vec<(&str, usize)> {
    let mut entries: Vec<(&str, usize)> = summary
        .categories
        .iter()
        .map(|(name, count)| (name.as_str(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

/// Multi-line report: counts, then critical issues, then warnings.
pub fn create_validation_summary(result: &ParseResult) -> String {
    let error_count = result.error_summary.total;
    let warning_count = result.warning_summary.total;

    if error_count == 0 && warning_count == 0 {
        return "Validation completed successfully. No issues found.".to_string();
    }

    let counts = match (error_count, warning_count) {
        (e, 0) => format!("{} errors", e),
        (0, w) => format!("{} warnings", w),
        (e, w) => format!("{} errors and {} warnings", e, w),
    };

    let mut parts = vec![format!("Validation completed with {}", counts), String::new()];

    if error_count > 0 {
        parts.push("Critical issues:".to_string());
        for (name, count) in ranked(&result.error_summary) {
            parts.push(format!("• {}: {}", format_category_name(name), count));
        }
    }

    if warning_count > 0 {
        if error_count > 0 {
            parts.push(String::new());
        }
        parts.push("Warnings:".to_string());
        for (name, count) in ranked(&result.warning_summary) {
            parts.push(format!("• {}: {}", format_category_name(name), count));
        }
    }

    parts.join("\n")
}

/// One line for notifications: errors beat warnings beat success.
pub fn create_validation_headline(result: &ParseResult) -> String {
    let error_count = result.error_summary.total;
    let warning_count = result.warning_summary.total;

    if error_count > 0 {
        format!("CSV Validation: {} errors found", error_count)
    } else if warning_count > 0 {
        format!("CSV Validation: {} warnings found", warning_count)
    } else {
        "CSV Validation: Successful".to_string()
    }
}
