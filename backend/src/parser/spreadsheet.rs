//! Workbook reading with sheet and header-row auto-detection.
//!
//! Real plan workbooks often carry several tabs and a title block above the
//! header. The sheet whose first row best matches [`REQUIRED_HEADERS`] wins,
//! then the best-matching row among its first rows is taken as the header.
//!
//! [`REQUIRED_HEADERS`]: super::header::REQUIRED_HEADERS

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Range, Reader};
use chrono::{Days, NaiveDate};

use super::header::{is_date_header, normalized_required_headers, score_header_row};
use super::TabularData;
use crate::error::{ReadError, ReadResult};
use crate::validation::{ProgressFn, ValidationOptions};

/// Decode a workbook and extract its plan table.
pub fn read_workbook(
    bytes: &[u8],
    options: &ValidationOptions,
    on_progress: Option<&ProgressFn<'_>>,
) -> ReadResult<TabularData> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ReadError::Workbook(e.to_string()))?;

    let vocabulary = normalized_required_headers();

    // Only the best sheet so far is kept alive.
    let mut best: Option<(usize, Range<Data>)> = None;
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ReadError::Workbook(format!("sheet '{}': {}", name, e)))?;

        let score = range
            .rows()
            .next()
            .map(|row| score_header_row(&row_text(row), &vocabulary))
            .unwrap_or(0);

        match &best {
            Some((best_score, _)) if *best_score >= score => {}
            _ => best = Some((score, range)),
        }
    }

    let (_, range) = best.ok_or(ReadError::NoSheets)?;
    extract_table(&range, &vocabulary, options, on_progress)
}

/// Locate the header row inside a sheet and read every row below it.
fn extract_table(
    range: &Range<Data>,
    vocabulary: &[String],
    options: &ValidationOptions,
    on_progress: Option<&ProgressFn<'_>>,
) -> ReadResult<TabularData> {
    let header_idx = find_header_row(range, vocabulary, options.header_scan_rows);

    let mut headers: Vec<String> = match range.rows().nth(header_idx) {
        Some(row) => row_text(row),
        None => return Err(ReadError::EmptyFile),
    };
    // Cells right of the last header are notes, not columns.
    while headers.last().is_some_and(|h| h.is_empty()) {
        headers.pop();
    }
    let date_columns: Vec<bool> = headers.iter().map(|h| is_date_header(h)).collect();

    let total = range.height().saturating_sub(header_idx + 1);
    if total == 0 {
        return Err(ReadError::EmptyFile);
    }

    let chunk_size = options.read_chunk_size.max(1);
    let mut rows = Vec::with_capacity(total);
    let mut chunk: Vec<Vec<String>> = Vec::with_capacity(chunk_size);

    for row in range.rows().skip(header_idx + 1) {
        let values = (0..headers.len())
            .map(|idx| match row.get(idx) {
                Some(cell) if date_columns[idx] => date_cell_text(cell),
                Some(cell) => cell_text(cell),
                None => String::new(),
            })
            .collect();
        chunk.push(values);

        if chunk.len() == chunk_size {
            rows.append(&mut chunk);
            report(on_progress, rows.len(), total);
        }
    }
    if !chunk.is_empty() {
        rows.append(&mut chunk);
        report(on_progress, rows.len(), total);
    }

    // Blank rows stay in place to keep row numbers aligned with the sheet.
    if rows.iter().all(|row| row.iter().all(|v| v.is_empty())) {
        return Err(ReadError::EmptyFile);
    }

    Ok(TabularData { headers, rows })
}

fn report(on_progress: Option<&ProgressFn<'_>>, current: usize, total: usize) {
    if let Some(report) = on_progress {
        report(current, total, &format!("Read {} of {} rows", current, total));
    }
}

/// Index of the best-scoring row among the first `scan_rows`; ties keep the earliest.
fn find_header_row(range: &Range<Data>, vocabulary: &[String], scan_rows: usize) -> usize {
    let mut best_idx = 0;
    let mut best_score = 0;
    for (idx, row) in range.rows().take(scan_rows.max(1)).enumerate() {
        let score = score_header_row(&row_text(row), vocabulary);
        if score > best_score {
            best_score = score;
            best_idx = idx;
        }
    }
    best_idx
}

fn row_text(row: &[Data]) -> Vec<String> {
    row.iter().map(cell_text).collect()
}

/// Plain text of a cell, trimmed. Errors and empty cells read as "".
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_date(dt)
            .map(display_date)
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
    }
}

/// Text of a visit-date cell: native dates and serial numbers become `dd-MM-yyyy`.
fn date_cell_text(cell: &Data) -> String {
    let date = match cell {
        Data::DateTime(dt) => excel_date(dt),
        Data::Float(f) => serial_to_date(*f),
        Data::Int(i) => serial_to_date(*i as f64),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
        _ => None,
    };

    date.map(display_date).unwrap_or_else(|| cell_text(cell))
}

/// Spreadsheet serial day number to a calendar date; day 0 is 1899-12-30.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

/// Calendar date of a native date cell, honouring the workbook's 1900/1904 system.
fn excel_date(dt: &ExcelDateTime) -> Option<NaiveDate> {
    dt.as_datetime().map(|d| d.date())
}

fn display_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}
