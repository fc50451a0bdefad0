//! Tabular reader: turns an uploaded CSV or spreadsheet into headers + rows.
//!
//! The file kind is picked from the file name's extension. Spreadsheets go
//! through [`spreadsheet`], everything else is decoded as delimited text
//! with encoding and delimiter auto-detection.

pub mod header;
pub mod spreadsheet;

use std::path::Path;

use crate::error::{ReadError, ReadResult};
use crate::validation::{ProgressFn, ValidationOptions};

/// An uploaded file held in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name, used for extension sniffing.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping its file name.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ReadResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_name(&self.name)
    }
}

/// How a file will be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Spreadsheet,
    Text,
}

impl FileKind {
    pub fn from_name(name: &str) -> Self {
        let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase());
        match ext.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => FileKind::Spreadsheet,
            _ => FileKind::Text,
        }
    }
}

/// Header row plus raw data rows, all cells as trimmed strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read an upload into a table.
///
/// Fails with [`ReadError::EmptyFile`] when there is no header or no data row.
pub fn read_tabular(
    file: &UploadedFile,
    options: &ValidationOptions,
    on_progress: Option<&ProgressFn<'_>>,
) -> ReadResult<TabularData> {
    match file.kind() {
        FileKind::Spreadsheet => spreadsheet::read_workbook(&file.bytes, options, on_progress),
        FileKind::Text => {
            let encoding = detect_encoding(&file.bytes);
            let content = decode_content(&file.bytes, &encoding)?;
            let table = parse_delimited(&content, detect_delimiter(&content))?;
            if let Some(report) = on_progress {
                let n = table.rows.len();
                report(n, n, "Read file");
            }
            Ok(table)
        }
    }
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to text, dropping a leading byte-order mark.
pub fn decode_content(bytes: &[u8], encoding: &str) -> ReadResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .map_err(|e| ReadError::Encoding(e.to_string()))?,
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    };

    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Pick the delimiter used most in the first line; comma unless another wins.
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let mut best = b',';
    let mut best_count = first_line.matches(',').count();
    for sep in [';', '\t', '|'] {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best = sep as u8;
        }
    }

    best
}

/// Parse delimited text: first record is the header, blank lines are skipped.
///
/// Quoted fields may contain the delimiter or line breaks. Rows may be
/// shorter or longer than the header.
pub fn parse_delimited(content: &str, delimiter: u8) -> ReadResult<TabularData> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(|h| h.to_string()).collect(),
        None => return Err(ReadError::EmptyFile),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(|v| v.to_string()).collect());
    }

    if rows.is_empty() {
        return Err(ReadError::EmptyFile);
    }

    Ok(TabularData { headers, rows })
}
