//! Tabular file readers for the work-log import tool.
//!
//! Both readers produce the same shape: a header row plus data rows of
//! trimmed cell text, so the normalizer downstream does not care which
//! format the file arrived in. Supported formats are `.xlsx` / `.xls`
//! (via `calamine`) and `.csv` (via the `csv` crate); anything else is
//! rejected before touching the file.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::shared::errors::{ImportError, ImportResult};

/// A spreadsheet (or CSV) reduced to trimmed text cells.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    /// First row of the file, as written apart from trimming.
    pub headers: Vec<String>,
    /// Every row after the first.
    pub rows: Vec<Vec<String>>,
}

/// Reads `path` into a [`Sheet`], dispatching on the file extension.
pub fn read_sheet(path: &Path) -> ImportResult<Sheet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => read_csv(path),
        Some("xlsx") | Some("xls") => read_excel(path),
        _ => Err(ImportError::UnsupportedFormat),
    }
}

fn read_csv(path: &Path) -> ImportResult<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ImportError::Read(e.to_string()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::Read(e.to_string()))?;
        rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }
    Ok(split_header(rows))
}

fn read_excel(path: &Path) -> ImportResult<Sheet> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ImportError::Read(e.to_string()))?;
    // Only the first worksheet is imported.
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::Read("il file non contiene fogli".into()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| ImportError::Read(e.to_string()))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    Ok(split_header(rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn split_header(mut rows: Vec<Vec<String>>) -> Sheet {
    if rows.is_empty() {
        return Sheet::default();
    }
    let headers = rows.remove(0);
    Sheet { headers, rows }
}

// ── Tests ──────────────────────────────────────────────────────
