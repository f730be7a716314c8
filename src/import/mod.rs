//! Spreadsheet import pipeline - file reading, normalization, batch assembly

pub mod normalize;
pub mod reader;

pub use normalize::{
    check_headers, collect_issues, normalize_rows, normalize_sheet, row_issues, ImportBatch,
    NormalizedRow, RowIssue, REQUIRED_HEADERS,
};
pub use reader::{read_sheet, Sheet};
