//! CSV export of the approved-works report
//!
//! The sheet pivots line items into one column per article code so a
//! month of work reads as a grid: three fixed leading columns, the
//! codes in ascending order, then the photo count.

use std::io;

use chrono::NaiveDate;

use crate::reporting::report::ApprovedReport;
use crate::shared::text::non_empty;

/// Header row and body cells. Per row each code column carries the
/// quantity of the first item with that code, empty when the row has
/// none.
pub fn csv_matrix(report: &ApprovedReport) -> (Vec<String>, Vec<Vec<String>>) {
    let mut codes: Vec<String> = report
        .rows
        .iter()
        .flat_map(|r| r.items.iter().map(|i| i.code.clone()))
        .collect();
    codes.sort();
    codes.dedup();

    let mut headers = vec![
        "Data Approvazione".to_string(),
        "Cantiere".to_string(),
        "Codice Cavo".to_string(),
    ];
    headers.extend(codes.iter().cloned());
    headers.push("Numero Foto".to_string());

    let rows = report
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                row.approved_label.clone(),
                row.project.clone(),
                row.cable_code
                    .as_deref()
                    .and_then(non_empty)
                    .unwrap_or("-")
                    .to_string(),
            ];
            for code in &codes {
                let cell = row
                    .items
                    .iter()
                    .find(|i| &i.code == code)
                    .map(|i| i.quantity.to_string())
                    .unwrap_or_default();
                cells.push(cell);
            }
            cells.push(row.photos.len().to_string());
            cells
        })
        .collect();

    (headers, rows)
}

/// Writes the matrix as CSV, header first.
pub fn write_csv<W: io::Write>(report: &ApprovedReport, out: W) -> csv::Result<()> {
    let (headers, rows) = csv_matrix(report);
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&headers)?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Suggested filename, dated with the export day.
pub fn default_export_filename(date: NaiveDate) -> String {
    format!("lavori_approvati_{}.csv", date.format("%Y-%m-%d"))
}

// ── Tests ──────────────────────────────────────────────────────
