//! Row normalization and batch validation for the import tool.
//!
//! Incoming files use whatever header spelling the field teams came up
//! with; matching is case- and spacing-insensitive via [`norm_key`].
//! Rows are rewritten to a fixed set of canonical upper-case keys so
//! the backend receives a uniform payload regardless of source file.

use serde::Serialize;

use crate::import::reader::Sheet;
use crate::shared::errors::{ImportError, ImportResult};
use crate::shared::text::{norm_key, parse_leading_int};

/// Headers that must be present (any casing/spacing) for a file to be
/// importable.
pub const REQUIRED_HEADERS: [&str; 4] = ["PFS", "FO", "TIPO CAVO", "NOME PNI CAVO"];

/// One spreadsheet row rewritten to the canonical column set.
///
/// Serializes with the exact upper-case keys the backend import
/// endpoint expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedRow {
    #[serde(rename = "PFS")]
    pub pfs: String,
    #[serde(rename = "FO")]
    pub fo: String,
    #[serde(rename = "TIPO CAVO")]
    pub tipo_cavo: String,
    #[serde(rename = "NOME PNI CAVO")]
    pub nome_pni_cavo: String,
    #[serde(rename = "INDIRIZZO")]
    pub indirizzo: String,
    #[serde(rename = "PROGETTO OF")]
    pub progetto_of: String,
    #[serde(rename = "RIFERIMENTI")]
    pub riferimenti: String,
}

impl NormalizedRow {
    fn is_blank(&self) -> bool {
        self.pfs.is_empty()
            && self.fo.is_empty()
            && self.tipo_cavo.is_empty()
            && self.nome_pni_cavo.is_empty()
            && self.indirizzo.is_empty()
            && self.progetto_of.is_empty()
            && self.riferimenti.is_empty()
    }
}

/// Problems found in one normalized row, numbered from 1 for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssue {
    pub row: usize,
    pub problems: Vec<&'static str>,
}

/// The payload sent to `admin/import_work_logs`.
#[derive(Debug, Clone, Serialize)]
pub struct ImportBatch {
    pub users_id: i64,
    pub rows_json: Vec<NormalizedRow>,
}

impl ImportBatch {
    /// Validates and assembles a batch: the technician must be a real
    /// backend id, the file must contain at least one usable row, and
    /// every row must be issue-free.
    pub fn build(users_id: i64, rows: Vec<NormalizedRow>) -> ImportResult<Self> {
        if users_id <= 0 {
            return Err(ImportError::InvalidTechnician);
        }
        if rows.is_empty() {
            return Err(ImportError::EmptyBatch);
        }
        if !collect_issues(&rows).is_empty() {
            return Err(ImportError::RowIssues);
        }
        Ok(ImportBatch {
            users_id,
            rows_json: rows,
        })
    }
}

/// Verifies every required header is present, reporting the missing
/// ones under their canonical names.
pub fn check_headers(headers: &[String]) -> ImportResult<()> {
    let keys: Vec<String> = headers.iter().map(|h| norm_key(h)).collect();
    let missing: Vec<String> = REQUIRED_HEADERS
        .iter()
        .filter(|name| !keys.iter().any(|k| *k == norm_key(name)))
        .map(|name| (*name).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportError::MissingHeaders(missing))
    }
}

/// Checks headers, then rewrites every non-blank row to the canonical
/// column set.
pub fn normalize_sheet(sheet: &Sheet) -> ImportResult<Vec<NormalizedRow>> {
    check_headers(&sheet.headers)?;
    Ok(normalize_rows(sheet))
}

/// Rewrites rows to canonical keys; rows with no content at all are
/// dropped.
pub fn normalize_rows(sheet: &Sheet) -> Vec<NormalizedRow> {
    let cols = Columns::locate(&sheet.headers);
    sheet
        .rows
        .iter()
        .map(|row| cols.pick(row))
        .filter(|row| !row.is_blank())
        .collect()
}

/// Validation problems for one row, in display order.
pub fn row_issues(row: &NormalizedRow) -> Vec<&'static str> {
    let mut issues = Vec::new();
    if row.pfs.is_empty() {
        issues.push("PFS mancante");
    }
    if row.nome_pni_cavo.is_empty() {
        issues.push("NOME PNI CAVO mancante");
    }
    if row.tipo_cavo.is_empty() {
        issues.push("TIPO CAVO mancante");
    }
    // FO may be omitted, but when present it must be a positive fibre count.
    if !row.fo.is_empty() {
        match parse_leading_int(&row.fo) {
            Some(n) if n > 0 => {}
            _ => issues.push("FO non valido"),
        }
    }
    issues
}

/// All problem rows in a batch, numbered from 1.
pub fn collect_issues(rows: &[NormalizedRow]) -> Vec<RowIssue> {
    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let problems = row_issues(row);
            (!problems.is_empty()).then(|| RowIssue {
                row: i + 1,
                problems,
            })
        })
        .collect()
}

/// Column positions resolved once per sheet. The first header matching
/// a canonical name wins.
struct Columns {
    pfs: Option<usize>,
    fo: Option<usize>,
    tipo_cavo: Option<usize>,
    nome_pni_cavo: Option<usize>,
    indirizzo: Option<usize>,
    progetto_of: Option<usize>,
    riferimenti: Option<usize>,
}

impl Columns {
    fn locate(headers: &[String]) -> Self {
        let find = |name: &str| {
            let want = norm_key(name);
            headers.iter().position(|h| norm_key(h) == want)
        };
        Columns {
            pfs: find("PFS"),
            fo: find("FO"),
            tipo_cavo: find("TIPO CAVO"),
            nome_pni_cavo: find("NOME PNI CAVO"),
            indirizzo: find("INDIRIZZO"),
            progetto_of: find("PROGETTO OF"),
            riferimenti: find("RIFERIMENTI"),
        }
    }

    fn pick(&self, row: &[String]) -> NormalizedRow {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };
        NormalizedRow {
            pfs: cell(self.pfs),
            fo: cell(self.fo),
            tipo_cavo: cell(self.tipo_cavo),
            nome_pni_cavo: cell(self.nome_pni_cavo),
            indirizzo: cell(self.indirizzo),
            progetto_of: cell(self.progetto_of),
            riferimenti: cell(self.riferimenti),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(headers: &[&str], rows: &[&[&str]]) -> Sheet {
        Sheet {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn valid_row() -> NormalizedRow {
        NormalizedRow {
            pfs: "PFS-TO-01".into(),
            fo: "24".into(),
            tipo_cavo: "ADSS".into(),
            nome_pni_cavo: "TO-001".into(),
            ..NormalizedRow::default()
        }
    }

    #[test]
    fn headers_match_ignoring_case_and_spacing() {
        let s = sheet(&["pfs", " Fo ", "Tipo   Cavo", "nome pni cavo"], &[]);
        assert!(check_headers(&s.headers).is_ok());
    }

    #[test]
    fn missing_headers_are_reported_by_canonical_name() {
        let s = sheet(&["PFS", "INDIRIZZO"], &[]);
        let err = check_headers(&s.headers).unwrap_err();
        match err {
            ImportError::MissingHeaders(names) => {
                assert_eq!(names, vec!["FO", "TIPO CAVO", "NOME PNI CAVO"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rows_are_rekeyed_regardless_of_column_order() {
        let s = sheet(
            &["NOME PNI CAVO", "fo", "PFS", "tipo cavo", "RIFERIMENTI"],
            &[&["TO-001", "24", "PFS-TO-01", "ADSS", "scavo 12m"]],
        );
        let rows = normalize_sheet(&s).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pfs, "PFS-TO-01");
        assert_eq!(rows[0].fo, "24");
        assert_eq!(rows[0].tipo_cavo, "ADSS");
        assert_eq!(rows[0].nome_pni_cavo, "TO-001");
        assert_eq!(rows[0].riferimenti, "scavo 12m");
        assert_eq!(rows[0].indirizzo, "");
    }

    #[test]
    fn serialized_rows_use_the_backend_column_names() {
        let row = NormalizedRow {
            progetto_of: "OF-123".into(),
            ..valid_row()
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["PFS"], "PFS-TO-01");
        assert_eq!(json["NOME PNI CAVO"], "TO-001");
        assert_eq!(json["TIPO CAVO"], "ADSS");
        assert_eq!(json["PROGETTO OF"], "OF-123");
    }

    #[test]
    fn blank_rows_are_dropped() {
        let s = sheet(
            &["PFS", "FO", "TIPO CAVO", "NOME PNI CAVO"],
            &[
                &["PFS-TO-01", "24", "ADSS", "TO-001"],
                &["", "", "", ""],
                &["  ", "", "  ", ""],
            ],
        );
        assert_eq!(normalize_rows(&s).len(), 1);
    }

    #[test]
    fn duplicate_headers_use_the_first_column() {
        let s = sheet(&["PFS", "PFS"], &[&["primo", "secondo"]]);
        let rows = normalize_rows(&s);
        assert_eq!(rows[0].pfs, "primo");
    }

    #[test]
    fn missing_required_values_are_flagged_in_order() {
        let row = NormalizedRow {
            fo: "x".into(),
            ..NormalizedRow::default()
        };
        assert_eq!(
            row_issues(&row),
            vec![
                "PFS mancante",
                "NOME PNI CAVO mancante",
                "TIPO CAVO mancante",
                "FO non valido",
            ]
        );
    }

    #[test]
    fn fo_must_be_a_positive_count_when_present() {
        let mut row = valid_row();
        for bad in ["0", "-3", "abc"] {
            row.fo = bad.into();
            assert_eq!(row_issues(&row), vec!["FO non valido"], "fo = {bad:?}");
        }
        for good in ["", "12", "12 fibre"] {
            row.fo = good.into();
            assert!(row_issues(&row).is_empty(), "fo = {good:?}");
        }
    }

    #[test]
    fn collect_issues_numbers_rows_from_one() {
        let rows = vec![
            valid_row(),
            NormalizedRow {
                pfs: String::new(),
                ..valid_row()
            },
        ];
        let issues = collect_issues(&rows);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row, 2);
        assert_eq!(issues[0].problems, vec!["PFS mancante"]);
    }

    #[test]
    fn batch_requires_a_real_technician() {
        let err = ImportBatch::build(0, vec![valid_row()]).unwrap_err();
        assert!(matches!(err, ImportError::InvalidTechnician));
        let err = ImportBatch::build(-5, vec![valid_row()]).unwrap_err();
        assert!(matches!(err, ImportError::InvalidTechnician));
    }

    #[test]
    fn batch_requires_at_least_one_row() {
        let err = ImportBatch::build(7, Vec::new()).unwrap_err();
        assert!(matches!(err, ImportError::EmptyBatch));
    }

    #[test]
    fn batch_rejects_rows_with_issues() {
        let broken = NormalizedRow {
            tipo_cavo: String::new(),
            ..valid_row()
        };
        let err = ImportBatch::build(7, vec![broken]).unwrap_err();
        assert!(matches!(err, ImportError::RowIssues));
    }

    #[test]
    fn batch_serializes_for_the_backend() {
        let batch = ImportBatch::build(7, vec![valid_row()]).unwrap();
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["users_id"], 7);
        assert_eq!(json["rows_json"][0]["NOME PNI CAVO"], "TO-001");
    }
}
