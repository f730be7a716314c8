//! Assigned-works listing for the operator.
//!
//! Shows only declarations still in the operator's court (waiting or
//! rejected), with display fallbacks for every optional field.

use chrono::TimeZone;

use crate::domain::{local_date_in, WorkLog, WorkStatus, UNKNOWN_PROJECT};
use crate::shared::text::non_empty;

/// One assigned cable job, ready for display.
#[derive(Debug, Clone)]
pub struct AssignedWork {
    pub id: i64,
    pub code: String,
    pub site: String,
    pub address: String,
    /// Local declaration date or `N/D`.
    pub date_label: String,
    pub status_label: String,
    pub cable_type: String,
    pub references: String,
    pub calculated_length: String,
}

/// Filters the raw listing down to open assignments and resolves the
/// display fields. Search matches code, site, or address.
pub fn assigned_works<Tz: TimeZone>(logs: &[WorkLog], search: &str, tz: &Tz) -> Vec<AssignedWork> {
    let q = search.trim().to_lowercase();

    logs.iter()
        .filter(|log| {
            matches!(
                log.status_kind(),
                Some(WorkStatus::InAttesa) | Some(WorkStatus::Rifiutato)
            )
        })
        .map(|log| to_assigned(log, tz))
        .filter(|work| {
            q.is_empty()
                || work.code.to_lowercase().contains(&q)
                || work.site.to_lowercase().contains(&q)
                || work.address.to_lowercase().contains(&q)
        })
        .collect()
}

fn to_assigned<Tz: TimeZone>(log: &WorkLog, tz: &Tz) -> AssignedWork {
    let fallback = |field: &Option<String>, fb: &str| -> String {
        field
            .as_deref()
            .and_then(non_empty)
            .unwrap_or(fb)
            .to_string()
    };

    let references = [&log.references, &log.start_point, &log.end_point]
        .into_iter()
        .filter_map(|s| s.as_deref())
        .find_map(non_empty)
        .unwrap_or("N/D")
        .to_string();

    AssignedWork {
        id: log.id,
        code: fallback(&log.cable_code, "Codice Mancante"),
        site: log
            .project
            .as_ref()
            .and_then(|p| p.display_name())
            .unwrap_or_else(|| UNKNOWN_PROJECT.to_string()),
        address: fallback(&log.address, "Indirizzo non specificato"),
        date_label: log
            .created_at
            .map(|ts| local_date_in(ts, tz).format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "N/D".to_string()),
        status_label: log.status_label(),
        cable_type: fallback(&log.cable_type, "N/D"),
        references,
        calculated_length: fallback(&log.calculated_length, "0"),
    }
}

// ── Tests ──────────────────────────────────────────────────────
