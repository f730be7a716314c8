//! Approved-works report
//!
//! Joins the approved-logs payload into rows ready to render or
//! export: line items enriched against the catalog and ordered by
//! article code, photos attached to their parent log, dates rendered
//! on the viewer's local calendar. Unlike the dashboard scopes, the
//! all-time scope here keeps rows whose approval timestamp is missing;
//! they sort after every dated row.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::client::dto::ApprovedLogsPayload;
use crate::domain::{local_date_in, CatalogItem, Period, Photo, Project, WorkLog, WorkLogItem};
use crate::reporting::index::{catalog_by_id, items_by_log, photos_by_log, projects_by_id};
use crate::reporting::scope::{
    approval_sort_key, log_in_period, matches_search, project_display_name,
};
use crate::shared::text::non_empty;

/// Scope selection for the report.
#[derive(Debug, Clone)]
pub struct ReportFilters {
    pub period: Period,
    pub project_id: Option<i64>,
    pub search: String,
}

/// One article line of a report row.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportItem {
    pub code: String,
    pub description: Option<String>,
    pub quantity: f64,
}

/// One approved log, joined and ready for display.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub id: i64,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_label: String,
    pub project: String,
    pub cable_code: Option<String>,
    pub items: Vec<ReportItem>,
    pub photos: Vec<Photo>,
}

/// The filtered, sorted report.
#[derive(Debug, Clone, Default)]
pub struct ApprovedReport {
    pub rows: Vec<ReportRow>,
}

pub fn approved_report<Tz: TimeZone>(
    payload: ApprovedLogsPayload,
    filters: &ReportFilters,
    tz: &Tz,
) -> ApprovedReport {
    let mut photo_map = photos_by_log(payload.photos);
    let catalog = catalog_by_id(&payload.catalog);
    let projects = projects_by_id(&payload.projects);
    let by_log = items_by_log(&payload.items);

    let mut selected: Vec<&WorkLog> = payload
        .logs
        .iter()
        .filter(|l| log_in_period(l, filters.period, tz))
        .filter(|l| filters.project_id.map_or(true, |pid| l.projects_id == Some(pid)))
        .collect();
    selected.sort_by_key(|l| approval_sort_key(l.approved_at));

    let mut rows = Vec::new();
    for log in selected {
        let items = enrich_items(
            by_log.get(&log.id).map(Vec::as_slice).unwrap_or(&[]),
            &catalog,
        );
        if !matches_search(&haystack(log, &items, &projects), &filters.search) {
            continue;
        }
        rows.push(ReportRow {
            id: log.id,
            approved_at: log.approved_at,
            approved_label: date_label(log.approved_at, tz),
            project: project_display_name(log, &projects),
            cable_code: log.cable_code.clone(),
            items,
            photos: photo_map.remove(&log.id).unwrap_or_default(),
        });
    }

    ApprovedReport { rows }
}

/// Joins line items against the catalog and orders them by article
/// code; an item's embedded catalog record wins over the id lookup.
/// Items without a code render as "Articolo" and sort first.
fn enrich_items(items: &[&WorkLogItem], catalog: &HashMap<i64, &CatalogItem>) -> Vec<ReportItem> {
    let mut keyed: Vec<(String, ReportItem)> = items
        .iter()
        .map(|item| {
            let meta = item
                .catalog
                .as_ref()
                .or_else(|| item.price_list_items_id.and_then(|id| catalog.get(&id).copied()));
            let raw = meta
                .and_then(|m| m.item_code.as_deref())
                .and_then(non_empty)
                .unwrap_or("")
                .to_string();
            let code = if raw.is_empty() {
                "Articolo".to_string()
            } else {
                raw.clone()
            };
            (
                raw,
                ReportItem {
                    code,
                    description: meta.and_then(|m| m.description.clone()),
                    quantity: item.quantity,
                },
            )
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, item)| item).collect()
}

fn date_label<Tz: TimeZone>(ts: Option<DateTime<Utc>>, tz: &Tz) -> String {
    ts.map(|ts| local_date_in(ts, tz).format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Space-joined search haystack. The payload carries no user roster,
/// so instead of a technician name the row's article codes join the
/// usual fields.
fn haystack(log: &WorkLog, items: &[ReportItem], projects: &HashMap<i64, &Project>) -> String {
    let mut parts: Vec<String> = Vec::new();
    for field in [&log.cable_code, &log.cable_type, &log.address] {
        if let Some(v) = field.as_deref().and_then(non_empty) {
            parts.push(v.to_string());
        }
    }
    parts.push(project_display_name(log, projects));
    parts.push(log.id.to_string());
    if let Some(uid) = log.users_id {
        parts.push(uid.to_string());
    }
    parts.extend(items.iter().map(|i| i.code.clone()));
    parts.join(" ")
}

// ── Tests ──────────────────────────────────────────────────────
