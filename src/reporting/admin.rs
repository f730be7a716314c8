//! Company-wide dashboard metrics
//!
//! The admin view is built from one flat payload: every log, every
//! line item, the full catalog, the technician roster and the project
//! list. Headline totals follow a month or all-time scope, a separate
//! single-day strip tracks the chosen calendar day, and the table rows
//! carry their line items already joined against the catalog.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, TimeZone};

use crate::client::dto::AdminDashboard;
use crate::config::TargetsConfig;
use crate::domain::{CatalogItem, Period, Project, WorkLog, WorkLogItem};
use crate::reporting::index::{catalog_by_id, items_by_log, projects_by_id, user_name_by_id};
use crate::reporting::scope::{
    approval_sort_key, completion_pct, log_in_period, matches_search, per_hour,
    project_display_name, work_title,
};
use crate::shared::text::non_empty;

/// Scope selection for the admin dashboard.
#[derive(Debug, Clone)]
pub struct AdminFilters {
    /// Month or all-time scope for the headline totals and the table.
    pub period: Period,
    /// Local day shown in the daily strip, independent of `period`.
    pub day: NaiveDate,
    pub project_id: Option<i64>,
    pub search: String,
}

/// One entry of the project filter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOption {
    pub id: i64,
    pub name: String,
}

/// One priced line of a decorated row.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemLine {
    pub label: String,
    pub unit: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub total: f64,
}

/// A work log decorated for the approved-work table.
#[derive(Debug, Clone)]
pub struct AdminLogRow {
    pub id: i64,
    pub approved_label: String,
    pub title: String,
    pub site: String,
    pub technician: String,
    pub address: Option<String>,
    pub total: f64,
    pub items: Vec<ItemLine>,
}

/// Everything the admin dashboard renders.
#[derive(Debug, Clone, Default)]
pub struct AdminOverview {
    pub period_total: f64,
    pub period_hourly: f64,
    pub daily_total: f64,
    pub daily_hourly: f64,
    pub daily_count: usize,
    pub completion_assigned: usize,
    pub completion_worked: usize,
    pub completion_pct: u8,
    pub project_options: Vec<ProjectOption>,
    pub rows: Vec<AdminLogRow>,
}

/// Builds the dashboard. The headline totals honour only the period
/// scope; project and search filters narrow the table rows without
/// touching any total. The hourly projections divide by the configured
/// monthly and daily hour constants in every scope, all-time included.
pub fn admin_overview<Tz: TimeZone>(
    data: &AdminDashboard,
    filters: &AdminFilters,
    targets: &TargetsConfig,
    tz: &Tz,
) -> AdminOverview {
    let catalog = catalog_by_id(&data.catalog);
    let projects = projects_by_id(&data.projects);
    let names = user_name_by_id(&data.users);
    let by_log = items_by_log(&data.items);

    let log_total = |log: &WorkLog| -> f64 {
        by_log
            .get(&log.id)
            .map(|items| items.iter().map(|i| i.total()).sum())
            .unwrap_or(0.0)
    };

    // Headline scope: approved logs inside the selected period. The
    // all-time scope still drops logs never approved.
    let mut scoped: Vec<&WorkLog> = data
        .logs
        .iter()
        .filter(|l| l.approved_at.is_some() && log_in_period(l, filters.period, tz))
        .collect();
    scoped.sort_by_key(|l| approval_sort_key(l.approved_at));

    let period_total: f64 = scoped.iter().map(|l| log_total(l)).sum();

    // The daily strip reads the full collection; the period, project
    // and search filters never touch it.
    let day = Period::Day(filters.day);
    let mut daily_total = 0.0;
    let mut daily_count = 0usize;
    for log in data.logs.iter().filter(|l| log_in_period(l, day, tz)) {
        daily_total += log_total(log);
        daily_count += 1;
    }

    let rows: Vec<AdminLogRow> = scoped
        .iter()
        .copied()
        .filter(|log| filters.project_id.map_or(true, |pid| log.projects_id == Some(pid)))
        .filter(|log| matches_search(&haystack(log, &projects, &names), &filters.search))
        .map(|log| {
            let items = by_log.get(&log.id).map(Vec::as_slice).unwrap_or(&[]);
            decorate(log, items, &catalog, &projects, &names, tz)
        })
        .collect();

    AdminOverview {
        period_total,
        period_hourly: per_hour(period_total, targets.monthly_hours()),
        daily_total,
        daily_hourly: per_hour(daily_total, targets.daily_hours),
        daily_count,
        completion_assigned: data.completion.assigned.len(),
        completion_worked: data.completion.worked.len(),
        completion_pct: completion_pct(
            data.completion.assigned.len() as f64,
            data.completion.worked.len() as f64,
        ),
        project_options: project_options(data, &projects),
        rows,
    }
}

/// Filter list: the fetched project collection when it has entries,
/// otherwise ids harvested from the logs themselves. Non-positive ids
/// are skipped and duplicates keep their first spelling.
fn project_options(data: &AdminDashboard, projects: &HashMap<i64, &Project>) -> Vec<ProjectOption> {
    let mut options: Vec<ProjectOption> = if !data.projects.is_empty() {
        data.projects
            .iter()
            .map(|p| ProjectOption {
                id: p.id,
                name: p.display_name_or_placeholder(),
            })
            .collect()
    } else {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for log in &data.logs {
            let Some(pid) = log.projects_id.filter(|id| *id > 0) else {
                continue;
            };
            if seen.insert(pid) {
                out.push(ProjectOption {
                    id: pid,
                    name: project_display_name(log, projects),
                });
            }
        }
        out
    };
    options.sort_by_key(|o| o.name.to_lowercase());
    options
}

/// Space-joined search haystack: cable code, cable type, address,
/// resolved project name, technician name, then the log and user ids.
/// Empty fields are skipped.
fn haystack(log: &WorkLog, projects: &HashMap<i64, &Project>, names: &HashMap<i64, String>) -> String {
    let mut parts: Vec<String> = Vec::new();
    for field in [&log.cable_code, &log.cable_type, &log.address] {
        if let Some(v) = field.as_deref().and_then(non_empty) {
            parts.push(v.to_string());
        }
    }
    parts.push(project_display_name(log, projects));
    if let Some(name) = log.users_id.and_then(|id| names.get(&id)) {
        parts.push(name.clone());
    }
    parts.push(log.id.to_string());
    if let Some(uid) = log.users_id {
        parts.push(uid.to_string());
    }
    parts.join(" ")
}

fn decorate<Tz: TimeZone>(
    log: &WorkLog,
    items: &[&WorkLogItem],
    catalog: &HashMap<i64, &CatalogItem>,
    projects: &HashMap<i64, &Project>,
    names: &HashMap<i64, String>,
    tz: &Tz,
) -> AdminLogRow {
    let approved_label = log
        .approved_at
        .map(|ts| {
            ts.with_timezone(tz)
                .naive_local()
                .format("%d/%m/%Y %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string());
    let technician = log
        .users_id
        .and_then(|id| names.get(&id).cloned())
        .unwrap_or_else(|| "-".to_string());
    let lines: Vec<ItemLine> = items.iter().map(|i| item_line(i, catalog)).collect();
    let total = lines.iter().map(|l| l.total).sum();

    AdminLogRow {
        id: log.id,
        approved_label,
        title: work_title(log),
        site: project_display_name(log, projects),
        technician,
        address: log.address.clone(),
        total,
        items: lines,
    }
}

/// Joins a line item against the catalog. The label prefers the
/// description, then the article code, then a numbered placeholder;
/// the displayed unit price prefers the frozen price over the live
/// one. The line total still comes from the item itself.
fn item_line(item: &WorkLogItem, catalog: &HashMap<i64, &CatalogItem>) -> ItemLine {
    let meta = item.price_list_items_id.and_then(|id| catalog.get(&id).copied());
    let unit = meta.map(CatalogItem::unit_label).unwrap_or_else(|| "u".to_string());
    let label = meta
        .and_then(|m| m.description.as_deref().and_then(non_empty))
        .or_else(|| meta.and_then(|m| m.item_code.as_deref().and_then(non_empty)))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Voce #{}", item.price_list_items_id.unwrap_or(0)));
    let unit_price = if item.frozen_price_client != 0.0 {
        item.frozen_price_client
    } else {
        meta.map(|m| m.price_client).unwrap_or(0.0)
    };

    ItemLine {
        label,
        unit,
        unit_price,
        quantity: item.quantity,
        total: item.total(),
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::dto::CompletionLists;
    use chrono::{DateTime, FixedOffset, Utc};
    use serde_json::Value;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn plus_one() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn approved_log(id: i64, approved_at: &str) -> WorkLog {
        WorkLog {
            id,
            approved_at: Some(utc(approved_at)),
            ..Default::default()
        }
    }

    fn stored_item(parent: i64, total: f64) -> WorkLogItem {
        WorkLogItem {
            work_logs_id: Some(parent),
            total_price_client: total,
            ..Default::default()
        }
    }

    fn march() -> AdminFilters {
        AdminFilters {
            period: Period::Month { year: 2024, month: 3 },
            day: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            project_id: None,
            search: String::new(),
        }
    }

    fn dashboard() -> AdminDashboard {
        AdminDashboard::default()
    }

    #[test]
    fn month_scope_keeps_only_logs_approved_in_that_month() {
        let mut data = dashboard();
        data.logs = vec![
            approved_log(1, "2024-03-15T10:30:00Z"),
            approved_log(2, "2024-02-20T10:00:00Z"),
            WorkLog { id: 3, ..Default::default() },
        ];
        data.items = vec![stored_item(1, 100.0), stored_item(2, 50.0), stored_item(3, 70.0)];

        let view = admin_overview(&data, &march(), &TargetsConfig::default(), &plus_one());
        assert_eq!(view.period_total, 100.0);
        assert_eq!(view.period_hourly, 100.0 / 504.0);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].id, 1);
    }

    #[test]
    fn all_time_scope_still_requires_an_approval_timestamp() {
        let mut data = dashboard();
        data.logs = vec![
            approved_log(1, "2024-02-20T10:00:00Z"),
            approved_log(2, "2024-03-15T10:30:00Z"),
            WorkLog { id: 3, ..Default::default() },
        ];
        data.items = vec![stored_item(1, 50.0), stored_item(2, 100.0), stored_item(3, 70.0)];

        let filters = AdminFilters { period: Period::All, ..march() };
        let view = admin_overview(&data, &filters, &TargetsConfig::default(), &plus_one());
        assert_eq!(view.period_total, 150.0);
        // newest approval first
        let ids: Vec<i64> = view.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
        // the projection still divides by the monthly hours
        assert_eq!(view.period_hourly, 150.0 / 504.0);
    }

    #[test]
    fn project_and_search_filters_narrow_rows_but_not_totals() {
        let mut data = dashboard();
        data.logs = vec![
            WorkLog {
                projects_id: Some(9),
                ..approved_log(1, "2024-03-10T08:00:00Z")
            },
            WorkLog {
                projects_id: Some(4),
                ..approved_log(2, "2024-03-11T08:00:00Z")
            },
        ];
        data.items = vec![stored_item(1, 60.0), stored_item(2, 40.0)];

        let filters = AdminFilters { project_id: Some(9), ..march() };
        let view = admin_overview(&data, &filters, &TargetsConfig::default(), &plus_one());
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].id, 1);
        assert_eq!(view.period_total, 100.0);

        let filters = AdminFilters { search: "nessuno".into(), ..march() };
        let view = admin_overview(&data, &filters, &TargetsConfig::default(), &plus_one());
        assert!(view.rows.is_empty());
        assert_eq!(view.period_total, 100.0);
    }

    #[test]
    fn daily_strip_reads_the_full_collection() {
        let mut data = dashboard();
        data.logs = vec![
            approved_log(1, "2024-03-15T10:30:00Z"),
            approved_log(2, "2024-02-20T10:00:00Z"),
        ];
        data.items = vec![stored_item(1, 100.0), stored_item(2, 48.0)];

        // month scope on March, daily strip pointed at the February day
        let filters = AdminFilters {
            day: NaiveDate::from_ymd_opt(2024, 2, 20).unwrap(),
            project_id: Some(9999),
            ..march()
        };
        let view = admin_overview(&data, &filters, &TargetsConfig::default(), &plus_one());
        assert_eq!(view.daily_total, 48.0);
        assert_eq!(view.daily_count, 1);
        assert_eq!(view.daily_hourly, 2.0);
    }

    #[test]
    fn rows_decorate_items_against_the_catalog() {
        let mut data = dashboard();
        data.logs = vec![WorkLog {
            cable_code: Some("CV-12".into()),
            users_id: Some(5),
            address: Some("Via Roma 1".into()),
            ..approved_log(1, "2024-03-15T10:30:00Z")
        }];
        data.items = vec![
            WorkLogItem {
                work_logs_id: Some(1),
                price_list_items_id: Some(7),
                quantity: 4.0,
                frozen_price_client: 3.0,
                ..Default::default()
            },
            WorkLogItem {
                work_logs_id: Some(1),
                price_list_items_id: Some(8),
                quantity: 2.0,
                ..Default::default()
            },
            WorkLogItem {
                work_logs_id: Some(1),
                quantity: 1.0,
                ..Default::default()
            },
        ];
        data.catalog = vec![
            CatalogItem {
                id: 7,
                item_code: Some("TLC-01".into()),
                description: Some("Posa cavo".into()),
                unit: Some(" m ".into()),
                price_client: 2.5,
            },
            CatalogItem {
                id: 8,
                item_code: Some("X-9".into()),
                price_client: 1.5,
                ..Default::default()
            },
        ];

        let view = admin_overview(&data, &march(), &TargetsConfig::default(), &plus_one());
        let row = &view.rows[0];
        assert_eq!(row.title, "CV-12");
        assert_eq!(row.site, "Cantiere sconosciuto");
        assert_eq!(row.technician, "-");
        assert_eq!(row.approved_label, "15/03/2024 11:30");
        assert_eq!(row.address.as_deref(), Some("Via Roma 1"));

        assert_eq!(
            row.items[0],
            ItemLine {
                label: "Posa cavo".into(),
                unit: "m".into(),
                unit_price: 3.0,
                quantity: 4.0,
                total: 12.0,
            }
        );
        // no description, no frozen price: code label, live unit price,
        // but the line total still follows the item rule
        assert_eq!(row.items[1].label, "X-9");
        assert_eq!(row.items[1].unit, "u");
        assert_eq!(row.items[1].unit_price, 1.5);
        assert_eq!(row.items[1].total, 0.0);
        // no catalog reference at all
        assert_eq!(row.items[2].label, "Voce #0");
        assert_eq!(row.items[2].unit, "u");
        assert_eq!(row.total, 12.0);
    }

    #[test]
    fn search_reaches_technician_project_and_ids() {
        let mut data = dashboard();
        data.logs = vec![
            WorkLog {
                projects_id: Some(9),
                users_id: Some(5),
                ..approved_log(41, "2024-03-10T08:00:00Z")
            },
            approved_log(42, "2024-03-11T08:00:00Z"),
        ];
        data.users = vec![crate::domain::User {
            id: 5,
            name: Some("Mario Rossi".into()),
            ..Default::default()
        }];
        data.projects = vec![Project {
            id: 9,
            name: Some("Cantiere Nord".into()),
            ..Default::default()
        }];

        for query in ["mario", "NORD", "41"] {
            let filters = AdminFilters { search: query.into(), ..march() };
            let view = admin_overview(&data, &filters, &TargetsConfig::default(), &plus_one());
            assert_eq!(view.rows.len(), 1, "query {query:?}");
            assert_eq!(view.rows[0].id, 41, "query {query:?}");
        }
    }

    #[test]
    fn project_options_come_from_the_collection_when_present() {
        let mut data = dashboard();
        data.projects = vec![
            Project { id: 9, name: Some("Cantiere Nord".into()), ..Default::default() },
            Project { id: 2, ..Default::default() },
        ];

        let view = admin_overview(&data, &march(), &TargetsConfig::default(), &plus_one());
        assert_eq!(
            view.project_options,
            vec![
                ProjectOption { id: 2, name: "Cantiere #2".into() },
                ProjectOption { id: 9, name: "Cantiere Nord".into() },
            ]
        );
    }

    #[test]
    fn project_options_fall_back_to_the_logs() {
        let mut data = dashboard();
        data.logs = vec![
            WorkLog {
                projects_id: Some(9),
                project: Some(Project { id: 9, name: Some("Nord".into()), ..Default::default() }),
                ..approved_log(1, "2024-03-10T08:00:00Z")
            },
            WorkLog {
                projects_id: Some(9),
                ..approved_log(2, "2024-03-11T08:00:00Z")
            },
            WorkLog {
                projects_id: Some(0),
                ..approved_log(3, "2024-03-12T08:00:00Z")
            },
            WorkLog {
                projects_id: Some(4),
                ..approved_log(4, "2024-03-13T08:00:00Z")
            },
        ];

        let view = admin_overview(&data, &march(), &TargetsConfig::default(), &plus_one());
        assert_eq!(
            view.project_options,
            vec![
                ProjectOption { id: 4, name: "Cantiere #4".into() },
                ProjectOption { id: 9, name: "Nord".into() },
            ]
        );
    }

    #[test]
    fn completion_counts_come_from_list_lengths_and_clamp() {
        let mut data = dashboard();
        data.completion = CompletionLists {
            assigned: vec![Value::Null; 4],
            worked: vec![Value::Null; 5],
        };

        let view = admin_overview(&data, &march(), &TargetsConfig::default(), &plus_one());
        assert_eq!(view.completion_assigned, 4);
        assert_eq!(view.completion_worked, 5);
        assert_eq!(view.completion_pct, 100);

        data.completion = CompletionLists::default();
        let view = admin_overview(&data, &march(), &TargetsConfig::default(), &plus_one());
        assert_eq!(view.completion_pct, 0);
    }
}
