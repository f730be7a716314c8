//! Scoping and math primitives shared by the report views.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{Period, Project, WorkLog, UNKNOWN_PROJECT};

/// Period membership. Day and month buckets require a parsed approval
/// timestamp; the all-time scope passes everything through.
pub fn log_in_period<Tz: TimeZone>(log: &WorkLog, period: Period, tz: &Tz) -> bool {
    match period {
        Period::All => true,
        _ => log
            .approved_at
            .map_or(false, |ts| period.matches_in(ts, tz)),
    }
}

/// Resolved site name: the joined project record wins, then the lookup
/// map, then a numbered placeholder, then the generic unknown label.
/// The same resolution feeds both display and the search haystack.
pub fn project_display_name(log: &WorkLog, projects: &HashMap<i64, &Project>) -> String {
    if let Some(name) = log.project.as_ref().and_then(|p| p.display_name()) {
        return name;
    }
    if let Some(pid) = log.projects_id {
        if let Some(name) = projects.get(&pid).and_then(|p| p.display_name()) {
            return name;
        }
        if pid > 0 {
            return format!("Cantiere #{pid}");
        }
    }
    UNKNOWN_PROJECT.to_string()
}

/// Cable code when present, numbered fallback otherwise.
pub fn work_title(log: &WorkLog) -> String {
    log.cable_code
        .as_deref()
        .and_then(crate::shared::text::non_empty)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Lavoro #{}", log.id))
}

/// Case-insensitive substring match; a blank query matches everything.
pub fn matches_search(haystack: &str, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    q.is_empty() || haystack.to_lowercase().contains(&q)
}

/// Sort key for newest-approved-first ordering with missing timestamps
/// at the end.
pub fn approval_sort_key(approved_at: Option<DateTime<Utc>>) -> (bool, Reverse<DateTime<Utc>>) {
    (
        approved_at.is_none(),
        Reverse(approved_at.unwrap_or(DateTime::<Utc>::MIN_UTC)),
    )
}

/// Percentage clamped to 0..=100; NaN collapses to 0.
pub fn clamp_pct(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// Worked-over-assigned ratio as a clamped percentage. Zero assigned
/// yields 0, never a division error.
pub fn completion_pct(assigned: f64, worked: f64) -> u8 {
    if assigned > 0.0 {
        clamp_pct(worked / assigned * 100.0)
    } else {
        0
    }
}

/// Progress toward a monetary target as a clamped percentage.
pub fn target_pct(total: f64, target: f64) -> u8 {
    if target <= 0.0 {
        0
    } else {
        clamp_pct(total / target * 100.0)
    }
}

/// Display-only hourly projection. A non-positive hour constant leaves
/// the total unscaled rather than emitting infinities.
pub fn per_hour(total: f64, hours: f64) -> f64 {
    if hours > 0.0 {
        total / hours
    } else {
        total
    }
}

// ── Tests ──────────────────────────────────────────────────────
