//! Operator dashboard metrics.
//!
//! Production figures are computed over approved declarations only: the
//! month-to-date and today's totals, their hourly projections, progress
//! toward the monthly target, and the assignment completion ratio. The
//! recent-activity strip lists this month's declarations newest first.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::client::dto::OperatorDashboard;
use crate::config::TargetsConfig;
use crate::domain::{local_date_in, Period, WorkLog};
use crate::reporting::scope::{completion_pct, per_hour, target_pct, work_title};

/// Most recent declarations shown on the dashboard.
const RECENT_LIMIT: usize = 12;

#[derive(Debug, Clone, Default)]
pub struct OperatorOverview {
    pub monthly_total: f64,
    pub monthly_hourly: f64,
    pub daily_total: f64,
    pub daily_hourly: f64,
    /// Progress toward the monthly target, 0..=100.
    pub progress_pct: u8,
    pub monthly_target_eur: f64,
    pub bonus_threshold_eur_hour: f64,
    pub completion_assigned: f64,
    pub completion_worked: f64,
    pub completion_pct: u8,
    pub recent: Vec<RecentActivity>,
}

/// One row of the recent-activity strip.
#[derive(Debug, Clone)]
pub struct RecentActivity {
    pub id: i64,
    pub title: String,
    pub status_label: String,
    /// Local declaration date, empty when the record carries none.
    pub date_label: String,
}

/// Derives the operator metrics from one dashboard payload. `now`
/// anchors the current-month and current-day buckets on the calendar
/// of `tz`.
pub fn operator_overview<Tz: TimeZone>(
    data: &OperatorDashboard,
    targets: &TargetsConfig,
    tz: &Tz,
    now: DateTime<Utc>,
) -> OperatorOverview {
    let today = local_date_in(now, tz);
    let this_month = Period::month_of(today);
    let this_day = Period::Day(today);

    let approved_by_id: HashMap<i64, &WorkLog> =
        data.approved.iter().map(|l| (l.id, l)).collect();

    let total_in = |period: Period| -> f64 {
        data.items
            .iter()
            .filter(|item| {
                item.work_logs_id
                    .and_then(|id| approved_by_id.get(&id))
                    .map_or(false, |log| {
                        log.approved_at
                            .map_or(false, |ts| period.matches_in(ts, tz))
                    })
            })
            .map(|item| item.total())
            .sum()
    };

    let monthly_total = total_in(this_month);
    let daily_total = total_in(this_day);

    let mut recent: Vec<&WorkLog> = data
        .recent
        .iter()
        .filter(|log| {
            log.created_at
                .map_or(false, |ts| this_month.matches_in(ts, tz))
        })
        .collect();
    recent.sort_by_key(|log| std::cmp::Reverse(log.created_at));
    recent.truncate(RECENT_LIMIT);

    let recent = recent
        .into_iter()
        .map(|log| RecentActivity {
            id: log.id,
            title: work_title(log),
            status_label: log.status_label(),
            date_label: log
                .created_at
                .map(|ts| local_date_in(ts, tz).format("%d/%m/%Y").to_string())
                .unwrap_or_default(),
        })
        .collect();

    OperatorOverview {
        monthly_total,
        monthly_hourly: per_hour(monthly_total, targets.monthly_hours()),
        daily_total,
        daily_hourly: per_hour(daily_total, targets.daily_hours),
        progress_pct: target_pct(monthly_total, targets.monthly_target_eur),
        monthly_target_eur: targets.monthly_target_eur,
        bonus_threshold_eur_hour: targets.bonus_threshold_eur_hour,
        completion_assigned: data.completion.assigned,
        completion_worked: data.completion.worked,
        completion_pct: completion_pct(data.completion.assigned, data.completion.worked),
        recent,
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkLogItem;
    use chrono::FixedOffset;

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

    fn item(parent: i64, quantity: f64, frozen: f64, stored: f64) -> WorkLogItem {
        WorkLogItem {
            work_logs_id: Some(parent),
            quantity,
            frozen_price_client: frozen,
            total_price_client: stored,
            ..Default::default()
        }
    }

    fn dashboard() -> OperatorDashboard {
        OperatorDashboard::default()
    }

    #[test]
    fn monthly_total_applies_the_item_total_rule() {
        let mut data = dashboard();
        data.approved = vec![approved_log(1, "2024-03-10T09:00:00Z")];
        // stored total wins on one line, quantity times frozen on the other
        data.items = vec![item(1, 10.0, 2.5, 0.0), item(1, 1.0, 1.0, 30.0)];

        let now = utc("2024-03-20T12:00:00Z");
        let view = operator_overview(&data, &TargetsConfig::default(), &plus_one(), now);
        assert_eq!(view.monthly_total, 55.0);
        assert_eq!(view.monthly_hourly, 55.0 / 504.0);
    }

    #[test]
    fn month_bucket_follows_the_local_calendar() {
        let mut data = dashboard();
        // 23:30Z on Feb 29 is already March 1st for a UTC+1 viewer
        data.approved = vec![approved_log(1, "2024-02-29T23:30:00Z")];
        data.items = vec![item(1, 4.0, 10.0, 0.0)];

        let in_march = operator_overview(
            &data,
            &TargetsConfig::default(),
            &plus_one(),
            utc("2024-03-20T12:00:00Z"),
        );
        assert_eq!(in_march.monthly_total, 40.0);

        let in_february = operator_overview(
            &data,
            &TargetsConfig::default(),
            &plus_one(),
            utc("2024-02-10T12:00:00Z"),
        );
        assert_eq!(in_february.monthly_total, 0.0);
    }

    #[test]
    fn daily_total_counts_only_today() {
        let mut data = dashboard();
        data.approved = vec![
            approved_log(1, "2024-03-20T08:00:00Z"),
            approved_log(2, "2024-03-19T08:00:00Z"),
        ];
        data.items = vec![item(1, 2.0, 5.0, 0.0), item(2, 100.0, 1.0, 0.0)];

        let view = operator_overview(
            &data,
            &TargetsConfig::default(),
            &plus_one(),
            utc("2024-03-20T12:00:00Z"),
        );
        assert_eq!(view.daily_total, 10.0);
        assert_eq!(view.daily_hourly, 10.0 / 24.0);
        assert_eq!(view.monthly_total, 110.0);
    }

    #[test]
    fn items_of_unknown_logs_are_ignored() {
        let mut data = dashboard();
        data.approved = vec![approved_log(1, "2024-03-10T09:00:00Z")];
        data.items = vec![item(99, 10.0, 10.0, 0.0), item(1, 1.0, 8.0, 0.0)];

        let view = operator_overview(
            &data,
            &TargetsConfig::default(),
            &plus_one(),
            utc("2024-03-20T12:00:00Z"),
        );
        assert_eq!(view.monthly_total, 8.0);
    }

    #[test]
    fn progress_and_completion_percentages() {
        let mut data = dashboard();
        data.approved = vec![approved_log(1, "2024-03-10T09:00:00Z")];
        data.items = vec![item(1, 1.0, 10_500.0, 0.0)];
        data.completion.assigned = 8.0;
        data.completion.worked = 5.0;

        let view = operator_overview(
            &data,
            &TargetsConfig::default(),
            &plus_one(),
            utc("2024-03-20T12:00:00Z"),
        );
        assert_eq!(view.progress_pct, 50);
        assert_eq!(view.completion_pct, 63);

        data.completion.assigned = 0.0;
        let view = operator_overview(
            &data,
            &TargetsConfig::default(),
            &plus_one(),
            utc("2024-03-20T12:00:00Z"),
        );
        assert_eq!(view.completion_pct, 0);
    }

    #[test]
    fn recent_strip_keeps_this_month_newest_first() {
        let mut data = dashboard();
        data.recent = vec![
            WorkLog {
                id: 1,
                cable_code: Some("CV-OLD".into()),
                created_at: Some(utc("2024-02-10T08:00:00Z")),
                ..Default::default()
            },
            WorkLog {
                id: 2,
                cable_code: Some("CV-A".into()),
                status: Some("in_attesa".into()),
                created_at: Some(utc("2024-03-05T08:00:00Z")),
                ..Default::default()
            },
            WorkLog {
                id: 3,
                created_at: Some(utc("2024-03-12T08:00:00Z")),
                ..Default::default()
            },
        ];

        let view = operator_overview(
            &data,
            &TargetsConfig::default(),
            &plus_one(),
            utc("2024-03-20T12:00:00Z"),
        );
        assert_eq!(view.recent.len(), 2);
        assert_eq!(view.recent[0].title, "Lavoro #3");
        assert_eq!(view.recent[1].title, "CV-A");
        assert_eq!(view.recent[1].status_label, "In attesa");
        assert_eq!(view.recent[1].date_label, "05/03/2024");
    }
}
