//! Reporting periods with local-calendar semantics
//!
//! Bucket membership is decided on the viewer's local calendar fields
//! (year, month, day), never by slicing raw UTC timestamps: an approval
//! at `23:30Z` belongs to the next day for a UTC+1 viewer.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};

/// A reporting window: one calendar day, one calendar month, or
/// everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
    All,
}

impl Period {
    /// Parse a `YYYY-MM-DD` day.
    pub fn parse_day(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .map(Period::Day)
    }

    /// Parse a `YYYY-MM` month.
    pub fn parse_month(s: &str) -> Option<Self> {
        let t = s.trim();
        let (y, m) = t.split_once('-')?;
        let year: i32 = y.parse().ok()?;
        let month: u32 = m.parse().ok()?;
        if (1..=12).contains(&month) {
            Some(Period::Month { year, month })
        } else {
            None
        }
    }

    /// The month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        Period::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Whether `ts` falls inside this period on the calendar of `tz`.
    pub fn matches_in<Tz: TimeZone>(&self, ts: DateTime<Utc>, tz: &Tz) -> bool {
        let local = ts.with_timezone(tz);
        match self {
            Period::Day(d) => local.date_naive() == *d,
            Period::Month { year, month } => local.year() == *year && local.month() == *month,
            Period::All => true,
        }
    }

    /// Membership on the viewer's local calendar.
    pub fn matches(&self, ts: DateTime<Utc>) -> bool {
        self.matches_in(ts, &Local)
    }
}

/// Local calendar date of a UTC instant.
pub fn local_date_in<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}

// ── Tests ──────────────────────────────────────────────────────
