//! # Period Bucketing
//!
//! Calendar period math for sales aggregates.
//!
//! Every recorded sale contributes to exactly three aggregate buckets: the
//! day, the week and the month containing its sale date. This module owns
//! the boundary math so the database layer never computes dates itself.
//!
//! ## Bucket Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale dated Wed 2026-08-05 14:30 falls into:                            │
//! │                                                                         │
//! │  DAY    [2026-08-05 00:00:00.000, 2026-08-06 00:00:00.000)             │
//! │  WEEK   [2026-08-02 00:00:00.000, 2026-08-09 00:00:00.000)  (Sun-Sun)  │
//! │  MONTH  [2026-08-01 00:00:00.000, 2026-08-31 23:59:59.999]             │
//! │                                                                         │
//! │  The stored period_end differs per bucket kind: day and week store     │
//! │  the exclusive start of the next period, month stores the inclusive    │
//! │  end-of-day instant of the last calendar day.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Boundary Rules
//! - Weeks start on **Sunday**. A sale at exactly Sunday 00:00:00.000
//!   belongs to the week starting that instant, not the previous one.
//! - A sale on the last calendar day of a month belongs to that month's
//!   bucket up to 23:59:59.999.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Period Type
// =============================================================================

/// The kind of calendar period an aggregate bucket covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum PeriodType {
    /// One calendar day.
    Day,
    /// Sunday-to-Sunday calendar week.
    Week,
    /// One calendar month.
    Month,
}

impl PeriodType {
    /// All bucket kinds, in the order they are written by the sale
    /// transaction.
    pub const ALL: [PeriodType; 3] = [PeriodType::Day, PeriodType::Week, PeriodType::Month];

    /// Returns the bucket boundaries containing `at`.
    pub fn bounds(self, at: DateTime<Utc>) -> PeriodBounds {
        match self {
            PeriodType::Day => day_bounds(at),
            PeriodType::Week => week_bounds(at),
            PeriodType::Month => month_bounds(at),
        }
    }
}

// =============================================================================
// Period Bounds
// =============================================================================

/// The `[start, end]` pair identifying one aggregate bucket.
///
/// `start` is the uniqueness key component; `end` is stored denormalized so
/// reporting queries never re-derive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The day bucket: local midnight to the start of the next day.
pub fn day_bounds(at: DateTime<Utc>) -> PeriodBounds {
    let start = midnight(at.date_naive());
    PeriodBounds {
        start,
        end: start + Duration::days(1),
    }
}

/// The week bucket: the Sunday on or before `at`, plus seven days.
pub fn week_bounds(at: DateTime<Utc>) -> PeriodBounds {
    let date = at.date_naive();
    let days_since_sunday = date.weekday().num_days_from_sunday() as i64;
    let start = midnight(date - Duration::days(days_since_sunday));
    PeriodBounds {
        start,
        end: start + Duration::days(7),
    }
}

/// The month bucket: first of the month to the last calendar day at
/// 23:59:59.999.
pub fn month_bounds(at: DateTime<Utc>) -> PeriodBounds {
    let date = at.date_naive();
    let start = midnight(first_of_month(date.year(), date.month()));

    let next_month = if date.month() == 12 {
        first_of_month(date.year() + 1, 1)
    } else {
        first_of_month(date.year(), date.month() + 1)
    };
    PeriodBounds {
        start,
        end: midnight(next_month) - Duration::milliseconds(1),
    }
}

/// The first instant of a calendar day, as UTC.
fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // Day 1 exists in every month of every year.
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is always a valid date")
}

// =============================================================================
// Unit Tests
// =============================================================================
