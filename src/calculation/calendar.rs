//! Calendar and duration arithmetic.
//!
//! This module provides inclusive day counts, calendar-year windows, window
//! clipping, service tenure, and the elapsed-months fraction that drives
//! accrual. Every other calculation module builds on these helpers.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Months in a calendar year; the upper bound of any elapsed-months value.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Average month length (30.44 days) used by [`MonthFraction::AverageMonth`].
pub const AVERAGE_DAYS_PER_MONTH: Decimal = Decimal::from_parts(3044, 0, 0, false, 2);

const SECONDS_PER_DAY: i64 = 86_400;

/// Formula used to turn an elapsed span into a number of months.
///
/// # Example
///
/// ```
/// use leave_engine::calculation::MonthFraction;
///
/// let json = serde_json::to_string(&MonthFraction::CalendarExact).unwrap();
/// assert_eq!(json, "\"calendar_exact\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthFraction {
    /// Each calendar month contributes the share of its own length that was
    /// covered. A full month is exactly one; the 15th to the end of a 31-day
    /// month is `17/31`. The start day counts as worked, so this is one day
    /// more than `(days_in_month - start_day) / days_in_month` (`16/31`).
    CalendarExact,
    /// Elapsed days divided by 30.44.
    AverageMonth,
}

/// Counts the days from `start` to `end`, both inclusive.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRange`] when `end` is before `start`.
///
/// # Example
///
/// ```
/// use leave_engine::calculation::inclusive_day_count;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
/// assert_eq!(inclusive_day_count(start, end).unwrap(), 5);
/// assert!(inclusive_day_count(end, start).is_err());
/// ```
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> EngineResult<i64> {
    if end < start {
        return Err(EngineError::InvalidRange { start, end });
    }
    Ok((end - start).num_days() + 1)
}

/// An inclusive range of calendar dates.
///
/// As instants, the window runs from midnight at the start of `start` to
/// midnight after `end`, so the last day is fully covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Creates a window, rejecting inverted ranges.
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if end < start {
            return Err(EngineError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day of the window.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the window, inclusive.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Returns true if `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Intersection with `other`, or `None` when the windows are disjoint.
    pub fn clip(&self, other: &DateWindow) -> Option<DateWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(DateWindow { start, end })
    }

    /// Midnight at the beginning of the first day.
    pub fn start_instant(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Midnight after the last day (the end-of-day bound).
    pub fn end_instant(&self) -> NaiveDateTime {
        self.end
            .checked_add_days(Days::new(1))
            .map(|next| next.and_time(NaiveTime::MIN))
            .unwrap_or(NaiveDateTime::MAX)
    }
}

/// January 1 through December 31 of `year`.
///
/// # Example
///
/// ```
/// use leave_engine::calculation::year_window;
///
/// let window = year_window(2024).unwrap();
/// assert_eq!(window.days(), 366);
/// assert_eq!(window.end_instant().to_string(), "2025-01-01 00:00:00");
/// ```
pub fn year_window(year: i32) -> EngineResult<DateWindow> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year, 12, 31);
    match (start, end) {
        (Some(start), Some(end)) => DateWindow::new(start, end),
        _ => Err(EngineError::CalculationError {
            message: format!("year {} is outside the supported calendar range", year),
        }),
    }
}

/// Whole years of service from `hire_date` to `as_of`, using 365.25-day
/// years. A hire date on or after `as_of` yields zero.
///
/// # Example
///
/// ```
/// use leave_engine::calculation::tenure_years;
/// use chrono::NaiveDate;
///
/// let hired = NaiveDate::from_ymd_opt(2013, 3, 15).unwrap();
/// assert_eq!(tenure_years(hired, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()), 12);
/// assert_eq!(tenure_years(hired, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()), 11);
/// ```
pub fn tenure_years(hire_date: NaiveDate, as_of: NaiveDate) -> u32 {
    if as_of <= hire_date {
        return 0;
    }
    // floor(days / 365.25) == floor(days * 4 / 1461)
    let days = (as_of - hire_date).num_days();
    u32::try_from(days * 4 / 1461).unwrap_or(u32::MAX)
}

/// Months elapsed between `window_start` and `as_of`, saturating at
/// `window_end`.
///
/// `as_of` before the window gives zero; `as_of` after it gives the whole
/// window. The result is clamped to `[0, 12]`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRange`] when `window_end` precedes
/// `window_start`.
///
/// # Example
///
/// ```
/// use leave_engine::calculation::{months_elapsed_fraction, year_window, MonthFraction};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let year = year_window(2025).unwrap();
/// let as_of = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// let months = months_elapsed_fraction(
///     year.start_instant(),
///     year.end_instant(),
///     as_of,
///     MonthFraction::CalendarExact,
/// )
/// .unwrap();
/// assert_eq!(months, Decimal::from(6));
/// ```
pub fn months_elapsed_fraction(
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
    as_of: NaiveDateTime,
    method: MonthFraction,
) -> EngineResult<Decimal> {
    if window_end < window_start {
        return Err(EngineError::InvalidRange {
            start: window_start.date(),
            end: window_end.date(),
        });
    }

    let end = as_of.clamp(window_start, window_end);
    let months = match method {
        MonthFraction::CalendarExact => calendar_months(window_start, end)?,
        MonthFraction::AverageMonth => average_months(window_start, end),
    };

    Ok(months.clamp(Decimal::ZERO, MONTHS_PER_YEAR))
}

fn calendar_months(start: NaiveDateTime, end: NaiveDateTime) -> EngineResult<Decimal> {
    let mut total = Decimal::ZERO;
    let mut cursor = start;

    while cursor < end {
        let month_start = first_of_month(cursor.date())?.and_time(NaiveTime::MIN);
        let next_month = first_of_next_month(cursor.date())?.and_time(NaiveTime::MIN);
        let month_seconds = (next_month - month_start).num_seconds();
        let segment_end = end.min(next_month);
        let covered = (segment_end - cursor).num_seconds();

        total += Decimal::from(covered) / Decimal::from(month_seconds);
        cursor = segment_end;
    }

    Ok(total)
}

fn average_months(start: NaiveDateTime, end: NaiveDateTime) -> Decimal {
    let seconds = (end - start).num_seconds();
    let days = Decimal::from(seconds) / Decimal::from(SECONDS_PER_DAY);
    days / AVERAGE_DAYS_PER_MONTH
}

fn first_of_month(date: NaiveDate) -> EngineResult<NaiveDate> {
    date.with_day(1).ok_or_else(|| EngineError::CalculationError {
        message: format!("no first day of month for {}", date),
    })
}

fn first_of_next_month(date: NaiveDate) -> EngineResult<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| EngineError::CalculationError {
        message: format!("month after {} is outside the supported calendar range", date),
    })
}
