//! Report windows
//!
//! Turns "today", "this date" or "the last N days" into a closed UTC interval
//! whose ends fall on local day boundaries. Everything here is a pure function
//! of `now` and the calendar.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

use super::calendar::Calendar;
use super::error::{ReportError, ReportResult};

/// Closed interval `[start, end]` of instants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> ReportResult<Self> {
        if end < start {
            return Err(ReportError::InvalidWindow(format!(
                "end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// The whole local day `date`
    pub fn for_date<C: Calendar + ?Sized>(date: NaiveDate, cal: &C) -> Self {
        Self::spanning(date, date, cal)
    }

    /// Local start of `first` through local end of `last`; `first <= last`
    fn spanning<C: Calendar + ?Sized>(first: NaiveDate, last: NaiveDate, cal: &C) -> Self {
        Self {
            start: cal.day_start(first),
            end: cal.day_end(last),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant <= self.end
    }
}

/// Today's local calendar date
pub fn today<C: Calendar + ?Sized>(now: DateTime<Utc>, cal: &C) -> NaiveDate {
    cal.date_of(&now)
}

/// The whole of today, independent of any requested window
pub fn resolve_today<C: Calendar + ?Sized>(now: DateTime<Utc>, cal: &C) -> TimeWindow {
    TimeWindow::for_date(today(now, cal), cal)
}

/// Resolve a report window.
///
/// An explicit date wins. Otherwise `days_back = N` spans local midnight of
/// `today - N` through the end of today, which is N + 1 calendar days. With
/// neither, the window is today.
pub fn resolve_window<C: Calendar + ?Sized>(
    explicit_date: Option<NaiveDate>,
    days_back: Option<i64>,
    now: DateTime<Utc>,
    cal: &C,
) -> ReportResult<TimeWindow> {
    if let Some(date) = explicit_date {
        return Ok(TimeWindow::for_date(date, cal));
    }

    let Some(days_back) = days_back else {
        return Ok(resolve_today(now, cal));
    };

    if days_back < 0 {
        return Err(ReportError::InvalidWindow(format!(
            "days_back must not be negative, got {}",
            days_back
        )));
    }

    let today = today(now, cal);
    let first = today
        .checked_sub_days(Days::new(days_back as u64))
        .ok_or_else(|| ReportError::InvalidWindow(format!("days_back {} is out of range", days_back)))?;

    Ok(TimeWindow::spanning(first, today, cal))
}

/// The `n` calendar days ending today, today included
pub fn last_n_days<C: Calendar + ?Sized>(
    n: u32,
    now: DateTime<Utc>,
    cal: &C,
) -> ReportResult<TimeWindow> {
    if n == 0 {
        return Err(ReportError::InvalidWindow("window must cover at least one day".to_string()));
    }
    resolve_window(None, Some(i64::from(n - 1)), now, cal)
}
