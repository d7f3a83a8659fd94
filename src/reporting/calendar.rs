//! Calendar day boundaries
//!
//! Every report is bucketed by the *local* calendar date of an event. A
//! [`Calendar`] maps instants to local dates and local dates back to the UTC
//! instants that bound them.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// How far past a DST gap we look for the first valid local time
const GAP_STEP_MINUTES: i64 = 15;
const GAP_MAX_STEPS: i64 = 16;

pub trait Calendar {
    /// Local calendar date of an instant
    fn date_of(&self, instant: &DateTime<Utc>) -> NaiveDate;

    /// Resolve a local wall-clock time to an instant
    fn local_to_utc(&self, local: &NaiveDateTime) -> DateTime<Utc>;

    /// First instant of a local day (local 00:00:00.000)
    fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        self.local_to_utc(&date.and_time(NaiveTime::MIN))
    }

    /// Last millisecond of a local day (local 23:59:59.999)
    fn day_end(&self, date: NaiveDate) -> DateTime<Utc> {
        let next_start = match date.succ_opt() {
            Some(next) => self.day_start(next),
            None => self.day_start(date) + Duration::days(1),
        };
        next_start - Duration::milliseconds(1)
    }
}

/// Resolve a local time in `tz`.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a gap
/// (DST spring-forward) move to the first valid local time after the gap.
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: &NaiveDateTime) -> DateTime<Utc> {
    let mut candidate = *local;
    for _ in 0..GAP_MAX_STEPS {
        if let Some(resolved) = tz.from_local_datetime(&candidate).earliest() {
            return resolved.with_timezone(&Utc);
        }
        candidate += Duration::minutes(GAP_STEP_MINUTES);
    }
    Utc.from_utc_datetime(local)
}

impl<Tz: TimeZone> Calendar for Tz {
    fn date_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(self).date_naive()
    }

    fn local_to_utc(&self, local: &NaiveDateTime) -> DateTime<Utc> {
        resolve_local(self, local)
    }
}

/// The time zone reports are computed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The server's local time zone
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl Calendar for Zone {
    fn date_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        match self {
            Zone::Local => Local.date_of(instant),
            Zone::Fixed(offset) => offset.date_of(instant),
        }
    }

    fn local_to_utc(&self, local: &NaiveDateTime) -> DateTime<Utc> {
        match self {
            Zone::Local => Local.local_to_utc(local),
            Zone::Fixed(offset) => offset.local_to_utc(local),
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Local => write!(f, "local"),
            Zone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}
