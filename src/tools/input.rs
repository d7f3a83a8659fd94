//! Parsing of date and time arguments passed to tools

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::reporting::{Calendar, ReportError, TimeWindow};

const DATE_FORMAT: &str = "%Y-%m-%d";
const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD", s))
}

pub fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>, String> {
    s.map(parse_date).transpose()
}

/// Years an event time may fall in
const MIN_YEAR: i32 = 1970;
const MAX_YEAR: i32 = 9999;

/// Parse when an event happened.
///
/// Accepts an RFC 3339 timestamp, a local date-time without offset, or a plain
/// date (meaning local midnight of that day). The result must fall in years
/// 1970 through 9999.
pub fn parse_instant<C: Calendar + ?Sized>(s: &str, cal: &C) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    let instant = parse_any_instant(s, cal).ok_or_else(|| {
        format!(
            "Invalid time '{}': expected RFC 3339, YYYY-MM-DDTHH:MM[:SS] or YYYY-MM-DD",
            s
        )
    })?;

    if !(MIN_YEAR..=MAX_YEAR).contains(&instant.year()) {
        return Err(format!(
            "Time '{}' is out of range: year must be between {} and {}",
            s, MIN_YEAR, MAX_YEAR
        ));
    }
    Ok(instant)
}

fn parse_any_instant<C: Calendar + ?Sized>(s: &str, cal: &C) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in LOCAL_FORMATS {
        if let Ok(local) = NaiveDateTime::parse_from_str(s, format) {
            return Some(cal.local_to_utc(&local));
        }
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .map(|date| cal.day_start(date))
}

/// Event time, defaulting to `now`
pub fn instant_or_now<C: Calendar + ?Sized>(
    s: Option<&str>,
    now: DateTime<Utc>,
    cal: &C,
) -> Result<DateTime<Utc>, String> {
    match s {
        Some(s) => parse_instant(s, cal),
        None => Ok(now),
    }
}

/// Range filter for list tools.
///
/// A single `date` selects that local day. Otherwise `start_date` and
/// `end_date` are whole local days; either may be open.
pub fn date_range<C: Calendar + ?Sized>(
    date: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
    cal: &C,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), String> {
    if let Some(date) = date {
        let window = TimeWindow::for_date(parse_date(date)?, cal);
        return Ok((Some(window.start()), Some(window.end())));
    }

    let start = parse_optional_date(start_date)?.map(|d| cal.day_start(d));
    let end = parse_optional_date(end_date)?.map(|d| cal.day_end(d));

    if let (Some(start), Some(end)) = (start, end) {
        TimeWindow::new(start, end).map_err(|e: ReportError| e.to_string())?;
    }

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn plus_two() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-05").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert!(parse_date("05/01/2024").is_err());
        assert!(parse_optional_date(None).unwrap().is_none());
    }

    #[test]
    fn test_parse_instant_forms() {
        let tz = plus_two();

        assert_eq!(
            parse_instant("2024-01-05T08:30:00Z", &tz).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 5, 8, 30, 0).unwrap()
        );
        assert_eq!(
            parse_instant("2024-01-05T08:30", &tz).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 5, 6, 30, 0).unwrap()
        );
        assert_eq!(
            parse_instant("2024-01-05", &tz).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 4, 22, 0, 0).unwrap()
        );
        assert!(parse_instant("yesterday", &tz).is_err());
    }

    #[test]
    fn test_parse_instant_year_bounds() {
        let tz = plus_two();

        assert!(parse_instant("1969-12-31T12:00:00Z", &tz).unwrap_err().contains("out of range"));
        assert!(parse_instant("+10000-01-01T00:00:00Z", &tz).is_err());
        assert!(parse_instant("0500-06-01", &tz).unwrap_err().contains("out of range"));
        assert!(parse_instant("1970-01-01T00:00:00Z", &tz).is_ok());
        assert!(parse_instant("9999-12-31T10:00", &tz).is_ok());
    }

    #[test]
    fn test_date_range() {
        let tz = plus_two();

        let (start, end) = date_range(Some("2024-01-05"), None, None, &tz).unwrap();
        assert_eq!(start, Some(Utc.with_ymd_and_hms(2024, 1, 4, 22, 0, 0).unwrap()));
        assert!(end.unwrap() > start.unwrap());

        let (start, end) = date_range(None, Some("2024-01-01"), None, &tz).unwrap();
        assert!(start.is_some());
        assert!(end.is_none());

        assert!(date_range(None, Some("2024-01-05"), Some("2024-01-01"), &tz).is_err());
    }
}
