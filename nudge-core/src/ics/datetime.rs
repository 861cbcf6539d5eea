//! DTSTART / DTEND / DURATION value normalization.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::timezone::{local_to_utc, resolve_zone, start_of_day};

/// Accepted naive date-time layouts, seconds optional.
const DATE_TIME_FORMATS: [&str; 2] = ["%Y%m%dT%H%M%S", "%Y%m%dT%H%M"];

/// A resolved DTSTART/DTEND value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolvedTime {
    pub instant: DateTime<Utc>,
    pub all_day: bool,
}

/// Normalize a date or date-time value to an instant.
///
/// - `VALUE=DATE` or a bare `yyyyMMdd` is local midnight in `default_zone`
/// - a trailing `Z` is UTC
/// - otherwise the value is wall-clock time in `tzid` when it resolves,
///   else in `default_zone`
pub(crate) fn resolve_date_value(
    value: &str,
    value_type: Option<&str>,
    tzid: Option<&str>,
    default_zone: &Tz,
) -> Option<ResolvedTime> {
    let value = value.trim();

    let is_date = value_type.is_some_and(|v| v.eq_ignore_ascii_case("DATE")) || is_date_only(value);
    if is_date {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").ok()?;
        return Some(ResolvedTime {
            instant: start_of_day(date, default_zone)?,
            all_day: true,
        });
    }

    let instant = match value.strip_suffix('Z') {
        Some(utc) => parse_naive_date_time(utc)?.and_utc(),
        None => {
            let naive = parse_naive_date_time(value)?;
            let zone = tzid.and_then(resolve_zone).unwrap_or(*default_zone);
            local_to_utc(naive, &zone)?
        }
    };

    Some(ResolvedTime {
        instant,
        all_day: false,
    })
}

/// Parse an ISO-8601 duration such as `PT1H30M`, `P1D` or `-PT15M`.
pub(crate) fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (negative, body) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };

    let duration = iso8601::duration(body).ok()?;
    let std_duration: std::time::Duration = duration.into();
    let duration = Duration::from_std(std_duration).ok()?;

    Some(if negative { -duration } else { duration })
}

fn is_date_only(value: &str) -> bool {
    value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit())
}

fn parse_naive_date_time(value: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}
