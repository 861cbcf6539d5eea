//! Time zone lookup and local wall-clock resolution.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// The system's local zone, or UTC when it cannot be determined.
pub fn system_zone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(name) => resolve_zone(&name).unwrap_or_else(|| {
            tracing::warn!(zone = %name, "unknown system time zone, using UTC");
            Tz::UTC
        }),
        Err(e) => {
            tracing::warn!(error = %e, "could not determine system time zone, using UTC");
            Tz::UTC
        }
    }
}

/// Look up an IANA zone name. Tolerates surrounding quotes and the leading
/// slash some producers put in TZID values.
pub fn resolve_zone(name: &str) -> Option<Tz> {
    let name = name.trim().trim_matches('"').trim_start_matches('/');
    if name.is_empty() {
        return None;
    }
    name.parse::<Tz>().ok()
}

/// Resolve a wall-clock time in `zone` to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap are pushed forward by one hour.
pub fn local_to_utc(naive: NaiveDateTime, zone: &Tz) -> Option<DateTime<Utc>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => zone
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Local midnight at the start of `date` in `zone`.
pub fn start_of_day(date: NaiveDate, zone: &Tz) -> Option<DateTime<Utc>> {
    local_to_utc(date.and_time(NaiveTime::MIN), zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_zone_accepts_common_producer_variants() {
        assert_eq!(resolve_zone("Europe/Paris"), Some(Tz::Europe__Paris));
        assert_eq!(resolve_zone("\"Europe/Paris\""), Some(Tz::Europe__Paris));
        assert_eq!(resolve_zone("/Europe/Paris"), Some(Tz::Europe__Paris));
        assert_eq!(resolve_zone("Romance Standard Time"), None);
        assert_eq!(resolve_zone(""), None);
    }

    #[test]
    fn test_local_to_utc_shifts_times_in_dst_gap() {
        // 2025-03-30 02:30 does not exist in Paris (clocks jump 02:00 -> 03:00)
        let naive = NaiveDate::from_ymd_opt(2025, 3, 30)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let resolved = local_to_utc(naive, &Tz::Europe__Paris).unwrap();

        // 03:30 CEST == 01:30 UTC
        assert_eq!(resolved.to_rfc3339(), "2025-03-30T01:30:00+00:00");
    }

    #[test]
    fn test_local_to_utc_takes_earliest_when_ambiguous() {
        // 02:30 happens twice in Paris on 2025-10-26
        let naive = NaiveDate::from_ymd_opt(2025, 10, 26)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let resolved = local_to_utc(naive, &Tz::Europe__Paris).unwrap();

        assert_eq!(resolved.to_rfc3339(), "2025-10-26T00:30:00+00:00");
    }
}
