//! Date range for filtering events.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::event::CalendarEvent;
use crate::timezone::start_of_day;

/// Number of days shown when no end date is given.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Half-open window `[from, to)` for filtering events.
/// None values mean unbounded in that direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        DateRange {
            from: None,
            to: None,
        }
    }

    /// From local midnight of `date` to the next local midnight.
    pub fn day(date: NaiveDate, zone: &Tz) -> Self {
        Self::days(date, date, zone)
    }

    /// From local midnight of `first` to local midnight after `last`.
    pub fn days(first: NaiveDate, last: NaiveDate, zone: &Tz) -> Self {
        DateRange {
            from: start_of_day(first, zone),
            to: last.succ_opt().and_then(|next| start_of_day(next, zone)),
        }
    }

    /// Parse CLI-style bounds in `zone`.
    /// - `from`: "start" for unbounded, or YYYY-MM-DD (defaults to today)
    /// - `to`: YYYY-MM-DD, inclusive (defaults to DEFAULT_WINDOW_DAYS after `from`)
    pub fn from_args(
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
        zone: &Tz,
    ) -> Result<Self, String> {
        let first = match from {
            Some("start") => None,
            Some(s) => Some(parse_date(s)?),
            None => Some(today),
        };

        let last = match to {
            Some(s) => parse_date(s)?,
            None => first.unwrap_or(today) + Duration::days(DEFAULT_WINDOW_DAYS - 1),
        };

        if let Some(first) = first.filter(|first| last < *first) {
            return Err(format!("End date {} is before start date {}", last, first));
        }

        Ok(DateRange {
            from: first.and_then(|d| start_of_day(d, zone)),
            to: last.succ_opt().and_then(|next| start_of_day(next, zone)),
        })
    }

    /// Whether the event overlaps this window.
    pub fn overlaps(&self, event: &CalendarEvent) -> bool {
        let after_from = self.from.is_none_or(|from| event.end > from);
        let before_to = self.to.is_none_or(|to| event.start < to);
        after_from && before_to
    }

    /// Events overlapping this window, in input order.
    pub fn filter<'a>(&self, events: &'a [CalendarEvent]) -> Vec<&'a CalendarEvent> {
        events.iter().filter(|event| self.overlaps(event)).collect()
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}
