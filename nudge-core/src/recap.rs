//! Daily recap and next-event summaries.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::date_range::DateRange;
use crate::event::CalendarEvent;

/// Events listed in a recap before the rest is summarized as "+N more".
pub const RECAP_MAX_LINES: usize = 8;

/// The events of one local day, formatted for a notification body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRecap {
    pub date: NaiveDate,
    pub lines: Vec<String>,
    /// Events left out after [`RECAP_MAX_LINES`]
    pub more: usize,
}

impl DailyRecap {
    /// Recap of the events overlapping `date` in `zone`, in start order.
    pub fn build(events: &[CalendarEvent], date: NaiveDate, zone: &Tz) -> Self {
        let day = DateRange::day(date, zone).filter(events);
        let more = day.len().saturating_sub(RECAP_MAX_LINES);
        let lines = day
            .into_iter()
            .take(RECAP_MAX_LINES)
            .map(|event| recap_line(event, zone))
            .collect();

        DailyRecap { date, lines, more }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Date as shown in the recap heading, e.g. "Monday 10 March".
    pub fn date_label(&self) -> String {
        self.date.format("%A %-d %B").to_string()
    }
}

impl fmt::Display for DailyRecap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "No events scheduled for {}.", self.date_label());
        }

        writeln!(f, "{}:", self.date_label())?;
        for line in &self.lines {
            writeln!(f, "- {}", line)?;
        }
        if self.more > 0 {
            write!(f, "+{} more", self.more)?;
        }
        Ok(())
    }
}

/// `HH:MM–HH:MM title • location`, times in `zone`.
pub fn recap_line(event: &CalendarEvent, zone: &Tz) -> String {
    let start = event.start.with_timezone(zone).format("%H:%M");
    let end = event.end.with_timezone(zone).format("%H:%M");

    match event.location.as_deref() {
        Some(location) => format!("{}–{} {} • {}", start, end, event.title, location),
        None => format!("{}–{} {}", start, end, event.title),
    }
}

/// The first event that has not ended yet. Expects events in start order.
pub fn next_event(events: &[CalendarEvent], now: DateTime<Utc>) -> Option<&CalendarEvent> {
    events.iter().find(|event| event.end > now)
}
