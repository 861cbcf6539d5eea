//! TUI rendering traits for nudge types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to nudge-core types using owo_colors.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use nudge_core::CalendarEvent;
use nudge_core::recap::DailyRecap;
use nudge_core::reminder::{Recurrence, TriggerKind};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for TriggerKind {
    fn render(&self) -> String {
        let label = format!("{:<16}", self.as_str());
        match self {
            TriggerKind::DayBefore => label.cyan().to_string(),
            TriggerKind::TwoHoursBefore => label.yellow().to_string(),
            TriggerKind::OnDay => label.red().to_string(),
            TriggerKind::Periodic => label.blue().to_string(),
        }
    }
}

impl Render for Recurrence {
    fn render(&self) -> String {
        match self {
            Recurrence::None => self.as_str().dimmed().to_string(),
            _ => self.as_str().to_string(),
        }
    }
}

impl Render for DailyRecap {
    fn render(&self) -> String {
        if self.is_empty() {
            return self.to_string().dimmed().to_string();
        }

        let mut lines = vec![format!("{}:", self.date_label()).bold().to_string()];
        lines.extend(self.lines.iter().map(|line| format!("  {}", line)));
        if self.more > 0 {
            lines.push(format!("  +{} more", self.more).dimmed().to_string());
        }
        lines.join("\n")
    }
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// Format the time portion of an event (e.g. "15:00" or "all-day")
pub fn format_time(event: &CalendarEvent, zone: &Tz) -> String {
    if event.all_day {
        "all-day".to_string()
    } else {
        format!("{:>7}", event.start.with_timezone(zone).format("%H:%M"))
    }
}

/// One event line: time, title and dimmed location.
pub fn render_event(event: &CalendarEvent, zone: &Tz) -> String {
    match &event.location {
        Some(location) => format!(
            "  {} {} {}",
            format_time(event, zone),
            event.title,
            format!("@ {}", location).dimmed()
        ),
        None => format!("  {} {}", format_time(event, zone), event.title),
    }
}

/// An instant as "Mon Mar 10 20:00" in `zone`.
pub fn format_instant(at: DateTime<Utc>, zone: &Tz) -> String {
    at.with_timezone(zone).format("%a %b %-d %H:%M").to_string()
}
