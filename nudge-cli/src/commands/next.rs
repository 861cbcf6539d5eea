use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use nudge_core::{CalendarEvent, next_event};
use owo_colors::OwoColorize;

pub fn run(events: &[CalendarEvent], now: DateTime<Utc>, zone: &Tz) -> Result<()> {
    let Some(event) = next_event(events, now) else {
        println!("{}", "No upcoming events".dimmed());
        return Ok(());
    };

    let start = event.start.with_timezone(zone);
    let end = event.end.with_timezone(zone);
    let mut when = format!(
        "{} • {}–{}",
        start.format("%a %-d %b"),
        start.format("%H:%M"),
        end.format("%H:%M")
    );
    if let Some(location) = &event.location {
        when.push_str(&format!(" • {}", location));
    }

    println!("{}", event.title.bold());
    println!("{}", when.dimmed());

    Ok(())
}
