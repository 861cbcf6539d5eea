use anyhow::Result;
use chrono::NaiveDate;
use chrono_tz::Tz;
use nudge_core::{CalendarEvent, DateRange};
use owo_colors::OwoColorize;

use crate::render::{format_date_label, render_event};

pub fn run(events: &[CalendarEvent], range: &DateRange, zone: &Tz, today: NaiveDate) -> Result<()> {
    let events = range.filter(events);

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    // Group events by local start day
    let mut current_date: Option<NaiveDate> = None;

    for event in events {
        let date = event.start.with_timezone(zone).date_naive();

        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(date, today).bold());
            current_date = Some(date);
        }

        println!("{}", render_event(event, zone));
    }

    Ok(())
}
