use anyhow::Result;
use chrono::NaiveDate;
use chrono_tz::Tz;
use nudge_core::{CalendarEvent, DailyRecap};

use crate::render::Render;

pub fn run(events: &[CalendarEvent], date: NaiveDate, zone: &Tz) -> Result<()> {
    let recap = DailyRecap::build(events, date, zone);
    println!("{}", recap.render());
    Ok(())
}
