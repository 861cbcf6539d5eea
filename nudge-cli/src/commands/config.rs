use anyhow::Result;
use nudge_core::Settings;
use nudge_core::reminder::PriorityBand;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(settings: &Settings) -> Result<()> {
    let config_path = Settings::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());

    println!();
    println!("{}", "Calendar".bold());
    println!(
        "  Source:     {}",
        settings.calendar.source.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  Cache TTL:  {}",
        humantime::format_duration(settings.calendar.cache_ttl)
    );

    let reminders = &settings.reminders;
    println!();
    println!("{}", "Reminders".bold());
    println!("  Recap time:        {}", reminders.recap_time);
    println!("  Day before:        {}", on_off(reminders.enable_day_before));
    println!("  Two hours before:  {}", on_off(reminders.enable_two_hours_before));
    println!("  On the day:        {}", on_off(reminders.enable_on_day));

    println!();
    println!("{}", "Recurrence".bold());
    for band in PriorityBand::ALL {
        println!("  {}  {}", band, settings.recurrence.for_band(band).render());
    }

    Ok(())
}

fn on_off(enabled: bool) -> String {
    if enabled {
        "on".green().to_string()
    } else {
        "off".dimmed().to_string()
    }
}
