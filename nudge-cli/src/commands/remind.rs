use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use nudge_core::reminder::{InMemoryTriggerPort, TaskFile};
use nudge_core::{FixedClock, Settings};
use owo_colors::OwoColorize;

use crate::render::{Render, format_instant};

/// Schedule every task of a task file into an in-memory port and list what
/// would fire.
pub fn run(tasks_path: &Path, now: DateTime<Utc>, zone: Tz, settings: &Settings) -> Result<()> {
    let content = std::fs::read_to_string(tasks_path)
        .with_context(|| format!("Could not read {}", tasks_path.display()))?;
    let file = TaskFile::from_json(&content)?;

    let scheduler = settings.scheduler(FixedClock::new(now, zone));
    let mut port = InMemoryTriggerPort::new();
    scheduler.sync_records(&mut port, &file.tasks)?;

    let upcoming = port.upcoming();
    if upcoming.is_empty() {
        println!("{}", "No reminders scheduled".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!("{} reminders for {} tasks", upcoming.len(), file.tasks.len()).bold()
    );
    for (key, registration) in upcoming {
        println!(
            "  {}  {} {}",
            format_instant(registration.fire_at, &zone),
            key.kind.render(),
            registration.payload.message()
        );
    }

    Ok(())
}
