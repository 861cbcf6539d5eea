use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use nudge_core::reminder::{TaskFile, top_task};
use owo_colors::OwoColorize;

pub fn run(tasks_path: &Path, now: DateTime<Utc>, zone: &Tz) -> Result<()> {
    let content = std::fs::read_to_string(tasks_path)
        .with_context(|| format!("Could not read {}", tasks_path.display()))?;
    let file = TaskFile::from_json(&content)?;

    let Some(task) = top_task(&file.tasks, now) else {
        println!("{}", "No open tasks".dimmed());
        return Ok(());
    };

    let mut details = task.band().to_string();
    if let Some(due) = task.due_at_millis.and_then(DateTime::from_timestamp_millis) {
        let due = due.with_timezone(zone);
        details.push_str(&format!(" • {} • {}", due.format("%a %-d %b"), due.format("%H:%M")));
    }

    println!("{}", task.title.bold());
    println!("{}", details.dimmed());

    Ok(())
}
