mod commands;
mod render;
mod source;
mod utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use nudge_core::timezone::system_zone;
use nudge_core::{CalendarEvent, DateRange, Settings, parse_calendar_in};
use tracing_subscriber::EnvFilter;

use crate::source::CalendarSource;

#[derive(Parser)]
#[command(name = "nudge")]
#[command(about = "Preview calendar events, daily recaps and task reminders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events grouped by day
    Events {
        /// Calendar file or URL (defaults to calendar.source from the config)
        source: Option<String>,

        /// Show events from this date (YYYY-MM-DD, or "start" for all past events)
        #[arg(long)]
        from: Option<String>,

        /// Show events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Print the recap of one day
    Recap {
        /// Calendar file or URL (defaults to calendar.source from the config)
        source: Option<String>,

        /// Day to recap (YYYY-MM-DD, defaults to tomorrow)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show the next event that has not ended yet
    Next {
        /// Calendar file or URL (defaults to calendar.source from the config)
        source: Option<String>,
    },
    /// Preview the reminders of a task file
    Remind {
        /// Task file exported by the task store (JSON)
        tasks: PathBuf,

        /// Schedule as if it were this instant (RFC 3339)
        #[arg(long)]
        now: Option<String>,
    },
    /// Show the open task to work on first
    Top {
        /// Task file exported by the task store (JSON)
        tasks: PathBuf,
    },
    /// Show the config path and effective settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let settings = Settings::load()?;
    let zone = system_zone();
    let now = Utc::now();
    let today = now.with_timezone(&zone).date_naive();

    match cli.command {
        Commands::Events { source, from, to } => {
            let range = DateRange::from_args(from.as_deref(), to.as_deref(), today, &zone)
                .map_err(|e| anyhow::anyhow!(e))?;
            let events = load_events(source, &settings, zone).await?;
            commands::events::run(&events, &range, &zone, today)
        }
        Commands::Recap { source, date } => {
            let date = match date {
                Some(date) => parse_date(&date)?,
                None => today
                    .checked_add_days(Days::new(1))
                    .context("Could not determine tomorrow's date")?,
            };
            let events = load_events(source, &settings, zone).await?;
            commands::recap::run(&events, date, &zone)
        }
        Commands::Next { source } => {
            let events = load_events(source, &settings, zone).await?;
            commands::next::run(&events, now, &zone)
        }
        Commands::Remind { tasks, now: at } => {
            let at = match at {
                Some(at) => parse_instant(&at)?,
                None => now,
            };
            commands::remind::run(&tasks, at, zone, &settings)
        }
        Commands::Top { tasks } => commands::top::run(&tasks, now, &zone),
        Commands::Config => commands::config::run(&settings),
    }
}

/// Log to stderr, filtered by RUST_LOG (warnings only by default).
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

async fn load_events(
    source: Option<String>,
    settings: &Settings,
    zone: Tz,
) -> Result<Vec<CalendarEvent>> {
    let source = resolve_source(source, settings)?;

    let spinner = utils::tui::create_spinner(format!("Loading {}...", source));
    let text = source.fetch_text(settings.calendar.cache_ttl).await;
    spinner.finish_and_clear();

    Ok(parse_calendar_in(&text, zone))
}

fn resolve_source(source: Option<String>, settings: &Settings) -> Result<CalendarSource> {
    match source.or_else(|| settings.calendar.source.clone()) {
        Some(source) => Ok(CalendarSource::parse(&source)),
        None => {
            let config_path = Settings::config_path()?;
            anyhow::bail!(
                "No calendar source given.\n\n\
                Pass a file or URL:\n  \
                nudge events ~/school.ics\n\n\
                Or set a default in {}:\n  \
                [calendar]\n  \
                source = \"https://example.com/calendar.ics\"",
                config_path.display()
            );
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|at| at.with_timezone(&Utc))
        .with_context(|| {
            format!(
                "Invalid instant '{}'. Expected RFC 3339, e.g. 2025-03-05T10:00:00+01:00",
                s
            )
        })
}
