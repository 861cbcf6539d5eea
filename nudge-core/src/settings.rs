//! User configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{NudgeError, NudgeResult};
use crate::reminder::{ReminderConfig, ReminderScheduler, RecurrenceMapping};

/// How long a downloaded calendar is reused before fetching again.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Where events come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Path or http(s) URL of an .ics file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(with = "humantime_duration")]
    pub cache_ttl: Duration,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        CalendarSettings {
            source: None,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Global configuration at ~/.config/nudge/config.toml
///
/// Every field has a default, so a missing file or section behaves like the
/// commented-out defaults written by [`Settings::create_default_config`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub calendar: CalendarSettings,
    pub reminders: ReminderConfig,
    pub recurrence: RecurrenceMapping,
}

impl Settings {
    pub fn config_path() -> NudgeResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| NudgeError::Config("Could not determine config directory".into()))?
            .join("nudge");

        Ok(config_dir.join("config.toml"))
    }

    /// Load ~/.config/nudge/config.toml, creating it first if missing.
    pub fn load() -> NudgeResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> NudgeResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| NudgeError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| NudgeError::Config(e.to_string()))
    }

    /// Save the current settings to ~/.config/nudge/config.toml
    pub fn save(&self) -> NudgeResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> NudgeResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| NudgeError::Config(e.to_string()))?;

        create_parent_dir(path)?;
        std::fs::write(path, content)
            .map_err(|e| NudgeError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> NudgeResult<()> {
        let defaults = Settings::default();
        let contents = format!(
            "\
# nudge configuration

[calendar]
# Path or URL of the calendar to read events from:
# source = \"https://example.com/calendar.ics\"

# How long a downloaded calendar is reused:
# cache_ttl = \"{}\"

[reminders]
# enable_day_before = {}
# enable_two_hours_before = {}
# enable_on_day = {}

# Local time of the day-before, on-day and periodic reminders:
# recap_time = \"{}\"

[recurrence]
# Periodic reminders per priority band (none, daily, weekly, monthly):
# p1 = \"{}\"
# p2 = \"{}\"
# p3 = \"{}\"
# p4 = \"{}\"
",
            humantime::format_duration(defaults.calendar.cache_ttl),
            defaults.reminders.enable_day_before,
            defaults.reminders.enable_two_hours_before,
            defaults.reminders.enable_on_day,
            defaults.reminders.recap_time,
            defaults.recurrence.p1,
            defaults.recurrence.p2,
            defaults.recurrence.p3,
            defaults.recurrence.p4,
        );

        create_parent_dir(path)?;
        std::fs::write(path, contents)
            .map_err(|e| NudgeError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// A scheduler using these reminder settings.
    pub fn scheduler<C: Clock>(&self, clock: C) -> ReminderScheduler<C> {
        ReminderScheduler::new(clock, self.recurrence, self.reminders)
    }
}

fn create_parent_dir(path: &Path) -> NudgeResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| NudgeError::Config(format!("Could not create config directory: {e}")))?;
    }
    Ok(())
}

/// Durations written the way people type them ("15m", "1h 30m").
mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
