//! Reminder switches and recap time.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::NudgeError;

/// Local wall-clock time (hour:minute) used for day-before, on-day and
/// periodic reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecapTime(NaiveTime);

impl RecapTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(RecapTime)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn as_naive_time(&self) -> NaiveTime {
        self.0
    }
}

impl Default for RecapTime {
    fn default() -> Self {
        RecapTime(NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl fmt::Display for RecapTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for RecapTime {
    type Err = NudgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NudgeError::InvalidRecapTime(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour = hour.parse().map_err(|_| invalid())?;
        let minute = minute.parse().map_err(|_| invalid())?;
        RecapTime::new(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for RecapTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecapTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Which fixed-offset reminders are enabled, and when recaps fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub enable_day_before: bool,
    pub enable_two_hours_before: bool,
    pub enable_on_day: bool,
    pub recap_time: RecapTime,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        ReminderConfig {
            enable_day_before: true,
            enable_two_hours_before: true,
            enable_on_day: true,
            recap_time: RecapTime::default(),
        }
    }
}
