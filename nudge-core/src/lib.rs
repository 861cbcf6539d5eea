//! Core library for nudge.
//!
//! This crate provides the pieces shared by the CLI and any embedding app:
//! - `ics` for tolerant parsing of calendar text into `CalendarEvent`s
//! - `recap` for the daily recap text and the next upcoming event
//! - `reminder` for deriving task reminder triggers and registering them
//! - `Settings` for the user configuration file

pub mod clock;
pub mod date_range;
pub mod error;
pub mod event;
pub mod ics;
pub mod recap;
pub mod reminder;
pub mod settings;
pub mod timezone;

pub use clock::{Clock, FixedClock, SystemClock};
pub use date_range::DateRange;
pub use error::{NudgeError, NudgeResult};
pub use event::*;
pub use ics::{parse_calendar, parse_calendar_in};
pub use recap::{DailyRecap, next_event};
pub use settings::{CalendarSettings, Settings};
