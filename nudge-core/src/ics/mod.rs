//! ICS calendar text parsing.
//!
//! This module turns RFC 5545-style calendar text into normalized
//! [`CalendarEvent`](crate::event::CalendarEvent)s.

mod datetime;
mod parse;

pub use parse::{parse_calendar, parse_calendar_in};
