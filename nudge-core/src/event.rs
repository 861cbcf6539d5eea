//! Normalized calendar events.
//!
//! Every parse produces a fresh list of these; they are never mutated or
//! merged across parses.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Title used when an event has no (or a blank) SUMMARY.
pub const UNTITLED_EVENT: &str = "(No title)";

/// A single timed occurrence read from calendar text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// The source UID, or a content hash when the UID is missing
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    /// Always `>= start`
    pub end: DateTime<Utc>,
    pub location: Option<String>,
    /// DTSTART was a plain date (VALUE=DATE)
    pub all_day: bool,
}

impl CalendarEvent {
    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }

    /// Deterministic id for events without a UID.
    ///
    /// Hashes `title|start_ms|end_ms|location`, so parsing unchanged text
    /// twice yields the same id.
    pub fn derived_id(
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        location: Option<&str>,
    ) -> String {
        let base = format!(
            "{}|{}|{}|{}",
            title.trim(),
            start.timestamp_millis(),
            end.timestamp_millis(),
            location.unwrap_or("")
        );
        let digest = format!("{:x}", Sha256::digest(base.as_bytes()));
        digest[..16].to_string()
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({})", self.title, location),
            None => write!(f, "{}", self.title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_derived_id_is_stable_and_content_sensitive() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();

        let a = CalendarEvent::derived_id("Maths", start, end, Some("B12"));
        let b = CalendarEvent::derived_id("Maths", start, end, Some("B12"));
        let c = CalendarEvent::derived_id("Maths", start, end, None);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_derived_id_ignores_surrounding_title_whitespace() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let end = start;

        assert_eq!(
            CalendarEvent::derived_id("  Maths ", start, end, None),
            CalendarEvent::derived_id("Maths", start, end, None)
        );
    }

    #[test]
    fn test_epoch_millis_accessors() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let event = CalendarEvent {
            id: "a".to_string(),
            title: "Maths".to_string(),
            start,
            end: start + chrono::Duration::hours(1),
            location: None,
            all_day: false,
        };

        assert_eq!(event.start_millis(), 1_740_819_600_000);
        assert_eq!(event.end_millis(), 1_740_823_200_000);
        assert_eq!(DateTime::from_timestamp_millis(event.start_millis()), Some(event.start));
    }
}
