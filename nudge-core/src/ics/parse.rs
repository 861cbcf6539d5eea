//! Tolerant VEVENT reader.
//!
//! Unlike a strict RFC 5545 parser, a malformed field or block never fails the
//! whole document: the offending block is dropped and scanning continues.

use std::collections::HashMap;

use chrono::Duration;
use chrono_tz::Tz;
use tracing::debug;

use super::datetime::{ResolvedTime, parse_duration, resolve_date_value};
use crate::event::{CalendarEvent, UNTITLED_EVENT};
use crate::timezone::system_zone;

/// Parse calendar text into events, resolving floating times in the system zone.
pub fn parse_calendar(content: &str) -> Vec<CalendarEvent> {
    parse_calendar_in(content, system_zone())
}

/// Parse calendar text into events sorted by start.
///
/// `default_zone` is used for all-day dates and for date-times that carry
/// neither a `Z` suffix nor a resolvable TZID.
pub fn parse_calendar_in(content: &str, default_zone: Tz) -> Vec<CalendarEvent> {
    if content.trim().is_empty() {
        return Vec::new();
    }

    let lines = unfold_lines(content);

    let mut events = Vec::new();
    let mut block: Option<EventBlock> = None;
    // Depth of components nested inside the current VEVENT (VALARM, ...)
    let mut nested = 0usize;

    for line in &lines {
        let line = line.as_str();
        let marker = line.trim();

        if marker.eq_ignore_ascii_case("BEGIN:VEVENT") {
            if block.is_some() {
                debug!("VEVENT opened before previous one was closed, discarding it");
            }
            block = Some(EventBlock::default());
            nested = 0;
            continue;
        }

        if block.is_none() {
            continue;
        }

        if marker.eq_ignore_ascii_case("END:VEVENT") {
            if let Some(finished) = block.take() {
                events.extend(finished.into_event(&default_zone));
            }
            continue;
        }

        if has_prefix_ignore_case(marker, "BEGIN:") {
            nested += 1;
            continue;
        }
        if has_prefix_ignore_case(marker, "END:") {
            nested = nested.saturating_sub(1);
            continue;
        }
        if nested > 0 {
            continue;
        }

        match (ContentLine::parse(line), block.as_mut()) {
            (Some(content_line), Some(current)) => current.insert(content_line),
            (None, _) => debug!(line, "skipping unparsable content line"),
            _ => {}
        }
    }

    // Unterminated trailing block
    if let Some(finished) = block.take() {
        events.extend(finished.into_event(&default_zone));
    }

    events.sort_by_key(|event| event.start);
    events
}

/// Join folded physical lines into logical lines.
///
/// A physical line starting with a space or tab continues the previous one;
/// exactly that one whitespace character is removed.
fn unfold_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for physical in content.split('\n') {
        let physical = physical.strip_suffix('\r').unwrap_or(physical);
        match physical.strip_prefix(|c: char| c == ' ' || c == '\t') {
            Some(continuation) => match lines.last_mut() {
                Some(last) => last.push_str(continuation),
                None => lines.push(continuation.to_string()),
            },
            None => lines.push(physical.to_string()),
        }
    }
    lines
}

/// Fields of one VEVENT, first occurrence of each name wins.
#[derive(Debug, Default)]
struct EventBlock {
    fields: HashMap<String, ContentLine>,
}

impl EventBlock {
    fn insert(&mut self, line: ContentLine) {
        self.fields.entry(line.name.clone()).or_insert(line);
    }

    /// A field whose value is not blank.
    fn field(&self, name: &str) -> Option<&ContentLine> {
        self.fields
            .get(name)
            .filter(|line| !line.value.trim().is_empty())
    }

    fn resolve_time(&self, name: &str, zone: &Tz) -> Option<ResolvedTime> {
        let line = self.field(name)?;
        resolve_date_value(&line.value, line.param("VALUE"), line.param("TZID"), zone)
    }

    fn into_event(self, zone: &Tz) -> Option<CalendarEvent> {
        let uid = self.field("UID").map(|line| line.value.trim().to_string());

        let Some(start) = self.resolve_time("DTSTART", zone) else {
            debug!(uid = ?uid, "dropping VEVENT without a usable DTSTART");
            return None;
        };

        let end = if self.field("DTEND").is_some() {
            self.resolve_time("DTEND", zone).map(|end| end.instant)
        } else if let Some(duration) = self.field("DURATION") {
            parse_duration(&duration.value).and_then(|d| start.instant.checked_add_signed(d))
        } else if start.all_day {
            start
                .instant
                .checked_add_signed(Duration::days(1) - Duration::milliseconds(1))
        } else {
            start.instant.checked_add_signed(Duration::hours(1))
        };

        let Some(end) = end else {
            debug!(uid = ?uid, "dropping VEVENT with an unusable DTEND/DURATION");
            return None;
        };
        if end < start.instant {
            debug!(uid = ?uid, "dropping VEVENT that ends before it starts");
            return None;
        }

        let title = self
            .field("SUMMARY")
            .map(|line| unescape_text(line.value.trim()))
            .unwrap_or_else(|| UNTITLED_EVENT.to_string());
        let location = self
            .field("LOCATION")
            .map(|line| unescape_text(line.value.trim()));

        let id = uid.unwrap_or_else(|| {
            CalendarEvent::derived_id(&title, start.instant, end, location.as_deref())
        });

        Some(CalendarEvent {
            id,
            title,
            start: start.instant,
            end,
            location,
            all_day: start.all_day,
        })
    }
}

/// One `NAME[;PARAM=VALUE...]:VALUE` line.
#[derive(Debug, Clone, PartialEq)]
struct ContentLine {
    /// Upper-cased
    name: String,
    /// Upper-cased keys, unquoted values
    params: Vec<(String, String)>,
    value: String,
}

impl ContentLine {
    fn parse(line: &str) -> Option<Self> {
        let colon = value_separator(line)?;
        if colon == 0 {
            return None;
        }

        let mut head = split_unquoted(&line[..colon], ';').into_iter();
        let name = head.next()?.trim().to_ascii_uppercase();
        if name.is_empty() {
            return None;
        }

        let params = head
            .filter_map(|param| {
                let (key, value) = param.split_once('=')?;
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                Some((
                    key.to_ascii_uppercase(),
                    value.trim().trim_matches('"').to_string(),
                ))
            })
            .collect();

        Some(ContentLine {
            name,
            params,
            value: line[colon + 1..].to_string(),
        })
    }

    fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Byte index of the first `:` that is not inside a quoted parameter value.
fn value_separator(line: &str) -> Option<usize> {
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ':' if !quoted => return Some(i),
            _ => {}
        }
    }
    None
}

fn split_unquoted(s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if c == separator && !quoted {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

fn has_prefix_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Undo RFC 5545 TEXT escaping (`\,` `\;` `\\` `\n`).
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(escaped @ (',' | ';' | '\\')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
