//! Tasks as seen by the reminder scheduler, and the versioned task file
//! shape they are mapped from.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{NudgeError, NudgeResult};
use crate::timezone::resolve_zone;

/// Current version of the task file format.
pub const TASK_FILE_VERSION: u32 = 1;

/// Four-level urgency classification, P4 being the most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityBand {
    P1,
    P2,
    P3,
    P4,
}

impl PriorityBand {
    pub const ALL: [PriorityBand; 4] = [
        PriorityBand::P1,
        PriorityBand::P2,
        PriorityBand::P3,
        PriorityBand::P4,
    ];

    /// Normalize a raw task priority.
    ///
    /// `0..=3` is zero-based and maps to P1..P4. Anything below zero is P1,
    /// anything from 4 up is P4 (so both 3 and 4 mean P4).
    pub fn from_priority(priority: i64) -> Self {
        match priority {
            i64::MIN..=0 => PriorityBand::P1,
            1 => PriorityBand::P2,
            2 => PriorityBand::P3,
            _ => PriorityBand::P4,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            PriorityBand::P1 => 1,
            PriorityBand::P2 => 2,
            PriorityBand::P3 => 3,
            PriorityBand::P4 => 4,
        }
    }
}

impl fmt::Display for PriorityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.number())
    }
}

/// A task with a deadline, read-only input to the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderTask {
    pub id: String,
    pub title: String,
    pub due_at: DateTime<Utc>,
    /// Raw priority as stored by the task store
    pub priority: i64,
    /// Zone the due date is expressed in; the clock's zone when unset
    pub time_zone: Option<Tz>,
}

impl ReminderTask {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        due_at: DateTime<Utc>,
        priority: i64,
    ) -> Self {
        ReminderTask {
            id: id.into(),
            title: title.into(),
            due_at,
            priority,
            time_zone: None,
        }
    }

    pub fn with_time_zone(mut self, zone: Tz) -> Self {
        self.time_zone = Some(zone);
        self
    }

    pub fn band(&self) -> PriorityBand {
        PriorityBand::from_priority(self.priority)
    }
}

/// One task as persisted by the task store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub priority: i64,
    /// Epoch milliseconds, `None` when the task has no deadline
    #[serde(default)]
    pub due_at_millis: Option<i64>,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// IANA zone name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl TaskRecord {
    pub fn band(&self) -> PriorityBand {
        PriorityBand::from_priority(self.priority)
    }

    /// The scheduler's view of this record.
    ///
    /// Completed tasks and tasks without a deadline have nothing to remind
    /// about and map to `None`.
    pub fn to_reminder_task(&self) -> Option<ReminderTask> {
        if self.done {
            return None;
        }
        let due_at = DateTime::from_timestamp_millis(self.due_at_millis?)?;

        Some(ReminderTask {
            id: self.id.clone(),
            title: self.title.clone(),
            due_at,
            priority: self.priority,
            time_zone: self.time_zone.as_deref().and_then(resolve_zone),
        })
    }
}

/// The task to surface first.
///
/// Only open tasks are considered, and only those still due at or after
/// `now` when there are any. Among them the most urgent band wins, then the
/// earliest deadline (tasks without one last), then the title.
pub fn top_task(records: &[TaskRecord], now: DateTime<Utc>) -> Option<&TaskRecord> {
    let now_millis = now.timestamp_millis();
    let open: Vec<&TaskRecord> = records.iter().filter(|record| !record.done).collect();
    let upcoming: Vec<&TaskRecord> = open
        .iter()
        .copied()
        .filter(|record| record.due_at_millis.is_some_and(|due| due >= now_millis))
        .collect();

    let candidates = if upcoming.is_empty() { open } else { upcoming };

    candidates.into_iter().min_by(|a, b| {
        b.band()
            .cmp(&a.band())
            .then_with(|| {
                let a_due = a.due_at_millis.unwrap_or(i64::MAX);
                a_due.cmp(&b.due_at_millis.unwrap_or(i64::MAX))
            })
            .then_with(|| a.title.cmp(&b.title))
    })
}

fn default_version() -> u32 {
    TASK_FILE_VERSION
}

/// The task store's export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

impl TaskFile {
    pub fn new(tasks: Vec<TaskRecord>) -> Self {
        TaskFile {
            version: TASK_FILE_VERSION,
            tasks,
        }
    }

    pub fn from_json(content: &str) -> NudgeResult<Self> {
        let file: TaskFile = serde_json::from_str(content)
            .map_err(|e| NudgeError::Serialization(e.to_string()))?;

        if file.version != TASK_FILE_VERSION {
            return Err(NudgeError::UnsupportedTaskFileVersion(file.version));
        }

        Ok(file)
    }

    pub fn to_json(&self) -> NudgeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| NudgeError::Serialization(e.to_string()))
    }
}
