//! Scheduled reminder triggers and their registration keys.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::ReminderTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    DayBefore,
    TwoHoursBefore,
    OnDay,
    Periodic,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 4] = [
        TriggerKind::DayBefore,
        TriggerKind::TwoHoursBefore,
        TriggerKind::OnDay,
        TriggerKind::Periodic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TriggerKind::DayBefore => "day_before",
            TriggerKind::TwoHoursBefore => "two_hours_before",
            TriggerKind::OnDay => "on_day",
            TriggerKind::Periodic => "periodic",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration key: at most one active trigger per task and kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriggerKey {
    pub task_id: String,
    pub kind: TriggerKind,
}

impl TriggerKey {
    pub fn new(task_id: impl Into<String>, kind: TriggerKind) -> Self {
        TriggerKey {
            task_id: task_id.into(),
            kind,
        }
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}-{}", self.task_id, self.kind)
    }
}

/// One future notification for a task.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduledTrigger {
    pub task_id: String,
    pub kind: TriggerKind,
    pub fire_at: DateTime<Utc>,
}

impl ScheduledTrigger {
    pub fn key(&self) -> TriggerKey {
        TriggerKey::new(self.task_id.clone(), self.kind)
    }
}

/// What the notification layer needs to display a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerPayload {
    pub task_id: String,
    pub title: String,
    pub due_at: DateTime<Utc>,
    pub kind: TriggerKind,
}

impl TriggerPayload {
    pub fn for_task(task: &ReminderTask, kind: TriggerKind) -> Self {
        TriggerPayload {
            task_id: task.id.clone(),
            title: task.title.clone(),
            due_at: task.due_at,
            kind,
        }
    }

    /// Notification text.
    pub fn message(&self) -> String {
        match self.kind {
            TriggerKind::DayBefore => format!("Reminder (day before): {}", self.title),
            TriggerKind::TwoHoursBefore => format!("Reminder (2 hours before): {}", self.title),
            TriggerKind::OnDay => format!("Reminder (today): {}", self.title),
            TriggerKind::Periodic => format!("Periodic reminder: {}", self.title),
        }
    }
}
