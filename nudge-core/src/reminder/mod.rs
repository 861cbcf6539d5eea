//! Task reminder scheduling.
//!
//! Given a task's due instant and priority, derive the set of future
//! notification triggers and keep a [`TriggerPort`] in line with them.

mod config;
mod port;
mod recurrence;
mod scheduler;
mod task;
mod trigger;

pub use config::{RecapTime, ReminderConfig};
pub use port::{InMemoryTriggerPort, Registration, TriggerPort};
pub use recurrence::{Recurrence, RecurrenceMapping};
pub use scheduler::{
    ReminderScheduler, cancel_all_for_task, compute_triggers, compute_triggers_in,
};
pub use task::{PriorityBand, ReminderTask, TASK_FILE_VERSION, TaskFile, TaskRecord, top_task};
pub use trigger::{ScheduledTrigger, TriggerKey, TriggerKind, TriggerPayload};
