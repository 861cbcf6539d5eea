//! Trigger registration port.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::trigger::{ScheduledTrigger, TriggerKey, TriggerPayload};
use crate::error::NudgeResult;

/// Where scheduled triggers are registered (an OS alarm service, a job
/// queue, ...).
///
/// Implementations must keep at most one active registration per
/// [`TriggerKey`]: registering an existing key replaces the previous entry.
pub trait TriggerPort {
    fn register(&mut self, trigger: &ScheduledTrigger, payload: TriggerPayload) -> NudgeResult<()>;

    fn cancel(&mut self, key: &TriggerKey) -> NudgeResult<()>;

    fn cancel_all(&mut self, task_id: &str) -> NudgeResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub fire_at: DateTime<Utc>,
    pub payload: TriggerPayload,
}

/// Port that keeps registrations in memory.
#[derive(Debug, Default)]
pub struct InMemoryTriggerPort {
    registrations: BTreeMap<TriggerKey, Registration>,
}

impl InMemoryTriggerPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &TriggerKey) -> Option<&Registration> {
        self.registrations.get(key)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Active registrations ordered by fire time.
    pub fn upcoming(&self) -> Vec<(&TriggerKey, &Registration)> {
        let mut entries: Vec<_> = self.registrations.iter().collect();
        entries.sort_by_key(|(key, registration)| (registration.fire_at, *key));
        entries
    }

    pub fn for_task(&self, task_id: &str) -> Vec<(&TriggerKey, &Registration)> {
        self.registrations
            .iter()
            .filter(|(key, _)| key.task_id == task_id)
            .collect()
    }
}

impl TriggerPort for InMemoryTriggerPort {
    fn register(&mut self, trigger: &ScheduledTrigger, payload: TriggerPayload) -> NudgeResult<()> {
        let key = trigger.key();
        let registration = Registration {
            fire_at: trigger.fire_at,
            payload,
        };
        if self.registrations.insert(key.clone(), registration).is_some() {
            debug!(%key, "replaced existing trigger");
        }
        Ok(())
    }

    fn cancel(&mut self, key: &TriggerKey) -> NudgeResult<()> {
        self.registrations.remove(key);
        Ok(())
    }

    fn cancel_all(&mut self, task_id: &str) -> NudgeResult<()> {
        self.registrations.retain(|key, _| key.task_id != task_id);
        Ok(())
    }
}
