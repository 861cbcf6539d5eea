//! Reminder trigger derivation.
//!
//! Every computation is a pure function of the task, the configuration and
//! `now`. Nothing is remembered between calls: keeping the schedule
//! consistent relies on the port replacing registrations by key.

use std::collections::BTreeSet;

use chrono::{DateTime, Days, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use super::config::ReminderConfig;
use super::port::TriggerPort;
use super::recurrence::RecurrenceMapping;
use super::task::{ReminderTask, TaskRecord};
use super::trigger::{ScheduledTrigger, TriggerKey, TriggerKind, TriggerPayload};
use crate::clock::Clock;
use crate::error::NudgeResult;
use crate::timezone::{local_to_utc, system_zone};

/// Future triggers for `task`, resolving wall-clock times in the task's zone
/// or the system zone.
pub fn compute_triggers(
    task: &ReminderTask,
    mapping: &RecurrenceMapping,
    config: &ReminderConfig,
    now: DateTime<Utc>,
) -> BTreeSet<ScheduledTrigger> {
    compute_triggers_in(task, mapping, config, now, task.time_zone.unwrap_or_else(system_zone))
}

/// Future triggers for `task`; `fallback_zone` applies when the task has no
/// zone of its own.
///
/// Every returned trigger fires strictly after `now`, and periodic triggers
/// never fire after the task is due.
pub fn compute_triggers_in(
    task: &ReminderTask,
    mapping: &RecurrenceMapping,
    config: &ReminderConfig,
    now: DateTime<Utc>,
    fallback_zone: Tz,
) -> BTreeSet<ScheduledTrigger> {
    let mut triggers = BTreeSet::new();
    if task.due_at.timestamp_millis() <= 0 {
        return triggers;
    }

    let zone = task.time_zone.unwrap_or(fallback_zone);
    let due_local = task.due_at.with_timezone(&zone);
    let due_date = due_local.date_naive();
    let recap = config.recap_time.as_naive_time();

    let mut push = |kind: TriggerKind, fire_at: Option<DateTime<Utc>>| {
        if let Some(fire_at) = fire_at.filter(|at| *at > now) {
            triggers.insert(ScheduledTrigger {
                task_id: task.id.clone(),
                kind,
                fire_at,
            });
        }
    };

    if config.enable_day_before {
        let day_before = due_date
            .pred_opt()
            .and_then(|date| local_to_utc(date.and_time(recap), &zone));
        push(TriggerKind::DayBefore, day_before);
    }

    // A due time of exactly midnight means "some time that day"
    if config.enable_two_hours_before && due_local.time() != NaiveTime::MIN {
        push(TriggerKind::TwoHoursBefore, Some(task.due_at - Duration::hours(2)));
    }

    if config.enable_on_day {
        push(TriggerKind::OnDay, local_to_utc(due_date.and_time(recap), &zone));
    }

    if let Some(period_days) = mapping.for_priority(task.priority).period_days() {
        push(
            TriggerKind::Periodic,
            next_periodic(now, task.due_at, period_days, recap, &zone),
        );
    }

    triggers
}

/// Keys the port must revoke to forget every trigger of a task.
pub fn cancel_all_for_task(task_id: &str) -> BTreeSet<TriggerKey> {
    TriggerKind::ALL
        .into_iter()
        .map(|kind| TriggerKey::new(task_id, kind))
        .collect()
}

/// First recap-time occurrence of the cadence strictly after `now`, stepping
/// from today in local days. `None` when it would fall after `due_at`.
fn next_periodic(
    now: DateTime<Utc>,
    due_at: DateTime<Utc>,
    period_days: u64,
    recap: NaiveTime,
    zone: &Tz,
) -> Option<DateTime<Utc>> {
    let mut date = now.with_timezone(zone).date_naive();
    let mut candidate = local_to_utc(date.and_time(recap), zone)?;

    while candidate <= now {
        date = date.checked_add_days(Days::new(period_days))?;
        candidate = local_to_utc(date.and_time(recap), zone)?;
    }

    (candidate <= due_at).then_some(candidate)
}

/// Keeps a trigger port in line with tasks, using one clock and one
/// configuration.
#[derive(Debug, Clone)]
pub struct ReminderScheduler<C: Clock> {
    clock: C,
    mapping: RecurrenceMapping,
    config: ReminderConfig,
}

impl<C: Clock> ReminderScheduler<C> {
    pub fn new(clock: C, mapping: RecurrenceMapping, config: ReminderConfig) -> Self {
        ReminderScheduler {
            clock,
            mapping,
            config,
        }
    }

    pub fn mapping(&self) -> &RecurrenceMapping {
        &self.mapping
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    pub fn triggers_for(&self, task: &ReminderTask) -> BTreeSet<ScheduledTrigger> {
        self.triggers_at(task, self.clock.now(), self.clock.local_zone())
    }

    /// Recompute a task's triggers and push them to the port.
    ///
    /// Kinds that no longer apply are cancelled; the others are registered,
    /// replacing whatever the port held for the same key.
    pub fn sync_task<P>(
        &self,
        port: &mut P,
        task: &ReminderTask,
    ) -> NudgeResult<BTreeSet<ScheduledTrigger>>
    where
        P: TriggerPort + ?Sized,
    {
        self.sync_at(port, task, self.clock.now(), self.clock.local_zone())
    }

    /// Forget every trigger of a deleted or completed task.
    pub fn remove_task<P>(&self, port: &mut P, task_id: &str) -> NudgeResult<()>
    where
        P: TriggerPort + ?Sized,
    {
        debug!(task_id, "cancelling all reminders");
        port.cancel_all(task_id)
    }

    /// Reschedule every task, e.g. after boot or a settings change.
    ///
    /// All tasks are computed against the same instant. Returns every
    /// registered trigger ordered by fire time.
    pub fn sync_all<P>(
        &self,
        port: &mut P,
        tasks: &[ReminderTask],
    ) -> NudgeResult<Vec<ScheduledTrigger>>
    where
        P: TriggerPort + ?Sized,
    {
        let now = self.clock.now();
        let zone = self.clock.local_zone();

        let mut scheduled = Vec::new();
        for task in tasks {
            scheduled.extend(self.sync_at(port, task, now, zone)?);
        }

        sort_by_fire_time(&mut scheduled);
        Ok(scheduled)
    }

    /// Like [`sync_all`](Self::sync_all) for a task export. Records that map
    /// to no reminder task (done, or without a deadline) have their triggers
    /// removed.
    pub fn sync_records<P>(
        &self,
        port: &mut P,
        records: &[TaskRecord],
    ) -> NudgeResult<Vec<ScheduledTrigger>>
    where
        P: TriggerPort + ?Sized,
    {
        let now = self.clock.now();
        let zone = self.clock.local_zone();

        let mut scheduled = Vec::new();
        for record in records {
            match record.to_reminder_task() {
                Some(task) => scheduled.extend(self.sync_at(port, &task, now, zone)?),
                None => self.remove_task(port, &record.id)?,
            }
        }

        sort_by_fire_time(&mut scheduled);
        Ok(scheduled)
    }

    fn triggers_at(
        &self,
        task: &ReminderTask,
        now: DateTime<Utc>,
        zone: Tz,
    ) -> BTreeSet<ScheduledTrigger> {
        compute_triggers_in(task, &self.mapping, &self.config, now, zone)
    }

    fn sync_at<P>(
        &self,
        port: &mut P,
        task: &ReminderTask,
        now: DateTime<Utc>,
        zone: Tz,
    ) -> NudgeResult<BTreeSet<ScheduledTrigger>>
    where
        P: TriggerPort + ?Sized,
    {
        let triggers = self.triggers_at(task, now, zone);

        for kind in TriggerKind::ALL {
            if !triggers.iter().any(|trigger| trigger.kind == kind) {
                port.cancel(&TriggerKey::new(task.id.as_str(), kind))?;
            }
        }
        for trigger in &triggers {
            port.register(trigger, TriggerPayload::for_task(task, trigger.kind))?;
        }

        debug!(task_id = %task.id, count = triggers.len(), "scheduled reminders");
        Ok(triggers)
    }
}

fn sort_by_fire_time(triggers: &mut [ScheduledTrigger]) {
    triggers.sort_by(|a, b| a.fire_at.cmp(&b.fire_at).then_with(|| a.cmp(b)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::reminder::config::RecapTime;
    use crate::reminder::port::InMemoryTriggerPort;
    use crate::reminder::recurrence::Recurrence;
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    const PARIS: Tz = Tz::Europe__Paris;

    fn paris(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        PARIS
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn task(due_at: DateTime<Utc>, priority: i64) -> ReminderTask {
        ReminderTask::new("t1", "Essay", due_at, priority).with_time_zone(PARIS)
    }

    fn default_triggers(task: &ReminderTask, now: DateTime<Utc>) -> BTreeSet<ScheduledTrigger> {
        compute_triggers(task, &RecurrenceMapping::default(), &ReminderConfig::default(), now)
    }

    fn kinds(triggers: &BTreeSet<ScheduledTrigger>) -> Vec<(TriggerKind, DateTime<Utc>)> {
        let mut kinds: Vec<_> = triggers.iter().map(|t| (t.kind, t.fire_at)).collect();
        kinds.sort();
        kinds
    }

    #[test]
    fn test_daily_task_example() {
        let config = ReminderConfig {
            enable_two_hours_before: false,
            ..ReminderConfig::default()
        };
        let due = paris(2025, 3, 10, 23, 59);
        let now = paris(2025, 3, 5, 10, 0);

        let triggers = compute_triggers(&task(due, 4), &RecurrenceMapping::default(), &config, now);

        assert_eq!(
            kinds(&triggers),
            vec![
                (TriggerKind::DayBefore, paris(2025, 3, 9, 20, 0)),
                (TriggerKind::OnDay, paris(2025, 3, 10, 20, 0)),
                (TriggerKind::Periodic, paris(2025, 3, 5, 20, 0)),
            ]
        );
    }

    #[test]
    fn test_two_hours_before_for_timed_due_date() {
        let due = paris(2025, 3, 10, 14, 30);
        let now = paris(2025, 3, 5, 10, 0);

        let triggers = default_triggers(&task(due, 0), now);

        assert!(triggers.contains(&ScheduledTrigger {
            task_id: "t1".to_string(),
            kind: TriggerKind::TwoHoursBefore,
            fire_at: paris(2025, 3, 10, 12, 30),
        }));
    }

    #[test]
    fn test_no_two_hours_before_for_midnight_due_date() {
        let due = paris(2025, 3, 10, 0, 0);
        let now = paris(2025, 3, 5, 10, 0);

        let triggers = default_triggers(&task(due, 0), now);

        assert!(triggers.iter().all(|t| t.kind != TriggerKind::TwoHoursBefore));
        assert_eq!(triggers.len(), 2);
    }

    #[test]
    fn test_disabled_switches_emit_nothing() {
        let config = ReminderConfig {
            enable_day_before: false,
            enable_two_hours_before: false,
            enable_on_day: false,
            recap_time: RecapTime::default(),
        };
        let due = paris(2025, 3, 10, 14, 30);

        let triggers = compute_triggers(
            &task(due, 0),
            &RecurrenceMapping::default(),
            &config,
            paris(2025, 3, 5, 10, 0),
        );

        assert!(triggers.is_empty());
    }

    #[test]
    fn test_past_triggers_are_omitted() {
        // Day-before recap already passed, on-day recap still ahead
        let due = paris(2025, 3, 10, 22, 0);
        let now = paris(2025, 3, 10, 9, 0);

        let triggers = default_triggers(&task(due, 0), now);

        assert_eq!(
            kinds(&triggers),
            vec![
                (TriggerKind::TwoHoursBefore, paris(2025, 3, 10, 20, 0)),
                (TriggerKind::OnDay, paris(2025, 3, 10, 20, 0)),
            ]
        );
    }

    #[test]
    fn test_overdue_task_has_no_triggers() {
        let due = paris(2025, 3, 1, 12, 0);
        let now = paris(2025, 3, 5, 10, 0);

        let triggers = default_triggers(&task(due, 4), now);

        assert!(triggers.is_empty());
    }

    #[test]
    fn test_zero_or_negative_due_instant_has_no_triggers() {
        let now = Utc.with_ymd_and_hms(1969, 12, 1, 0, 0, 0).unwrap();
        for millis in [0, -86_400_000] {
            let due = DateTime::from_timestamp_millis(millis).unwrap();
            let triggers = compute_triggers(
                &task(due, 4),
                &RecurrenceMapping::default(),
                &ReminderConfig::default(),
                now,
            );
            assert!(triggers.is_empty());
        }
    }

    #[test]
    fn test_periodic_rolls_to_tomorrow_after_recap_time() {
        let due = paris(2025, 3, 10, 23, 59);
        let now = paris(2025, 3, 5, 21, 0);

        let triggers = default_triggers(&task(due, 4), now);
        let periodic = triggers.iter().find(|t| t.kind == TriggerKind::Periodic).unwrap();

        assert_eq!(periodic.fire_at, paris(2025, 3, 6, 20, 0));
    }

    #[test]
    fn test_weekly_and_monthly_step_by_fixed_days() {
        let due = paris(2025, 6, 30, 12, 0);
        let now = paris(2025, 3, 5, 21, 0);
        let mut mapping = RecurrenceMapping::default();
        mapping.p1 = Recurrence::Monthly;

        let weekly = compute_triggers(&task(due, 2), &mapping, &ReminderConfig::default(), now);
        let monthly = compute_triggers(&task(due, 0), &mapping, &ReminderConfig::default(), now);

        let periodic_at = |set: &BTreeSet<ScheduledTrigger>| {
            set.iter()
                .find(|t| t.kind == TriggerKind::Periodic)
                .map(|t| t.fire_at)
        };
        assert_eq!(periodic_at(&weekly), Some(paris(2025, 3, 12, 20, 0)));
        assert_eq!(periodic_at(&monthly), Some(paris(2025, 4, 4, 20, 0)));
    }

    #[test]
    fn test_periodic_never_fires_after_due() {
        // Next weekly recap is a week out, task is due in two days
        let due = paris(2025, 3, 7, 12, 0);
        let now = paris(2025, 3, 5, 21, 0);

        let triggers = default_triggers(&task(due, 2), now);

        assert!(triggers.iter().all(|t| t.kind != TriggerKind::Periodic));
    }

    #[test]
    fn test_no_periodic_for_none_band() {
        let due = paris(2025, 3, 10, 23, 59);
        let now = paris(2025, 3, 5, 10, 0);

        let triggers = default_triggers(&task(due, 0), now);

        assert!(triggers.iter().all(|t| t.kind != TriggerKind::Periodic));
    }

    #[test]
    fn test_task_zone_overrides_fallback_zone() {
        let due = paris(2025, 3, 10, 23, 59);
        let now = paris(2025, 3, 5, 10, 0);
        let config = ReminderConfig::default();

        let mapping = RecurrenceMapping::default();
        let in_paris = compute_triggers_in(&task(due, 0), &mapping, &config, now, Tz::Asia__Tokyo);
        let floating = ReminderTask::new("t1", "Essay", due, 0);
        let in_tokyo = compute_triggers_in(&floating, &mapping, &config, now, Tz::Asia__Tokyo);

        let on_day = |set: &BTreeSet<ScheduledTrigger>| {
            set.iter().find(|t| t.kind == TriggerKind::OnDay).map(|t| t.fire_at)
        };
        assert_eq!(on_day(&in_paris), Some(paris(2025, 3, 10, 20, 0)));
        // 23:59 Paris is already 07:59 on the 11th in Tokyo
        assert_eq!(
            on_day(&in_tokyo),
            Some(
                Tz::Asia__Tokyo
                    .with_ymd_and_hms(2025, 3, 11, 20, 0, 0)
                    .unwrap()
                    .with_timezone(&Utc)
            )
        );
    }

    #[test]
    fn test_cancel_all_for_task_covers_every_kind() {
        let keys = cancel_all_for_task("t1");

        assert_eq!(keys.len(), TriggerKind::ALL.len());
        assert!(keys.iter().all(|key| key.task_id == "t1"));
    }

    fn scheduler(now: DateTime<Utc>, config: ReminderConfig) -> ReminderScheduler<FixedClock> {
        ReminderScheduler::new(FixedClock::new(now, PARIS), RecurrenceMapping::default(), config)
    }

    #[test]
    fn test_sync_twice_leaves_one_registration_per_key() {
        let scheduler = scheduler(paris(2025, 3, 5, 10, 0), ReminderConfig::default());
        let task = task(paris(2025, 3, 10, 23, 59), 4);
        let mut port = InMemoryTriggerPort::new();

        let first = scheduler.sync_task(&mut port, &task).unwrap();
        let second = scheduler.sync_task(&mut port, &task).unwrap();

        assert_eq!(first, second);
        assert_eq!(port.len(), first.len());
        for trigger in &first {
            assert_eq!(port.get(&trigger.key()).unwrap().fire_at, trigger.fire_at);
        }
    }

    #[test]
    fn test_sync_cancels_kinds_that_no_longer_apply() {
        let task = task(paris(2025, 3, 10, 23, 59), 4);
        let mut port = InMemoryTriggerPort::new();

        scheduler(paris(2025, 3, 5, 10, 0), ReminderConfig::default())
            .sync_task(&mut port, &task)
            .unwrap();
        assert!(port.get(&TriggerKey::new("t1", TriggerKind::DayBefore)).is_some());

        let without_day_before = ReminderConfig {
            enable_day_before: false,
            ..ReminderConfig::default()
        };
        scheduler(paris(2025, 3, 5, 10, 0), without_day_before)
            .sync_task(&mut port, &task)
            .unwrap();

        assert!(port.get(&TriggerKey::new("t1", TriggerKind::DayBefore)).is_none());
        assert!(port.get(&TriggerKey::new("t1", TriggerKind::OnDay)).is_some());
    }

    #[test]
    fn test_sync_records_removes_completed_tasks() {
        let scheduler = scheduler(paris(2025, 3, 5, 10, 0), ReminderConfig::default());
        let due = paris(2025, 3, 10, 23, 59).timestamp_millis();
        let mut record = TaskRecord {
            id: "t1".to_string(),
            title: "Essay".to_string(),
            priority: 4,
            due_at_millis: Some(due),
            done: false,
            notes: None,
            time_zone: None,
        };
        let mut port = InMemoryTriggerPort::new();

        let scheduled = scheduler.sync_records(&mut port, std::slice::from_ref(&record)).unwrap();
        assert_eq!(scheduled.len(), 4);
        assert!(scheduled.windows(2).all(|pair| pair[0].fire_at <= pair[1].fire_at));

        record.done = true;
        let scheduled = scheduler.sync_records(&mut port, &[record]).unwrap();
        assert!(scheduled.is_empty());
        assert!(port.is_empty());
    }

    #[test]
    fn test_sync_all_orders_by_fire_time() {
        let scheduler = scheduler(paris(2025, 3, 5, 10, 0), ReminderConfig::default());
        let tasks = vec![
            ReminderTask::new("late", "Report", paris(2025, 3, 20, 12, 0), 0),
            ReminderTask::new("soon", "Call", paris(2025, 3, 6, 9, 0), 0),
        ];
        let mut port = InMemoryTriggerPort::new();

        let scheduled = scheduler.sync_all(&mut port, &tasks).unwrap();

        assert_eq!(scheduled.first().map(|t| t.task_id.as_str()), Some("soon"));
        assert_eq!(scheduled.last().map(|t| t.task_id.as_str()), Some("late"));
        assert_eq!(port.len(), scheduled.len());
        assert_eq!(port.for_task("soon").len(), 3);
    }

    #[test]
    fn test_remove_task_clears_only_that_task() {
        let scheduler = scheduler(paris(2025, 3, 5, 10, 0), ReminderConfig::default());
        let tasks = vec![
            ReminderTask::new("a", "Report", paris(2025, 3, 20, 12, 0), 0),
            ReminderTask::new("b", "Call", paris(2025, 3, 6, 9, 0), 0),
        ];
        let mut port = InMemoryTriggerPort::new();
        scheduler.sync_all(&mut port, &tasks).unwrap();

        scheduler.remove_task(&mut port, "a").unwrap();

        assert!(port.for_task("a").is_empty());
        assert!(!port.for_task("b").is_empty());
        assert!(port.upcoming().iter().all(|(key, _)| key.task_id == "b"));
    }

    #[test]
    fn test_payload_message_names_the_kind() {
        let task = task(paris(2025, 3, 10, 23, 59), 4);

        assert_eq!(
            TriggerPayload::for_task(&task, TriggerKind::DayBefore).message(),
            "Reminder (day before): Essay"
        );
        assert_eq!(
            TriggerPayload::for_task(&task, TriggerKind::Periodic).message(),
            "Periodic reminder: Essay"
        );
    }

    #[test]
    fn test_recap_time_drives_fixed_reminders() {
        let config = ReminderConfig {
            recap_time: RecapTime::new(7, 30).unwrap(),
            ..ReminderConfig::default()
        };
        let due = paris(2025, 3, 10, 23, 59);

        let now = paris(2025, 3, 5, 10, 0);

        let triggers = compute_triggers(&task(due, 0), &RecurrenceMapping::default(), &config, now);
        let day_before = triggers.iter().find(|t| t.kind == TriggerKind::DayBefore).unwrap();

        let expected = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap().and_hms_opt(7, 30, 0).unwrap();
        assert_eq!(day_before.fire_at, local_to_utc(expected, &PARIS).unwrap());
    }
}
