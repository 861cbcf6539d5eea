//! Time source used by the reminder scheduler.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::timezone::system_zone;

/// Source of the current instant and the user's local zone.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    fn local_zone(&self) -> Tz;
}

/// Wall clock of the machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_zone(&self) -> Tz {
        system_zone()
    }
}

/// A clock frozen at one instant, for previews and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub zone: Tz,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, zone: Tz) -> Self {
        FixedClock { now, zone }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn local_zone(&self) -> Tz {
        self.zone
    }
}
