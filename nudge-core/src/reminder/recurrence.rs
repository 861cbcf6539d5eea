//! Priority-driven recurrence cadence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::task::PriorityBand;

/// How often a periodic reminder repeats until the task is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    /// Fixed 30-day period, not calendar months
    Monthly,
}

impl Recurrence {
    /// Length of one cadence step in days, `None` when there is no cadence.
    pub fn period_days(self) -> Option<u64> {
        match self {
            Recurrence::None => None,
            Recurrence::Daily => Some(1),
            Recurrence::Weekly => Some(7),
            Recurrence::Monthly => Some(30),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Recurrence::None),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            other => Err(format!(
                "Unknown recurrence '{}'. Expected none, daily, weekly or monthly",
                other
            )),
        }
    }
}

/// Recurrence for each priority band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceMapping {
    pub p1: Recurrence,
    pub p2: Recurrence,
    pub p3: Recurrence,
    pub p4: Recurrence,
}

impl Default for RecurrenceMapping {
    /// P4 daily, P3 weekly, P2 monthly, P1 none
    fn default() -> Self {
        RecurrenceMapping {
            p1: Recurrence::None,
            p2: Recurrence::Monthly,
            p3: Recurrence::Weekly,
            p4: Recurrence::Daily,
        }
    }
}

impl RecurrenceMapping {
    pub fn for_band(&self, band: PriorityBand) -> Recurrence {
        match band {
            PriorityBand::P1 => self.p1,
            PriorityBand::P2 => self.p2,
            PriorityBand::P3 => self.p3,
            PriorityBand::P4 => self.p4,
        }
    }

    /// Recurrence for a raw task priority, see [`PriorityBand::from_priority`].
    pub fn for_priority(&self, priority: i64) -> Recurrence {
        self.for_band(PriorityBand::from_priority(priority))
    }

    pub fn set(&mut self, band: PriorityBand, recurrence: Recurrence) {
        match band {
            PriorityBand::P1 => self.p1 = recurrence,
            PriorityBand::P2 => self.p2 = recurrence,
            PriorityBand::P3 => self.p3 = recurrence,
            PriorityBand::P4 => self.p4 = recurrence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let mapping = RecurrenceMapping::default();

        assert_eq!(mapping.for_priority(4), Recurrence::Daily);
        assert_eq!(mapping.for_priority(2), Recurrence::Weekly);
        assert_eq!(mapping.for_priority(1), Recurrence::Monthly);
        assert_eq!(mapping.for_priority(0), Recurrence::None);
    }

    #[test]
    fn test_set_overrides_one_band() {
        let mut mapping = RecurrenceMapping::default();
        mapping.set(PriorityBand::P1, Recurrence::Weekly);

        assert_eq!(mapping.for_band(PriorityBand::P1), Recurrence::Weekly);
        assert_eq!(mapping.for_band(PriorityBand::P4), Recurrence::Daily);
    }

    #[test]
    fn test_recurrence_from_str() {
        assert_eq!("Weekly".parse::<Recurrence>(), Ok(Recurrence::Weekly));
        assert_eq!(" none ".parse::<Recurrence>(), Ok(Recurrence::None));
        assert!("fortnightly".parse::<Recurrence>().is_err());
    }

    #[test]
    fn test_monthly_is_thirty_days() {
        assert_eq!(Recurrence::Monthly.period_days(), Some(30));
        assert_eq!(Recurrence::None.period_days(), None);
    }
}
