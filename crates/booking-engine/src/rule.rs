//! Recurring availability rules.
//!
//! A [`Rule`] is a tutor's declaration of recurring availability: a
//! frequency, a validity window, a UTC time of day, a duration, and an
//! optional weekday or month-day refinement. Rules are plain value data;
//! expansion into concrete events lives in [`crate::expander`].

use chrono::{DateTime, NaiveTime, Utc, Weekday as ChronoWeekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Recurrence cadence of a [`Rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

/// Day of the week, Sunday-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub fn to_chrono(self) -> ChronoWeekday {
        match self {
            Weekday::Sunday => ChronoWeekday::Sun,
            Weekday::Monday => ChronoWeekday::Mon,
            Weekday::Tuesday => ChronoWeekday::Tue,
            Weekday::Wednesday => ChronoWeekday::Wed,
            Weekday::Thursday => ChronoWeekday::Thu,
            Weekday::Friday => ChronoWeekday::Fri,
            Weekday::Saturday => ChronoWeekday::Sat,
        }
    }
}

/// Time of day in UTC (hour and minute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    /// Construct a validated time of day.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidRuleDefinition` when the hour or
    /// minute is out of range.
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        let time = TimeOfDay { hour, minute };
        if !time.in_range() {
            return Err(EngineError::InvalidRuleDefinition(format!(
                "invalid time of day {:02}:{:02}",
                hour, minute
            )));
        }
        Ok(time)
    }

    pub fn minutes_from_midnight(&self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }

    pub(crate) fn in_range(&self) -> bool {
        self.hour < 24 && self.minute < 60
    }

    pub(crate) fn as_naive(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

/// A recurring availability declaration.
///
/// `start`/`end` bound the window in which the recurrence is valid; an
/// occurrence is produced only when its start lies in `[start, end)`.
/// The optional `weekdays` set and `monthday` are mutually exclusive
/// refinements — a rule carrying neither recurs every day of its window.
///
/// Rules are logically deleted (`deleted = true`) rather than removed
/// once bookings reference them; `activated` gates whether a rule
/// contributes availability at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: u64,
    pub frequency: Frequency,
    /// Start of the validity window (UTC).
    pub start: DateTime<Utc>,
    /// End of the validity window (UTC, exclusive).
    pub end: DateTime<Utc>,
    /// Time of day each occurrence starts (UTC).
    pub time: TimeOfDay,
    /// Occurrence duration in minutes.
    pub duration: u32,
    /// Optional weekday refinement. Empty means unconstrained.
    #[serde(default)]
    pub weekdays: Vec<Weekday>,
    /// Optional day-of-month refinement (1-31).
    #[serde(default)]
    pub monthday: Option<u8>,
    /// Owning tutor.
    pub owner: u64,
    #[serde(default = "default_activated")]
    pub activated: bool,
    #[serde(default)]
    pub deleted: bool,
}

fn default_activated() -> bool {
    true
}

impl Rule {
    /// Check the rule's structural invariants.
    ///
    /// Callers must reject invalid rules before handing them to the
    /// expansion or conflict operations; those assume validated input.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidRuleDefinition` describing the first
    /// violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.end <= self.start {
            return Err(EngineError::InvalidRuleDefinition(
                "rule window end must be after its start".to_string(),
            ));
        }
        if self.duration == 0 {
            return Err(EngineError::InvalidRuleDefinition(
                "rule duration must be positive".to_string(),
            ));
        }
        // Occurrences of one rule are at least a day apart; bounding the
        // duration to a day keeps expanded events non-overlapping.
        if self.duration > MINUTES_PER_DAY {
            return Err(EngineError::InvalidRuleDefinition(format!(
                "rule duration of {} minutes exceeds one day",
                self.duration
            )));
        }
        if !self.time.in_range() {
            return Err(EngineError::InvalidRuleDefinition(format!(
                "invalid time of day {:02}:{:02}",
                self.time.hour, self.time.minute
            )));
        }
        if let Some(monthday) = self.monthday {
            if !(1..=31).contains(&monthday) {
                return Err(EngineError::InvalidRuleDefinition(format!(
                    "month day {} is out of range",
                    monthday
                )));
            }
            if !self.weekdays.is_empty() {
                return Err(EngineError::InvalidRuleDefinition(
                    "weekday and month-day refinements are mutually exclusive".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// A rule that recurs literally every day: daily cadence with no
    /// weekday or month-day refinement. Conflict detection compares such
    /// rules by time of day alone, skipping expansion.
    pub fn daily_only(&self) -> bool {
        self.frequency == Frequency::Daily && self.weekdays.is_empty() && self.monthday.is_none()
    }

    /// Whether the rule currently contributes availability.
    pub fn is_active(&self) -> bool {
        self.activated && !self.deleted
    }
}
