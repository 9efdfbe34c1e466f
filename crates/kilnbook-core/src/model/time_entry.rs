use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::calendar::StudioTask;
use super::entity::EntityId;

/// A logged block of studio time with a short reflection.
///
/// Entries are claims of time use: two entries may cover the same wall-clock
/// window and both still count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    pub minutes: u32,
    pub activity: StudioTask,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reflection: String,
    /// The calendar event this time was spent on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EntityId>,
}

impl TimeEntry {
    pub fn new(date: NaiveDate, minutes: u32, activity: StudioTask) -> Self {
        Self {
            date,
            start_time: None,
            minutes,
            activity,
            reflection: String::new(),
            event: None,
        }
    }

    pub fn with_reflection(mut self, reflection: impl Into<String>) -> Self {
        self.reflection = reflection.into();
        self
    }

    pub fn starting_at(mut self, time: NaiveTime) -> Self {
        self.start_time = Some(time);
        self
    }

    pub fn for_event(mut self, event: EntityId) -> Self {
        self.event = Some(event);
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.minutes))
    }

    pub(crate) fn validate(&self, violations: &mut Vec<String>) {
        if self.minutes == 0 {
            violations.push("duration must be greater than zero".into());
        }
        if self.minutes > 24 * 60 {
            violations.push("duration cannot exceed one day".into());
        }
    }
}
