use std::str::FromStr;

use chrono::{DateTime, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Which calendar an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Studio,
    Community,
    Public,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Studio => "Studio",
            EventCategory::Community => "Community",
            EventCategory::Public => "Public",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "studio" => Ok(EventCategory::Studio),
            "community" => Ok(EventCategory::Community),
            "public" => Ok(EventCategory::Public),
            _ => Err(CoreError::Parse(format!("unknown event category '{s}'"))),
        }
    }
}

/// The kind of studio work an event or a block of logged time is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudioTask {
    Throwing,
    Trimming,
    Glazing,
    BisqueFiring,
    GlazeFiring,
    Inventory,
    Delivery,
    Workshop,
    Show,
    OpenStudio,
    DropRelease,
    Meeting,
    Other,
}

impl StudioTask {
    pub const ALL: [StudioTask; 13] = [
        StudioTask::Throwing,
        StudioTask::Trimming,
        StudioTask::Glazing,
        StudioTask::BisqueFiring,
        StudioTask::GlazeFiring,
        StudioTask::Inventory,
        StudioTask::Delivery,
        StudioTask::Workshop,
        StudioTask::Show,
        StudioTask::OpenStudio,
        StudioTask::DropRelease,
        StudioTask::Meeting,
        StudioTask::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StudioTask::Throwing => "Throwing",
            StudioTask::Trimming => "Trimming",
            StudioTask::Glazing => "Glazing",
            StudioTask::BisqueFiring => "Bisque Firing",
            StudioTask::GlazeFiring => "Glaze Firing",
            StudioTask::Inventory => "Inventory",
            StudioTask::Delivery => "Delivery",
            StudioTask::Workshop => "Workshop",
            StudioTask::Show => "Show",
            StudioTask::OpenStudio => "Open Studio",
            StudioTask::DropRelease => "Drop Release",
            StudioTask::Meeting => "Meeting",
            StudioTask::Other => "Other",
        }
    }
}

impl std::fmt::Display for StudioTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StudioTask {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        StudioTask::ALL
            .into_iter()
            .find(|t| {
                t.label()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .eq_ignore_ascii_case(&wanted)
            })
            .ok_or_else(|| CoreError::Parse(format!("unknown studio task '{s}'")))
    }
}

/// How often a recurring event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A recurrence rule stored on the event. Occurrences are derived, never stored.
///
/// `until` is inclusive. When both `until` and `count` are set the series stops at
/// whichever bound is reached first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Weekdays for weekly rules. Empty means the anchor's weekday.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weekdays: Vec<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceRule {
    fn with_frequency(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            weekdays: Vec::new(),
            until: None,
            count: None,
        }
    }

    pub fn daily() -> Self {
        Self::with_frequency(Frequency::Daily)
    }

    pub fn weekly() -> Self {
        Self::with_frequency(Frequency::Weekly)
    }

    /// Weekly on specific days.
    pub fn weekly_on(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            weekdays: days.into_iter().collect(),
            ..Self::with_frequency(Frequency::Weekly)
        }
    }

    pub fn monthly() -> Self {
        Self::with_frequency(Frequency::Monthly)
    }

    pub fn yearly() -> Self {
        Self::with_frequency(Frequency::Yearly)
    }

    pub fn every(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn times(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    fn validate(&self, anchor: DateTime<Utc>, violations: &mut Vec<String>) {
        if self.interval == 0 {
            violations.push("recurrence interval must be at least 1".into());
        }
        if self.count == Some(0) {
            violations.push("recurrence count must be at least 1".into());
        }
        if !self.weekdays.is_empty() && self.frequency != Frequency::Weekly {
            violations.push("recurrence weekdays are only allowed on weekly rules".into());
        }
        if let Some(until) = self.until {
            if until < anchor {
                violations.push("recurrence end is before the event start".into());
            }
        }
    }
}

/// A scheduled event on one of the studio calendars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub category: EventCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<StudioTask>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CalendarEvent {
    pub fn new(
        title: impl Into<String>,
        category: EventCategory,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            category,
            task: None,
            start,
            end,
            all_day: false,
            recurrence: None,
            location: None,
            notes: None,
        }
    }

    pub fn with_task(mut self, task: StudioTask) -> Self {
        self.task = Some(task);
        self
    }

    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn all_day_event(mut self) -> Self {
        self.all_day = true;
        self
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub(crate) fn validate(&self, violations: &mut Vec<String>) {
        if self.title.trim().is_empty() {
            violations.push("title is required".into());
        }
        if self.end < self.start {
            violations.push("end is before start".into());
        }
        if let Some(rule) = &self.recurrence {
            rule.validate(self.start, violations);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, h, 0, 0).unwrap()
    }

    #[test]
    fn test_event_serde_roundtrip() {
        let event = CalendarEvent::new("Glaze firing cone 6", EventCategory::Studio, at(9), at(17))
            .with_task(StudioTask::GlazeFiring)
            .with_recurrence(RecurrenceRule::weekly_on([Weekday::Mon, Weekday::Thu]).times(6))
            .with_location("Back kiln shed");
        let json = serde_json::to_string_pretty(&event).unwrap();
        assert!(json.contains("\"glaze_firing\""));
        let parsed: CalendarEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }

    #[test]
    fn test_minimal_event_json_defaults() {
        let json = r#"{
            "title": "Open studio",
            "category": "public",
            "start": "2025-03-03T10:00:00Z",
            "end": "2025-03-03T14:00:00Z"
        }"#;
        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        assert!(!event.all_day);
        assert!(event.recurrence.is_none());
        assert_eq!(event.duration(), Duration::hours(4));
    }

    #[test]
    fn test_rule_interval_defaults_to_one() {
        let rule: RecurrenceRule = serde_json::from_str(r#"{"frequency":"monthly"}"#).unwrap();
        assert_eq!(rule.interval, 1);
    }

    #[test]
    fn test_validation_collects_all_violations() {
        let mut event = CalendarEvent::new("  ", EventCategory::Community, at(12), at(9));
        event.recurrence = Some(RecurrenceRule::monthly().every(0).times(0));
        let mut violations = Vec::new();
        event.validate(&mut violations);
        assert_eq!(violations.len(), 4, "{violations:?}");
    }

    #[test]
    fn test_weekdays_rejected_on_daily_rule() {
        let mut rule = RecurrenceRule::daily();
        rule.weekdays = vec![Weekday::Fri];
        let event = CalendarEvent::new("Trim", EventCategory::Studio, at(9), at(10))
            .with_recurrence(rule);
        let mut violations = Vec::new();
        event.validate(&mut violations);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_task_parse_accepts_labels() {
        assert_eq!("Bisque Firing".parse::<StudioTask>().unwrap(), StudioTask::BisqueFiring);
        assert_eq!("open_studio".parse::<StudioTask>().unwrap(), StudioTask::OpenStudio);
        assert!("raku".parse::<StudioTask>().is_err());
    }
}
