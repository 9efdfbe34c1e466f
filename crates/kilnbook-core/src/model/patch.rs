//! Whole-field updates. A `None` field is left untouched; for nullable fields
//! `Some(None)` clears the value.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer};

use super::calendar::{EventCategory, RecurrenceRule, StudioTask};
use super::entity::{EntityId, EntityKind};
use super::goal::{GoalMetric, GoalStatus};
use super::portfolio::{BigQuestions, PhotoHandle};
use super::{CalendarEvent, EntityBody, Goal, JournalEntry, PortfolioPiece, TimeEntry};
use crate::error::CoreError;

/// Distinguishes an explicit `null` (clear) from an absent key (keep).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn set<T>(slot: &mut T, value: &Option<T>)
where
    T: Clone,
{
    if let Some(v) = value {
        *slot = v.clone();
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventPatch {
    pub title: Option<String>,
    pub category: Option<EventCategory>,
    #[serde(deserialize_with = "double_option")]
    pub task: Option<Option<StudioTask>>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
    #[serde(deserialize_with = "double_option")]
    pub recurrence: Option<Option<RecurrenceRule>>,
    #[serde(deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl EventPatch {
    pub fn apply_to(&self, event: &mut CalendarEvent) {
        set(&mut event.title, &self.title);
        set(&mut event.category, &self.category);
        set(&mut event.task, &self.task);
        set(&mut event.start, &self.start);
        set(&mut event.end, &self.end);
        set(&mut event.all_day, &self.all_day);
        set(&mut event.recurrence, &self.recurrence);
        set(&mut event.location, &self.location);
        set(&mut event.notes, &self.notes);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeEntryPatch {
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "double_option")]
    pub start_time: Option<Option<NaiveTime>>,
    pub minutes: Option<u32>,
    pub activity: Option<StudioTask>,
    pub reflection: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub event: Option<Option<EntityId>>,
}

impl TimeEntryPatch {
    pub fn apply_to(&self, entry: &mut TimeEntry) {
        set(&mut entry.date, &self.date);
        set(&mut entry.start_time, &self.start_time);
        set(&mut entry.minutes, &self.minutes);
        set(&mut entry.activity, &self.activity);
        set(&mut entry.reflection, &self.reflection);
        set(&mut entry.event, &self.event);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub purpose: Option<String>,
    pub category: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub metric: Option<Option<GoalMetric>>,
    pub status: Option<GoalStatus>,
    pub journal_entries: Option<Vec<EntityId>>,
}

impl GoalPatch {
    pub fn apply_to(&self, goal: &mut Goal) {
        set(&mut goal.title, &self.title);
        set(&mut goal.purpose, &self.purpose);
        set(&mut goal.category, &self.category);
        set(&mut goal.metric, &self.metric);
        set(&mut goal.status, &self.status);
        set(&mut goal.journal_entries, &self.journal_entries);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PiecePatch {
    pub title: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub clay_body: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub firing_schedule: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub glaze: Option<Option<String>>,
    pub big_questions: Option<BigQuestions>,
    #[serde(deserialize_with = "double_option")]
    pub success_rating: Option<Option<u8>>,
    #[serde(deserialize_with = "double_option")]
    pub photo: Option<Option<PhotoHandle>>,
    #[serde(deserialize_with = "double_option")]
    pub started_on: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "double_option")]
    pub completed_on: Option<Option<NaiveDate>>,
}

impl PiecePatch {
    pub fn apply_to(&self, piece: &mut PortfolioPiece) {
        set(&mut piece.title, &self.title);
        set(&mut piece.clay_body, &self.clay_body);
        set(&mut piece.firing_schedule, &self.firing_schedule);
        set(&mut piece.glaze, &self.glaze);
        set(&mut piece.big_questions, &self.big_questions);
        set(&mut piece.success_rating, &self.success_rating);
        set(&mut piece.photo, &self.photo);
        set(&mut piece.started_on, &self.started_on);
        set(&mut piece.completed_on, &self.completed_on);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JournalPatch {
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "double_option")]
    pub mood: Option<Option<String>>,
    pub body: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub event: Option<Option<EntityId>>,
    #[serde(deserialize_with = "double_option")]
    pub piece: Option<Option<EntityId>>,
}

impl JournalPatch {
    pub fn apply_to(&self, entry: &mut JournalEntry) {
        set(&mut entry.date, &self.date);
        set(&mut entry.mood, &self.mood);
        set(&mut entry.body, &self.body);
        set(&mut entry.event, &self.event);
        set(&mut entry.piece, &self.piece);
    }
}

/// A field-by-field update addressed at one entity kind.
#[derive(Debug, Clone)]
pub enum EntityPatch {
    CalendarEvent(EventPatch),
    TimeEntry(TimeEntryPatch),
    Goal(GoalPatch),
    PortfolioPiece(PiecePatch),
    JournalEntry(JournalPatch),
}

impl EntityPatch {
    /// Parse a JSON object of supplied fields for the given kind.
    pub fn from_json(kind: EntityKind, value: serde_json::Value) -> Result<Self, CoreError> {
        Ok(match kind {
            EntityKind::CalendarEvent => EntityPatch::CalendarEvent(serde_json::from_value(value)?),
            EntityKind::TimeEntry => EntityPatch::TimeEntry(serde_json::from_value(value)?),
            EntityKind::Goal => EntityPatch::Goal(serde_json::from_value(value)?),
            EntityKind::PortfolioPiece => {
                EntityPatch::PortfolioPiece(serde_json::from_value(value)?)
            }
            EntityKind::JournalEntry => EntityPatch::JournalEntry(serde_json::from_value(value)?),
        })
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            EntityPatch::CalendarEvent(_) => EntityKind::CalendarEvent,
            EntityPatch::TimeEntry(_) => EntityKind::TimeEntry,
            EntityPatch::Goal(_) => EntityKind::Goal,
            EntityPatch::PortfolioPiece(_) => EntityKind::PortfolioPiece,
            EntityPatch::JournalEntry(_) => EntityKind::JournalEntry,
        }
    }

    /// Merge the supplied fields over `body`. Fails if the kinds differ.
    pub fn apply(&self, body: &mut EntityBody) -> Result<(), CoreError> {
        match (self, body) {
            (EntityPatch::CalendarEvent(p), EntityBody::CalendarEvent(e)) => p.apply_to(e),
            (EntityPatch::TimeEntry(p), EntityBody::TimeEntry(t)) => p.apply_to(t),
            (EntityPatch::Goal(p), EntityBody::Goal(g)) => p.apply_to(g),
            (EntityPatch::PortfolioPiece(p), EntityBody::PortfolioPiece(pc)) => p.apply_to(pc),
            (EntityPatch::JournalEntry(p), EntityBody::JournalEntry(j)) => p.apply_to(j),
            (patch, body) => {
                return Err(CoreError::Validation {
                    kind: body.kind(),
                    violations: vec![format!(
                        "cannot apply a {} update to a {}",
                        patch.kind(),
                        body.kind()
                    )],
                })
            }
        }
        Ok(())
    }
}
