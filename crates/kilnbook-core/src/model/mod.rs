pub mod calendar;
pub mod entity;
pub mod goal;
pub mod journal;
pub mod patch;
pub mod portfolio;
pub mod time_entry;

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use calendar::{CalendarEvent, EventCategory, Frequency, RecurrenceRule, StudioTask};
pub use entity::{EntityId, EntityKind, EntityRef};
pub use goal::{Goal, GoalMetric, GoalStatus};
pub use journal::JournalEntry;
pub use patch::{EntityPatch, EventPatch, GoalPatch, JournalPatch, PiecePatch, TimeEntryPatch};
pub use portfolio::{BigQuestions, PhotoHandle, PortfolioPiece};
pub use time_entry::TimeEntry;

use crate::error::CoreError;

/// Kind-specific fields of an entity. The `kind` tag doubles as the envelope discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityBody {
    CalendarEvent(CalendarEvent),
    TimeEntry(TimeEntry),
    Goal(Goal),
    PortfolioPiece(PortfolioPiece),
    JournalEntry(JournalEntry),
}

impl EntityBody {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityBody::CalendarEvent(_) => EntityKind::CalendarEvent,
            EntityBody::TimeEntry(_) => EntityKind::TimeEntry,
            EntityBody::Goal(_) => EntityKind::Goal,
            EntityBody::PortfolioPiece(_) => EntityKind::PortfolioPiece,
            EntityBody::JournalEntry(_) => EntityKind::JournalEntry,
        }
    }

    /// Check every required field, collecting all violations.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut violations = Vec::new();
        match self {
            EntityBody::CalendarEvent(e) => e.validate(&mut violations),
            EntityBody::TimeEntry(t) => t.validate(&mut violations),
            EntityBody::Goal(g) => g.validate(&mut violations),
            EntityBody::PortfolioPiece(p) => p.validate(&mut violations),
            EntityBody::JournalEntry(j) => j.validate(&mut violations),
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation {
                kind: self.kind(),
                violations,
            })
        }
    }

    /// The free-text fields fed to the search index.
    pub fn text_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        match self {
            EntityBody::CalendarEvent(e) => {
                fields.push(&e.title);
                fields.push(e.category.as_str());
                if let Some(task) = &e.task {
                    fields.push(task.label());
                }
                fields.extend(e.location.as_deref());
                fields.extend(e.notes.as_deref());
            }
            EntityBody::TimeEntry(t) => {
                fields.push(t.activity.label());
                fields.push(&t.reflection);
            }
            EntityBody::Goal(g) => {
                fields.push(&g.title);
                fields.push(&g.purpose);
                fields.push(&g.category);
                if let Some(metric) = &g.metric {
                    fields.push(&metric.unit);
                }
            }
            EntityBody::PortfolioPiece(p) => {
                fields.push(&p.title);
                fields.extend(p.clay_body.as_deref());
                fields.extend(p.firing_schedule.as_deref());
                fields.extend(p.glaze.as_deref());
                fields.push(&p.big_questions.who);
                fields.push(&p.big_questions.what);
                fields.push(&p.big_questions.why);
            }
            EntityBody::JournalEntry(j) => {
                fields.extend(j.mood.as_deref());
                fields.push(&j.body);
            }
        }
        fields.retain(|f| !f.is_empty());
        fields
    }

    /// A one-line human label.
    pub fn title(&self) -> String {
        match self {
            EntityBody::CalendarEvent(e) => e.title.clone(),
            EntityBody::Goal(g) => g.title.clone(),
            EntityBody::PortfolioPiece(p) => p.title.clone(),
            EntityBody::TimeEntry(t) => format!("{} on {}", t.activity, t.date),
            EntityBody::JournalEntry(j) => {
                let first = j.body.lines().next().unwrap_or_default();
                let mut label: String = first.chars().take(48).collect();
                if first.chars().count() > 48 {
                    label.push('…');
                }
                format!("{} {label}", j.date)
            }
        }
    }

    /// The calendar date the record is about, if it has one.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            EntityBody::CalendarEvent(e) => Some(e.start.date_naive()),
            EntityBody::TimeEntry(t) => Some(t.date),
            EntityBody::JournalEntry(j) => Some(j.date),
            EntityBody::PortfolioPiece(p) => p.completed_on.or(p.started_on),
            EntityBody::Goal(_) => None,
        }
    }

    /// References held in typed link fields.
    fn field_links(&self) -> Vec<EntityRef> {
        match self {
            EntityBody::TimeEntry(t) => t
                .event
                .iter()
                .map(|id| EntityRef::new(EntityKind::CalendarEvent, id.clone()))
                .collect(),
            EntityBody::Goal(g) => g
                .journal_entries
                .iter()
                .map(|id| EntityRef::new(EntityKind::JournalEntry, id.clone()))
                .collect(),
            EntityBody::JournalEntry(j) => {
                let mut refs = Vec::new();
                if let Some(id) = &j.event {
                    refs.push(EntityRef::new(EntityKind::CalendarEvent, id.clone()));
                }
                if let Some(id) = &j.piece {
                    refs.push(EntityRef::new(EntityKind::PortfolioPiece, id.clone()));
                }
                refs
            }
            EntityBody::CalendarEvent(_) | EntityBody::PortfolioPiece(_) => Vec::new(),
        }
    }

    /// Null any typed link field pointing at `target`. Returns true if anything changed.
    fn detach_field(&mut self, target: &EntityRef) -> bool {
        fn clear(slot: &mut Option<EntityId>, target: &EntityId) -> bool {
            if slot.as_ref() == Some(target) {
                *slot = None;
                true
            } else {
                false
            }
        }

        match (self, target.kind) {
            (EntityBody::TimeEntry(t), EntityKind::CalendarEvent) => clear(&mut t.event, &target.id),
            (EntityBody::JournalEntry(j), EntityKind::CalendarEvent) => {
                clear(&mut j.event, &target.id)
            }
            (EntityBody::JournalEntry(j), EntityKind::PortfolioPiece) => {
                clear(&mut j.piece, &target.id)
            }
            (EntityBody::Goal(g), EntityKind::JournalEntry) => {
                let before = g.journal_entries.len();
                g.journal_entries.retain(|id| id != &target.id);
                g.journal_entries.len() != before
            }
            _ => false,
        }
    }
}

/// One stored record: the common envelope plus kind-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Free-form outgoing links created with `link`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<EntityRef>,
    #[serde(flatten)]
    pub body: EntityBody,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind(), self.id.clone())
    }

    /// Every outgoing reference, from typed fields and the envelope, deduplicated.
    pub fn outgoing_links(&self) -> BTreeSet<EntityRef> {
        let mut refs: BTreeSet<EntityRef> = self.body.field_links().into_iter().collect();
        refs.extend(self.links.iter().cloned());
        refs
    }

    /// Add a free-form link. Returns false if the target is already referenced.
    pub fn attach(&mut self, target: EntityRef) -> bool {
        if self.outgoing_links().contains(&target) {
            return false;
        }
        self.links.push(target);
        true
    }

    /// Remove every reference to `target`, typed or free-form.
    pub fn detach(&mut self, target: &EntityRef) -> bool {
        let before = self.links.len();
        self.links.retain(|r| r != target);
        let removed_free = self.links.len() != before;
        let removed_field = self.body.detach_field(target);
        removed_free || removed_field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn journal_entity() -> Entity {
        let date = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        Entity {
            id: EntityId::from("j1"),
            created_at: Utc.with_ymd_and_hms(2025, 4, 2, 8, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 4, 2, 8, 0, 0).unwrap(),
            links: vec![EntityRef::new(EntityKind::Goal, "g1")],
            body: EntityBody::JournalEntry(
                JournalEntry::new(date, "Bisque load came out clean")
                    .with_mood("hopeful")
                    .about_event(EntityId::from("e1"))
                    .about_piece(EntityId::from("p1")),
            ),
        }
    }

    #[test]
    fn test_entity_json_is_flat_with_kind_tag() {
        let entity = journal_entity();
        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["kind"], "journal_entry");
        assert_eq!(value["id"], "j1");
        assert_eq!(value["body"], "Bisque load came out clean");
        let parsed: Entity = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, entity);
    }

    #[test]
    fn test_outgoing_links_merge_fields_and_envelope() {
        let entity = journal_entity();
        let links = entity.outgoing_links();
        assert_eq!(links.len(), 3);
        assert!(links.contains(&EntityRef::new(EntityKind::CalendarEvent, "e1")));
        assert!(links.contains(&EntityRef::new(EntityKind::PortfolioPiece, "p1")));
        assert!(links.contains(&EntityRef::new(EntityKind::Goal, "g1")));
    }

    #[test]
    fn test_attach_skips_existing_field_link() {
        let mut entity = journal_entity();
        assert!(!entity.attach(EntityRef::new(EntityKind::CalendarEvent, "e1")));
        assert!(entity.attach(EntityRef::new(EntityKind::Goal, "g2")));
        assert_eq!(entity.links.len(), 2);
    }

    #[test]
    fn test_detach_nulls_typed_field() {
        let mut entity = journal_entity();
        assert!(entity.detach(&EntityRef::new(EntityKind::PortfolioPiece, "p1")));
        match &entity.body {
            EntityBody::JournalEntry(j) => {
                assert!(j.piece.is_none());
                assert!(j.event.is_some());
            }
            other => panic!("unexpected body {other:?}"),
        }
        assert!(!entity.detach(&EntityRef::new(EntityKind::PortfolioPiece, "p1")));
    }

    #[test]
    fn test_text_fields_skip_empty() {
        let body = EntityBody::TimeEntry(TimeEntry::new(
            NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            30,
            StudioTask::Glazing,
        ));
        assert_eq!(body.text_fields(), vec!["Glazing"]);
    }

    #[test]
    fn test_journal_title_truncates() {
        let long = "x".repeat(60);
        let body = EntityBody::JournalEntry(JournalEntry::new(
            NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            long,
        ));
        assert!(body.title().ends_with('…'));
        assert!(body.title().starts_with("2025-04-02 "));
    }
}
