use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kilnbook_core::model::{Entity, EntityKind, EntityRef};
use kilnbook_core::EntityStore;

use crate::error::QueryError;
use crate::links::{LinkDirection, LinkIndex};

pub const EXPORT_FORMAT_VERSION: u32 = 1;

/// A link with the other side's title filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLink {
    pub direction: LinkDirection,
    pub entity: EntityRef,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedEntity {
    pub title: String,
    pub entity: Entity,
    #[serde(default)]
    pub links: Vec<ResolvedLink>,
}

/// Read-only snapshot of the whole store, one collection per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub format_version: u32,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub calendar_events: Vec<ExportedEntity>,
    #[serde(default)]
    pub time_entries: Vec<ExportedEntity>,
    #[serde(default)]
    pub goals: Vec<ExportedEntity>,
    #[serde(default)]
    pub portfolio_pieces: Vec<ExportedEntity>,
    #[serde(default)]
    pub journal_entries: Vec<ExportedEntity>,
}

impl ExportDocument {
    /// Snapshot `store`. Links whose other side no longer exists are left out.
    pub fn build(store: &EntityStore, links: &LinkIndex, exported_at: DateTime<Utc>) -> Self {
        let mut doc = Self {
            format_version: EXPORT_FORMAT_VERSION,
            exported_at,
            calendar_events: Vec::new(),
            time_entries: Vec::new(),
            goals: Vec::new(),
            portfolio_pieces: Vec::new(),
            journal_entries: Vec::new(),
        };

        for kind in EntityKind::ALL {
            let mut records = store.records(kind);
            records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
            let exported = records
                .into_iter()
                .map(|entity| ExportedEntity {
                    title: entity.body.title(),
                    links: resolve_links(store, links, &entity.entity_ref()),
                    entity: entity.clone(),
                })
                .collect();
            *doc.collection_mut(kind) = exported;
        }
        doc
    }

    fn collection_mut(&mut self, kind: EntityKind) -> &mut Vec<ExportedEntity> {
        match kind {
            EntityKind::CalendarEvent => &mut self.calendar_events,
            EntityKind::TimeEntry => &mut self.time_entries,
            EntityKind::Goal => &mut self.goals,
            EntityKind::PortfolioPiece => &mut self.portfolio_pieces,
            EntityKind::JournalEntry => &mut self.journal_entries,
        }
    }

    pub fn collection(&self, kind: EntityKind) -> &[ExportedEntity] {
        match kind {
            EntityKind::CalendarEvent => &self.calendar_events,
            EntityKind::TimeEntry => &self.time_entries,
            EntityKind::Goal => &self.goals,
            EntityKind::PortfolioPiece => &self.portfolio_pieces,
            EntityKind::JournalEntry => &self.journal_entries,
        }
    }

    /// Every exported entity, collection by collection.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        EntityKind::ALL
            .into_iter()
            .flat_map(move |kind| self.collection(kind).iter().map(|e| &e.entity))
    }

    pub fn len(&self) -> usize {
        EntityKind::ALL
            .into_iter()
            .map(|kind| self.collection(kind).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> Result<String, QueryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an export, rejecting formats newer than this build understands.
    pub fn from_json(raw: &str) -> Result<Self, QueryError> {
        let doc: Self = serde_json::from_str(raw)?;
        if doc.format_version > EXPORT_FORMAT_VERSION {
            return Err(QueryError::UnsupportedFormat(doc.format_version));
        }
        Ok(doc)
    }
}

/// Both directions of `target`'s links with titles, skipping dangling ones.
pub fn resolve_links(store: &EntityStore, links: &LinkIndex, target: &EntityRef) -> Vec<ResolvedLink> {
    links
        .links_of(target)
        .into_iter()
        .filter_map(|link| match store.get_ref(&link.other) {
            Ok(other) => Some(ResolvedLink {
                direction: link.direction,
                entity: link.other,
                title: other.body.title(),
            }),
            Err(_) => {
                tracing::warn!("Dropping dangling link {target} {} {}", link.direction, link.other);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use kilnbook_core::model::{EntityBody, JournalEntry, PortfolioPiece};

    #[test]
    fn test_export_resolves_links_and_titles() {
        let mut store = EntityStore::new();
        let piece = store
            .create(EntityBody::PortfolioPiece(PortfolioPiece::new("Ash-glazed bowl")))
            .unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        store
            .create(EntityBody::JournalEntry(
                JournalEntry::new(day, "Unloaded the wood kiln").about_piece(piece.clone()),
            ))
            .unwrap();
        let links = LinkIndex::build(&store);
        let at = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();

        let doc = ExportDocument::build(&store, &links, at);
        assert_eq!(doc.format_version, EXPORT_FORMAT_VERSION);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.portfolio_pieces[0].title, "Ash-glazed bowl");
        let back = &doc.portfolio_pieces[0].links;
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].direction, LinkDirection::Incoming);
        assert_eq!(back[0].title, "2025-06-01 Unloaded the wood kiln");

        let parsed = ExportDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_dangling_links_are_dropped() {
        let mut store = EntityStore::new();
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let journal = store
            .create(EntityBody::JournalEntry(
                JournalEntry::new(day, "Notes").about_piece("gone".into()),
            ))
            .unwrap();
        let links = LinkIndex::build(&store);
        let target = EntityRef::new(EntityKind::JournalEntry, journal);
        assert_eq!(links.outgoing(&target).len(), 1);
        assert!(resolve_links(&store, &links, &target).is_empty());
    }

    #[test]
    fn test_newer_format_is_rejected() {
        let raw = r#"{"format_version": 99, "exported_at": "2025-06-02T08:00:00Z"}"#;
        assert!(matches!(
            ExportDocument::from_json(raw),
            Err(QueryError::UnsupportedFormat(99))
        ));
    }
}
