use std::collections::{BTreeSet, HashMap};

use kilnbook_core::model::{Entity, EntityRef};
use kilnbook_core::EntityStore;

use super::model::{Link, LinkDirection};

/// Bidirectional cross-reference index.
///
/// `outgoing` mirrors what the entities themselves hold; `incoming` is its
/// inversion and is only ever written through [`set_outgoing`](Self::set_outgoing).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkIndex {
    outgoing: HashMap<EntityRef, BTreeSet<EntityRef>>,
    incoming: HashMap<EntityRef, BTreeSet<EntityRef>>,
}

impl LinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the links every stored entity carries.
    pub fn build(store: &EntityStore) -> Self {
        let mut index = Self::new();
        for entity in store.iter() {
            index.reindex_entity(entity);
        }
        tracing::info!("Indexed links for {} entities", index.outgoing.len());
        index
    }

    pub fn rebuild(&mut self, store: &EntityStore) {
        *self = Self::build(store);
    }

    fn set_outgoing(&mut self, from: &EntityRef, targets: BTreeSet<EntityRef>) {
        let previous = self.outgoing.remove(from).unwrap_or_default();
        for gone in previous.difference(&targets) {
            if let Some(sources) = self.incoming.get_mut(gone) {
                sources.remove(from);
                if sources.is_empty() {
                    self.incoming.remove(gone);
                }
            }
        }
        for added in targets.difference(&previous) {
            self.incoming
                .entry(added.clone())
                .or_default()
                .insert(from.clone());
        }
        if !targets.is_empty() {
            self.outgoing.insert(from.clone(), targets);
        }
    }

    /// Re-read every outgoing reference of one entity.
    pub fn reindex_entity(&mut self, entity: &Entity) {
        self.set_outgoing(&entity.entity_ref(), entity.outgoing_links());
    }

    /// Record `from -> to`. Returns false if it was already present.
    pub fn link(&mut self, from: &EntityRef, to: &EntityRef) -> bool {
        let mut targets = self.outgoing.get(from).cloned().unwrap_or_default();
        if !targets.insert(to.clone()) {
            return false;
        }
        self.set_outgoing(from, targets);
        true
    }

    /// Forget `from -> to`. Returns false if it was not present.
    pub fn unlink(&mut self, from: &EntityRef, to: &EntityRef) -> bool {
        let mut targets = self.outgoing.get(from).cloned().unwrap_or_default();
        if !targets.remove(to) {
            return false;
        }
        self.set_outgoing(from, targets);
        true
    }

    /// Drop every link mentioning `target`, in either direction. Returns the
    /// entities that referenced it, so their stored copies can be detached too.
    pub fn remove_entity(&mut self, target: &EntityRef) -> Vec<EntityRef> {
        self.set_outgoing(target, BTreeSet::new());
        let referrers: Vec<EntityRef> = self.incoming(target);
        for source in &referrers {
            self.unlink(source, target);
        }
        referrers
    }

    pub fn outgoing(&self, from: &EntityRef) -> Vec<EntityRef> {
        self.outgoing
            .get(from)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn incoming(&self, to: &EntityRef) -> Vec<EntityRef> {
        self.incoming
            .get(to)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Both directions: outgoing first, then incoming, each in `(kind, id)` order.
    pub fn links_of(&self, target: &EntityRef) -> Vec<Link> {
        let outgoing = self.outgoing(target).into_iter().map(|other| Link {
            direction: LinkDirection::Outgoing,
            other,
        });
        let incoming = self.incoming(target).into_iter().map(|other| Link {
            direction: LinkDirection::Incoming,
            other,
        });
        outgoing.chain(incoming).collect()
    }

    /// Total number of distinct links.
    pub fn len(&self) -> usize {
        self.outgoing.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kilnbook_core::model::{EntityBody, EntityKind, JournalEntry, PortfolioPiece};

    fn r(kind: EntityKind, id: &str) -> EntityRef {
        EntityRef::new(kind, id)
    }

    #[test]
    fn test_link_is_visible_from_both_sides() {
        let mut index = LinkIndex::new();
        let a = r(EntityKind::Goal, "g1");
        let b = r(EntityKind::JournalEntry, "j1");
        assert!(index.link(&a, &b));
        assert!(!index.link(&a, &b));

        assert_eq!(
            index.links_of(&b),
            vec![Link {
                direction: LinkDirection::Incoming,
                other: a.clone()
            }]
        );
        assert_eq!(index.outgoing(&a), vec![b.clone()]);

        assert!(index.unlink(&a, &b));
        assert!(index.links_of(&b).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_remove_entity_clears_both_directions() {
        let mut index = LinkIndex::new();
        let piece = r(EntityKind::PortfolioPiece, "p1");
        let j1 = r(EntityKind::JournalEntry, "j1");
        let j2 = r(EntityKind::JournalEntry, "j2");
        let goal = r(EntityKind::Goal, "g1");
        index.link(&j1, &piece);
        index.link(&j2, &piece);
        index.link(&piece, &goal);

        let referrers = index.remove_entity(&piece);
        assert_eq!(referrers, vec![j1.clone(), j2.clone()]);
        assert!(index.links_of(&piece).is_empty());
        assert!(index.outgoing(&j1).is_empty());
        assert!(index.incoming(&goal).is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_build_reads_typed_fields() {
        let mut store = EntityStore::new();
        let piece = store
            .create(EntityBody::PortfolioPiece(PortfolioPiece::new("Moon jar")))
            .unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 5, 3).unwrap();
        let journal = store
            .create(EntityBody::JournalEntry(
                JournalEntry::new(day, "Moon jar survived the glaze firing")
                    .about_piece(piece.clone()),
            ))
            .unwrap();

        let index = LinkIndex::build(&store);
        let links = index.links_of(&r(EntityKind::PortfolioPiece, piece.as_str()));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].direction, LinkDirection::Incoming);
        assert_eq!(links[0].other.id, journal);
    }
}
