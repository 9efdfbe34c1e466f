use std::collections::BTreeSet;

use kilnbook_core::model::{Entity, EntityRef};

use super::{IndexedDocument, SearchIndex};

impl SearchIndex {
    pub(super) fn tokens_of(&self, entity: &Entity) -> BTreeSet<String> {
        entity
            .body
            .text_fields()
            .into_iter()
            .flat_map(|field| self.tokenizer.tokenize(field))
            .collect()
    }

    /// Re-tokenize one entity and apply the posting delta: postings for tokens
    /// it no longer contains are removed, new ones are added.
    pub fn index_entity(&mut self, entity: &Entity) {
        let target = entity.entity_ref();
        let tokens = self.tokens_of(entity);
        let previous = self.documents.remove(&target);
        let old_tokens = previous.map(|doc| doc.tokens).unwrap_or_default();

        let mut removed = 0;
        for token in old_tokens.difference(&tokens) {
            self.drop_posting(token, &target);
            removed += 1;
        }
        let mut added = 0;
        for token in tokens.difference(&old_tokens) {
            self.postings
                .entry(token.clone())
                .or_default()
                .insert(target.clone());
            added += 1;
        }
        tracing::debug!("Indexed {target}: +{added} -{removed} postings");

        self.documents.insert(
            target,
            IndexedDocument {
                tokens,
                updated_at: entity.updated_at,
            },
        );
    }

    /// Remove every posting for `target`. Returns false if it was not indexed.
    pub fn remove_entity(&mut self, target: &EntityRef) -> bool {
        let Some(doc) = self.documents.remove(target) else {
            return false;
        };
        for token in &doc.tokens {
            self.drop_posting(token, target);
        }
        tracing::debug!("Removed {target} from search index");
        true
    }

    fn drop_posting(&mut self, token: &str, target: &EntityRef) {
        if let Some(refs) = self.postings.get_mut(token) {
            refs.remove(target);
            if refs.is_empty() {
                self.postings.remove(token);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use kilnbook_core::model::{EntityBody, EntityId, PortfolioPiece};

    fn piece(id: &str, title: &str, glaze: &str) -> Entity {
        let at = Utc.with_ymd_and_hms(2025, 2, 1, 10, 0, 0).unwrap();
        let mut piece = PortfolioPiece::new(title);
        piece.glaze = Some(glaze.to_string());
        Entity {
            id: EntityId::from(id),
            created_at: at,
            updated_at: at,
            links: vec![],
            body: EntityBody::PortfolioPiece(piece),
        }
    }

    #[test]
    fn test_reindex_applies_delta() {
        let mut index = SearchIndex::new();
        let mut p = piece("p1", "Tall vase", "Shino");
        index.index_entity(&p);
        assert_eq!(index.term_count(), 3);

        p.body = piece("p1", "Tall vase", "Tenmoku").body;
        index.index_entity(&p);
        assert_eq!(index.document_count(), 1);
        assert!(index.postings("shino").is_empty());
        assert_eq!(index.postings("tenmoku").len(), 1);
        assert_eq!(index.postings("vase").len(), 1);
    }

    #[test]
    fn test_remove_entity_drops_empty_postings() {
        let mut index = SearchIndex::new();
        let p = piece("p1", "Tall vase", "Shino");
        index.index_entity(&p);
        assert!(index.remove_entity(&p.entity_ref()));
        assert_eq!(index.term_count(), 0);
        assert!(!index.remove_entity(&p.entity_ref()));
    }
}
