use kilnbook_core::EntityStore;

use super::SearchIndex;
use crate::error::QueryError;

/// Build a fresh index from every record in the store.
pub fn rebuild_index(store: &EntityStore) -> SearchIndex {
    let mut index = SearchIndex::new();
    let mut count = 0;
    for entity in store.iter() {
        index.index_entity(entity);
        count += 1;
    }
    tracing::info!("Indexed {count} entities");
    index
}

impl SearchIndex {
    /// Replace the contents of this index with a fresh build. Returns the
    /// number of indexed entities.
    pub fn rebuild(&mut self, store: &EntityStore) -> usize {
        *self = rebuild_index(store);
        self.document_count()
    }

    /// Compare the index against the store, reporting the first mismatch.
    pub fn verify(&self, store: &EntityStore) -> Result<(), QueryError> {
        if self.document_count() != store.len() {
            return Err(QueryError::IndexCorruption(format!(
                "{} indexed entities but {} stored",
                self.document_count(),
                store.len()
            )));
        }
        for entity in store.iter() {
            let target = entity.entity_ref();
            let Some(doc) = self.documents.get(&target) else {
                return Err(QueryError::IndexCorruption(format!("{target} is not indexed")));
            };
            if doc.updated_at != entity.updated_at || doc.tokens != self.tokens_of(entity) {
                return Err(QueryError::IndexCorruption(format!("{target} is stale")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kilnbook_core::model::{EntityBody, EntityKind, EntityPatch, Goal};

    #[test]
    fn test_rebuild_matches_incremental() {
        let mut store = EntityStore::new();
        let mut incremental = SearchIndex::new();
        for title in ["Throw fifty mugs", "Enter the spring show", "Fix the kiln"] {
            let id = store
                .create(EntityBody::Goal(Goal::new(title, "practice")))
                .unwrap();
            incremental.index_entity(store.get(EntityKind::Goal, &id).unwrap());
        }
        assert_eq!(rebuild_index(&store), incremental);
        assert!(incremental.verify(&store).is_ok());
    }

    #[test]
    fn test_verify_detects_out_of_band_change() {
        let mut store = EntityStore::new();
        let id = store
            .create(EntityBody::Goal(Goal::new("Fix the kiln", "")))
            .unwrap();
        let mut index = rebuild_index(&store);

        let patch = EntityPatch::from_json(
            EntityKind::Goal,
            serde_json::json!({ "title": "Replace kiln elements" }),
        )
        .unwrap();
        store.update(EntityKind::Goal, &id, &patch).unwrap();

        assert!(matches!(
            index.verify(&store),
            Err(QueryError::IndexCorruption(_))
        ));
        assert_eq!(index.rebuild(&store), 1);
        assert!(index.verify(&store).is_ok());
        assert_eq!(index.search("elements", 5).len(), 1);
    }
}
