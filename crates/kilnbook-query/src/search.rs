use kilnbook_core::model::{Entity, EntityRef};
use kilnbook_core::EntityStore;

use crate::error::QueryError;
use crate::index::{rebuild_index, SearchHit, SearchIndex};

/// High-level search engine that manages index lifecycle.
///
/// Nothing is indexed until the first search. Until then incremental updates
/// are skipped, since the first search builds from the store anyway.
#[derive(Debug, Default)]
pub struct SearchEngine {
    index: Option<SearchIndex>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_built(&self) -> bool {
        self.index.is_some()
    }

    /// Ensure the index exists, building it if needed.
    pub fn ensure_index(&mut self, store: &EntityStore) -> &mut SearchIndex {
        self.index.get_or_insert_with(|| rebuild_index(store))
    }

    /// Search every kind by free-text query. A query with no searchable
    /// terms matches nothing.
    pub fn search(
        &mut self,
        store: &EntityStore,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, QueryError> {
        let index = self.ensure_index(store);
        if !index.has_terms(query) {
            tracing::debug!("Query '{query}' has no searchable terms");
            return Ok(Vec::new());
        }
        Ok(index.search(query, limit))
    }

    /// Index a single entity (incremental update).
    pub fn index_entity(&mut self, entity: &Entity) {
        if let Some(index) = self.index.as_mut() {
            index.index_entity(entity);
        }
    }

    pub fn remove_entity(&mut self, target: &EntityRef) {
        if let Some(index) = self.index.as_mut() {
            index.remove_entity(target);
        }
    }

    /// Rebuild the index from scratch.
    pub fn rebuild(&mut self, store: &EntityStore) -> usize {
        self.ensure_index(store).rebuild(store)
    }

    /// Check a built index against the store. An unbuilt index is trivially in sync.
    pub fn verify(&self, store: &EntityStore) -> Result<(), QueryError> {
        match &self.index {
            Some(index) => index.verify(store),
            None => Ok(()),
        }
    }

    /// Drop the index; the next search rebuilds it.
    pub fn invalidate(&mut self) {
        self.index = None;
    }

    pub fn index(&self) -> Option<&SearchIndex> {
        self.index.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kilnbook_core::model::{EntityBody, EntityKind, Goal};

    #[test]
    fn test_index_is_built_on_first_search() {
        let mut store = EntityStore::new();
        store
            .create(EntityBody::Goal(Goal::new("Sell at the holiday market", "")))
            .unwrap();

        let mut engine = SearchEngine::new();
        assert!(!engine.is_built());
        let hits = engine.search(&store, "market", 10).unwrap();
        assert!(engine.is_built());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity.kind, EntityKind::Goal);
    }

    #[test]
    fn test_updates_before_first_search_are_skipped() {
        let mut store = EntityStore::new();
        let id = store
            .create(EntityBody::Goal(Goal::new("Porcelain", "")))
            .unwrap();
        let mut engine = SearchEngine::new();
        engine.index_entity(store.get(EntityKind::Goal, &id).unwrap());
        assert!(!engine.is_built());
        assert_eq!(engine.search(&store, "porcelain", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_query_without_terms_matches_nothing() {
        let mut store = EntityStore::new();
        store
            .create(EntityBody::Goal(Goal::new("Glaze tests", "")))
            .unwrap();
        let mut engine = SearchEngine::new();
        assert!(engine.search(&store, "  !? ", 10).unwrap().is_empty());
        assert!(engine.search(&store, "", 10).unwrap().is_empty());
    }

    #[test]
    fn test_long_words_and_unsegmented_text_are_searchable() {
        let mut store = EntityStore::new();
        store
            .create(EntityBody::Goal(Goal::new(
                "Ash glaze",
                "hydroxyapatiteandwollastonitecombinationglaze",
            )))
            .unwrap();
        store
            .create(EntityBody::Goal(Goal::new("陶芸の釉薬テストを毎週続ける", "")))
            .unwrap();

        let mut engine = SearchEngine::new();
        let hits = engine
            .search(&store, "HydroxyapatiteAndWollastoniteCombinationGlaze", 10)
            .unwrap();
        assert_eq!(hits.len(), 1);
        let hits = engine
            .search(&store, "陶芸の釉薬テストを毎週続ける", 10)
            .unwrap();
        assert_eq!(hits.len(), 1);
    }
}
