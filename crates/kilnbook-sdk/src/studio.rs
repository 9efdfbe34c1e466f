use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use kilnbook_core::model::{Entity, EntityBody, EntityId, EntityKind, EntityPatch, EntityRef};
use kilnbook_core::{
    ChangeEvent, ChangeFeed, ChangeListener, Clock, CoreError, EntityStore, JsonStorage,
    ListFilter, ListenerId, StudioConfig, SystemClock,
};
use kilnbook_query::export::resolve_links;
use kilnbook_query::{
    ExportDocument, LinkIndex, QueryError, ResolvedLink, SearchEngine, SearchHit, SearchIndex,
};

use crate::error::StudioError;

/// Outcome of [`Studio::import`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    /// Records whose id already existed.
    pub skipped: usize,
    /// Records that failed validation.
    pub rejected: usize,
}

/// Parse kind-specific fields given as a JSON object.
pub fn parse_body(kind: EntityKind, mut value: Value) -> Result<EntityBody, CoreError> {
    let Value::Object(fields) = &mut value else {
        return Err(CoreError::Parse(format!("expected a JSON object for {kind}")));
    };
    fields.insert("kind".to_string(), Value::String(kind.as_str().to_string()));
    Ok(serde_json::from_value(value)?)
}

/// The application context: entity store, derived indices, change feed and
/// (optionally) a data directory, wired together.
///
/// Every write goes store first, then indices, then the change feed, then a
/// durable flush of the collections it touched.
pub struct Studio {
    storage: Option<JsonStorage>,
    config: StudioConfig,
    store: EntityStore,
    links: LinkIndex,
    search: SearchEngine,
    feed: ChangeFeed,
}

impl Studio {
    /// Open an initialized data directory.
    pub fn open(data_dir: &Path) -> Result<Self, StudioError> {
        Self::open_with_clock(data_dir, Arc::new(SystemClock))
    }

    pub fn open_with_clock(data_dir: &Path, clock: Arc<dyn Clock>) -> Result<Self, StudioError> {
        let storage = JsonStorage::open(data_dir)?;
        let config = storage.config()?;
        let mut store = EntityStore::with_clock(clock);

        let mut loaded = 0;
        let mut rejected: BTreeMap<EntityKind, Vec<Value>> = BTreeMap::new();
        for entity in storage.load_all()? {
            let target = entity.entity_ref();
            let record = serde_json::to_value(&entity).map_err(CoreError::from)?;
            match store.insert_existing(entity) {
                Ok(true) => {
                    loaded += 1;
                    continue;
                }
                Ok(false) => tracing::warn!("Rejecting duplicate record {target}"),
                Err(e) => tracing::warn!("Rejecting invalid record {target}: {e}"),
            }
            rejected.entry(target.kind).or_default().push(record);
        }
        for (kind, records) in rejected {
            storage.quarantine(kind, records)?;
        }
        let links = LinkIndex::build(&store);
        tracing::info!("Opened {} ({loaded} entities)", data_dir.display());

        Ok(Self {
            storage: Some(storage),
            config,
            store,
            links,
            search: SearchEngine::new(),
            feed: ChangeFeed::new(),
        })
    }

    /// Initialize `data_dir` (see [`JsonStorage::init`]) and open it.
    pub fn init(data_dir: &Path, force: bool) -> Result<Self, StudioError> {
        JsonStorage::init(data_dir, force)?;
        Self::open(data_dir)
    }

    /// A studio that never touches disk.
    pub fn in_memory() -> Self {
        Self::in_memory_with_clock(Arc::new(SystemClock))
    }

    pub fn in_memory_with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            storage: None,
            config: StudioConfig::default_init(),
            store: EntityStore::with_clock(clock),
            links: LinkIndex::new(),
            search: SearchEngine::new(),
            feed: ChangeFeed::new(),
        }
    }

    pub fn with_config(mut self, config: StudioConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.storage.as_ref().map(JsonStorage::root)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.store.now()
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Direct access to the store, bypassing indices, the feed and persistence.
    /// Call [`rebuild_indices`](Self::rebuild_indices) afterwards.
    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn search_index(&self) -> Option<&SearchIndex> {
        self.search.index()
    }

    pub fn link_index(&self) -> &LinkIndex {
        &self.links
    }

    // ---------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------

    fn flush(&self, kinds: impl IntoIterator<Item = EntityKind>) -> Result<(), StudioError> {
        if !self.config.flush_on_write {
            return Ok(());
        }
        self.persist(kinds)
    }

    fn persist(&self, kinds: impl IntoIterator<Item = EntityKind>) -> Result<(), StudioError> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        let kinds: BTreeSet<EntityKind> = kinds.into_iter().collect();
        for kind in kinds {
            storage.save_collection(kind, &self.store.records(kind))?;
        }
        Ok(())
    }

    /// Write every collection, regardless of `flush_on_write`.
    pub fn flush_all(&self) -> Result<(), StudioError> {
        self.persist(EntityKind::ALL)
    }

    // ---------------------------------------------------------------
    // Entities
    // ---------------------------------------------------------------

    fn warn_dangling(&self, entity: &Entity) {
        let from = entity.entity_ref();
        for to in entity.outgoing_links() {
            if !self.store.contains(&to) {
                let err = CoreError::DanglingReference {
                    from: from.clone(),
                    to,
                };
                tracing::warn!("{err}");
            }
        }
    }

    fn reindex(&mut self, target: &EntityRef) -> Result<(), StudioError> {
        let entity = self.store.get_ref(target)?;
        self.links.reindex_entity(entity);
        self.search.index_entity(entity);
        Ok(())
    }

    pub fn create(&mut self, body: EntityBody) -> Result<EntityId, StudioError> {
        let kind = body.kind();
        let id = self.store.create(body)?;
        let target = EntityRef::new(kind, id.clone());
        self.warn_dangling(self.store.get_ref(&target)?);
        self.reindex(&target)?;
        tracing::debug!("Created {target}");
        self.feed.publish(ChangeEvent::Created { entity: target });
        self.flush([kind])?;
        Ok(id)
    }

    /// Create from a JSON object of kind-specific fields.
    pub fn create_json(&mut self, kind: EntityKind, fields: Value) -> Result<EntityId, StudioError> {
        let body = parse_body(kind, fields)?;
        self.create(body)
    }

    pub fn get(&self, kind: EntityKind, id: &EntityId) -> Result<&Entity, StudioError> {
        Ok(self.store.get(kind, id)?)
    }

    pub fn list(&self, kind: EntityKind, filter: &ListFilter) -> Vec<&Entity> {
        self.store.list(kind, filter)
    }

    /// Resolve a full id or a unique prefix.
    pub fn resolve(&self, kind: EntityKind, id_or_prefix: &str) -> Result<EntityId, StudioError> {
        Ok(self.store.resolve(kind, id_or_prefix)?)
    }

    /// Resolve `kind:id-or-prefix`.
    pub fn resolve_ref(&self, reference: &str) -> Result<EntityRef, StudioError> {
        let (kind, prefix) = reference.split_once(':').ok_or_else(|| {
            CoreError::Parse(format!("expected kind:id, got '{reference}'"))
        })?;
        let kind: EntityKind = kind.parse()?;
        let id = self.resolve(kind, prefix)?;
        Ok(EntityRef::new(kind, id))
    }

    pub fn update(
        &mut self,
        kind: EntityKind,
        id: &EntityId,
        patch: &EntityPatch,
    ) -> Result<Entity, StudioError> {
        let updated = self.store.update(kind, id, patch)?;
        self.after_update(&updated)?;
        Ok(updated)
    }

    pub fn update_json(
        &mut self,
        kind: EntityKind,
        id: &EntityId,
        fields: Value,
    ) -> Result<Entity, StudioError> {
        let patch = EntityPatch::from_json(kind, fields)?;
        self.update(kind, id, &patch)
    }

    /// Update only if the record's `updated_at` still equals `expected_updated_at`.
    pub fn update_if_unmodified(
        &mut self,
        kind: EntityKind,
        id: &EntityId,
        expected_updated_at: DateTime<Utc>,
        patch: &EntityPatch,
    ) -> Result<Entity, StudioError> {
        let updated = self
            .store
            .update_if_unmodified(kind, id, expected_updated_at, patch)?;
        self.after_update(&updated)?;
        Ok(updated)
    }

    fn after_update(&mut self, entity: &Entity) -> Result<(), StudioError> {
        self.warn_dangling(entity);
        self.links.reindex_entity(entity);
        self.search.index_entity(entity);
        tracing::debug!("Updated {}", entity.entity_ref());
        self.feed.publish(ChangeEvent::Updated {
            entity: entity.entity_ref(),
        });
        self.flush([entity.kind()])
    }

    /// Delete an entity. Links to it are removed from both indices and typed
    /// link fields pointing at it are nulled in the referring records.
    ///
    /// The cascade runs even when the entity is already gone, so stale index
    /// entries are cleaned up before `NotFound` is reported.
    pub fn delete(&mut self, kind: EntityKind, id: &EntityId) -> Result<Entity, StudioError> {
        let target = EntityRef::new(kind, id.clone());
        let removed = self.store.delete(kind, id);
        self.search.remove_entity(&target);

        let mut touched = BTreeSet::new();
        for source in self.links.remove_entity(&target) {
            match self.store.detach(&source, &target) {
                Ok(true) => {
                    self.reindex(&source)?;
                    touched.insert(source.kind);
                    self.feed.publish(ChangeEvent::Updated { entity: source });
                }
                Ok(false) => {}
                Err(e) => tracing::warn!("Could not detach {source} from {target}: {e}"),
            }
        }

        let removed = match removed {
            Ok(entity) => entity,
            Err(e) => {
                self.flush(touched)?;
                return Err(e.into());
            }
        };
        touched.insert(kind);
        tracing::debug!("Deleted {target}");
        self.feed.publish(ChangeEvent::Deleted { entity: target });
        self.flush(touched)?;
        Ok(removed)
    }

    // ---------------------------------------------------------------
    // Cross-references
    // ---------------------------------------------------------------

    /// Link `from` to `to`. Returns false if the link already existed.
    pub fn link(&mut self, from: &EntityRef, to: &EntityRef) -> Result<bool, StudioError> {
        if from == to {
            return Err(CoreError::Validation {
                kind: from.kind,
                violations: vec!["an entity cannot link to itself".to_string()],
            }
            .into());
        }
        if !self.store.contains(to) {
            return Err(CoreError::not_found(to).into());
        }
        let changed = self.store.attach(from, to)?;
        if changed {
            self.reindex(from)?;
            self.feed.publish(ChangeEvent::Linked {
                from: from.clone(),
                to: to.clone(),
            });
            self.flush([from.kind])?;
        }
        Ok(changed)
    }

    /// Remove `from -> to`, whether free-form or held in a typed field.
    pub fn unlink(&mut self, from: &EntityRef, to: &EntityRef) -> Result<bool, StudioError> {
        let changed = self.store.detach(from, to)?;
        if changed {
            self.reindex(from)?;
            self.feed.publish(ChangeEvent::Unlinked {
                from: from.clone(),
                to: to.clone(),
            });
            self.flush([from.kind])?;
        }
        Ok(changed)
    }

    /// Links in both directions with titles. References to missing entities
    /// are treated as absent.
    pub fn links_of(&self, target: &EntityRef) -> Result<Vec<ResolvedLink>, StudioError> {
        self.store.get_ref(target)?;
        Ok(resolve_links(&self.store, &self.links, target))
    }

    // ---------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------

    /// Free-text search. `limit` defaults to the configured search limit.
    ///
    /// A hit that disagrees with the store means the index went stale; it is
    /// rebuilt and the query rerun.
    pub fn search(&mut self, query: &str, limit: Option<usize>) -> Result<Vec<SearchHit>, StudioError> {
        let limit = limit.unwrap_or(self.config.default_search_limit);
        let hits = self.search.search(&self.store, query, limit)?;
        if let Some(stale) = hits.iter().find(|hit| !self.is_current(hit)) {
            tracing::warn!("Search index is stale at {}; rebuilding", stale.entity);
            self.search.rebuild(&self.store);
            return Ok(self.search.search(&self.store, query, limit)?);
        }
        Ok(hits)
    }

    fn is_current(&self, hit: &SearchHit) -> bool {
        self.store
            .get_ref(&hit.entity)
            .is_ok_and(|entity| entity.updated_at == hit.updated_at)
    }

    /// Rebuild both indices from the store. Returns the number of entities indexed.
    pub fn rebuild_indices(&mut self) -> usize {
        let count = self.search.rebuild(&self.store);
        self.links.rebuild(&self.store);
        tracing::info!("Rebuilt indices over {count} entities");
        self.feed.publish(ChangeEvent::Rebuilt);
        count
    }

    /// Check both indices against the store.
    pub fn verify_indices(&self) -> Result<(), StudioError> {
        self.search.verify(&self.store)?;
        if LinkIndex::build(&self.store) != self.links {
            return Err(QueryError::IndexCorruption(
                "cross-reference index differs from stored links".to_string(),
            )
            .into());
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Export / import
    // ---------------------------------------------------------------

    pub fn export(&self) -> ExportDocument {
        ExportDocument::build(&self.store, &self.links, self.store.now())
    }

    pub fn export_to(&self, path: &Path) -> Result<(), StudioError> {
        let json = self.export().to_json()?;
        std::fs::write(path, json).map_err(|source| StudioError::File {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Insert exported entities whose ids are not present yet, keeping their
    /// ids and timestamps, then rebuild both indices.
    pub fn import(&mut self, doc: &ExportDocument) -> Result<ImportReport, StudioError> {
        let mut report = ImportReport::default();
        let mut touched = BTreeSet::new();
        for entity in doc.entities() {
            let target = entity.entity_ref();
            match self.store.insert_existing(entity.clone()) {
                Ok(true) => {
                    report.inserted += 1;
                    touched.insert(target.kind);
                }
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    tracing::warn!("Rejected imported {target}: {e}");
                    report.rejected += 1;
                }
            }
        }
        tracing::info!(
            "Imported {} entities ({} skipped, {} rejected)",
            report.inserted,
            report.skipped,
            report.rejected
        );
        self.rebuild_indices();
        self.flush(touched)?;
        Ok(report)
    }

    pub fn import_from(&mut self, path: &Path) -> Result<ImportReport, StudioError> {
        let raw = std::fs::read_to_string(path).map_err(|source| StudioError::File {
            path: PathBuf::from(path),
            source,
        })?;
        let doc = ExportDocument::from_json(&raw)?;
        self.import(&doc)
    }

    // ---------------------------------------------------------------
    // Change feed
    // ---------------------------------------------------------------

    /// Poll for changes. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<ChangeEvent> {
        self.feed.subscribe()
    }

    pub fn register(&mut self, listener: impl ChangeListener + 'static) -> ListenerId {
        self.feed.register(listener)
    }

    pub fn unregister(&mut self, id: ListenerId) -> bool {
        self.feed.unregister(id)
    }
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("data_dir", &self.data_dir())
            .field("store", &self.store)
            .field("links", &self.links.len())
            .field("search_built", &self.search.is_built())
            .finish()
    }
}
