use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::clock::{Clock, SystemClock};
use crate::error::CoreError;
use crate::model::{
    Entity, EntityBody, EntityId, EntityKind, EntityPatch, EntityRef, EventCategory, GoalStatus,
    StudioTask,
};

/// Options for listing entities.
///
/// Field filters only constrain kinds that carry the field; `category` on a
/// goal list, for example, is ignored.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub limit: Option<usize>,
    /// Keep records dated on or after this day.
    pub from: Option<NaiveDate>,
    /// Keep records dated strictly before this day.
    pub until: Option<NaiveDate>,
    pub category: Option<EventCategory>,
    pub status: Option<GoalStatus>,
    /// Event task or time-entry activity.
    pub task: Option<StudioTask>,
}

impl ListFilter {
    pub fn matches(&self, entity: &Entity) -> bool {
        if let Some(date) = entity.body.date() {
            if self.from.is_some_and(|from| date < from) {
                return false;
            }
            if self.until.is_some_and(|until| date >= until) {
                return false;
            }
        } else if self.from.is_some() || self.until.is_some() {
            // Undated records only pass date filters for kinds that are never dated.
            if entity.kind() != EntityKind::Goal {
                return false;
            }
        }

        match &entity.body {
            EntityBody::CalendarEvent(e) => {
                self.category.map_or(true, |c| e.category == c)
                    && self.task.map_or(true, |t| e.task == Some(t))
            }
            EntityBody::TimeEntry(t) => self.task.map_or(true, |task| t.activity == task),
            EntityBody::Goal(g) => self.status.map_or(true, |s| g.status == s),
            EntityBody::PortfolioPiece(_) | EntityBody::JournalEntry(_) => true,
        }
    }
}

/// In-memory home of every entity, keyed by kind then id.
///
/// All writes validate first and only then touch the map, so a failed
/// operation never leaves a partial change behind.
pub struct EntityStore {
    collections: HashMap<EntityKind, BTreeMap<EntityId, Entity>>,
    clock: Arc<dyn Clock>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let collections = EntityKind::ALL
            .into_iter()
            .map(|kind| (kind, BTreeMap::new()))
            .collect();
        Self { collections, clock }
    }

    fn collection(&self, kind: EntityKind) -> &BTreeMap<EntityId, Entity> {
        // Every kind is inserted at construction.
        &self.collections[&kind]
    }

    fn collection_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<EntityId, Entity> {
        self.collections.entry(kind).or_default()
    }

    /// Timestamp for a mutation of a record last touched at `previous`.
    /// Always strictly later than `previous`, so `updated_at` works as a
    /// version token even when the clock has not moved.
    fn stamp(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        let now = self.clock.now();
        if now > previous {
            now
        } else {
            previous + Duration::microseconds(1)
        }
    }

    /// Validate and insert a new entity, assigning its id and timestamps.
    pub fn create(&mut self, body: EntityBody) -> Result<EntityId, CoreError> {
        body.validate()?;
        let kind = body.kind();
        let mut id = EntityId::new();
        while self.collection(kind).contains_key(&id) {
            id = EntityId::new();
        }
        let now = self.clock.now();
        let entity = Entity {
            id: id.clone(),
            created_at: now,
            updated_at: now,
            links: Vec::new(),
            body,
        };
        self.collection_mut(kind).insert(id.clone(), entity);
        Ok(id)
    }

    /// Insert a record that already has an envelope (load or import).
    /// Returns false and leaves the store untouched if the id is taken.
    pub fn insert_existing(&mut self, mut entity: Entity) -> Result<bool, CoreError> {
        entity.body.validate()?;
        if entity.updated_at < entity.created_at {
            entity.updated_at = entity.created_at;
        }
        let kind = entity.kind();
        if self.collection(kind).contains_key(&entity.id) {
            return Ok(false);
        }
        self.collection_mut(kind).insert(entity.id.clone(), entity);
        Ok(true)
    }

    pub fn get(&self, kind: EntityKind, id: &EntityId) -> Result<&Entity, CoreError> {
        self.collection(kind)
            .get(id)
            .ok_or_else(|| CoreError::NotFound {
                kind,
                id: id.to_string(),
            })
    }

    pub fn get_ref(&self, target: &EntityRef) -> Result<&Entity, CoreError> {
        self.get(target.kind, &target.id)
    }

    pub fn contains(&self, target: &EntityRef) -> bool {
        self.collection(target.kind).contains_key(&target.id)
    }

    /// Merge `patch` over the stored record. The merged record must validate.
    pub fn update(
        &mut self,
        kind: EntityKind,
        id: &EntityId,
        patch: &EntityPatch,
    ) -> Result<Entity, CoreError> {
        let current = self.get(kind, id)?;
        let mut body = current.body.clone();
        patch.apply(&mut body)?;
        body.validate()?;
        let stamp = self.stamp(current.updated_at);

        let entity = self.collection_mut(kind).get_mut(id).ok_or_else(|| {
            CoreError::NotFound {
                kind,
                id: id.to_string(),
            }
        })?;
        entity.body = body;
        entity.updated_at = stamp;
        Ok(entity.clone())
    }

    /// Like [`update`](Self::update), but rejects the write with `Conflict` if the
    /// record changed since the caller read it.
    pub fn update_if_unmodified(
        &mut self,
        kind: EntityKind,
        id: &EntityId,
        expected_updated_at: DateTime<Utc>,
        patch: &EntityPatch,
    ) -> Result<Entity, CoreError> {
        let actual = self.get(kind, id)?.updated_at;
        if actual != expected_updated_at {
            return Err(CoreError::Conflict {
                target: EntityRef::new(kind, id.clone()),
                expected: expected_updated_at,
                actual,
            });
        }
        self.update(kind, id, patch)
    }

    /// Remove an entity and return it.
    pub fn delete(&mut self, kind: EntityKind, id: &EntityId) -> Result<Entity, CoreError> {
        self.collection_mut(kind)
            .remove(id)
            .ok_or_else(|| CoreError::NotFound {
                kind,
                id: id.to_string(),
            })
    }

    /// Add a free-form link from `from` to `to`. Returns whether anything changed.
    pub fn attach(&mut self, from: &EntityRef, to: &EntityRef) -> Result<bool, CoreError> {
        let stamp = self.stamp(self.get_ref(from)?.updated_at);
        let entity = self.entity_mut(from)?;
        let changed = entity.attach(to.clone());
        if changed {
            entity.updated_at = stamp;
        }
        Ok(changed)
    }

    /// Remove every reference from `from` to `to`. Returns whether anything changed.
    pub fn detach(&mut self, from: &EntityRef, to: &EntityRef) -> Result<bool, CoreError> {
        let stamp = self.stamp(self.get_ref(from)?.updated_at);
        let entity = self.entity_mut(from)?;
        let changed = entity.detach(to);
        if changed {
            entity.updated_at = stamp;
        }
        Ok(changed)
    }

    fn entity_mut(&mut self, target: &EntityRef) -> Result<&mut Entity, CoreError> {
        self.collection_mut(target.kind)
            .get_mut(&target.id)
            .ok_or_else(|| CoreError::not_found(target))
    }

    /// List entities of one kind, most recently created first.
    pub fn list(&self, kind: EntityKind, filter: &ListFilter) -> Vec<&Entity> {
        let mut entities: Vec<&Entity> = self
            .collection(kind)
            .values()
            .filter(|e| filter.matches(e))
            .collect();
        entities.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        if let Some(limit) = filter.limit {
            entities.truncate(limit);
        }
        entities
    }

    /// Every record of one kind, unordered.
    pub fn records(&self, kind: EntityKind) -> Vec<&Entity> {
        self.collection(kind).values().collect()
    }

    /// Every record of every kind.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        EntityKind::ALL
            .into_iter()
            .flat_map(move |kind| self.collection(kind).values())
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.collection(kind).len()
    }

    pub fn len(&self) -> usize {
        self.collections.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a full id or a unique prefix of one.
    pub fn resolve(&self, kind: EntityKind, id_or_prefix: &str) -> Result<EntityId, CoreError> {
        let collection = self.collection(kind);
        let exact = EntityId::from(id_or_prefix);
        if collection.contains_key(&exact) {
            return Ok(exact);
        }
        let matches: Vec<&EntityId> = collection
            .keys()
            .filter(|id| id.as_str().starts_with(id_or_prefix))
            .collect();
        match matches.as_slice() {
            [only] => Ok((*only).clone()),
            [] => Err(CoreError::NotFound {
                kind,
                id: id_or_prefix.to_string(),
            }),
            _ => Err(CoreError::AmbiguousId {
                kind,
                prefix: id_or_prefix.to_string(),
                matches: matches.len(),
            }),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts = f.debug_map();
        for kind in EntityKind::ALL {
            counts.entry(&kind, &self.count(kind));
        }
        counts.finish()
    }
}
