use std::path::{Path, PathBuf};

use crate::config::StudioConfig;
use crate::error::CoreError;
use crate::model::{Entity, EntityKind};

use super::atomic::write_atomic;

/// One pretty-printed JSON array per entity kind inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Open an existing data directory. It does not need to be initialized yet.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        if !path.is_dir() {
            return Err(CoreError::NotInitialized);
        }
        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    /// Create the data directory if needed and write a default config.
    /// An existing config is left alone unless `force` is set.
    pub fn init(path: &Path, force: bool) -> Result<Self, CoreError> {
        std::fs::create_dir_all(path)?;
        let storage = Self {
            root: path.to_path_buf(),
        };
        if force || !storage.is_initialized() {
            StudioConfig::default_init().save(path)?;
            tracing::info!("Initialized kilnbook data directory at {}", path.display());
        }
        Ok(storage)
    }

    pub fn is_initialized(&self) -> bool {
        StudioConfig::path(&self.root).is_file()
    }

    pub fn config(&self) -> Result<StudioConfig, CoreError> {
        StudioConfig::load(&self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_path(&self, kind: EntityKind) -> PathBuf {
        self.root.join(format!("{}.json", kind.collection()))
    }

    /// Side file holding records of `kind` that could not be loaded.
    pub fn rejected_path(&self, kind: EntityKind) -> PathBuf {
        self.root.join(format!("{}.rejected.json", kind.collection()))
    }

    /// Copy records that cannot be loaded into the kind's rejected file, so a
    /// later save of the collection does not erase them. Records already in
    /// the file are not added twice.
    pub fn quarantine(
        &self,
        kind: EntityKind,
        records: Vec<serde_json::Value>,
    ) -> Result<(), CoreError> {
        if records.is_empty() {
            return Ok(());
        }
        let path = self.rejected_path(kind);
        let mut kept: Vec<serde_json::Value> = match std::fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(CoreError::Io(e)),
        };
        let before = kept.len();
        for record in records {
            if !kept.contains(&record) {
                kept.push(record);
            }
        }
        if kept.len() == before {
            return Ok(());
        }

        let json = serde_json::to_vec_pretty(&kept)?;
        let file_name = format!("{}.rejected.json", kind.collection());
        write_atomic(&self.root, &file_name, &json).map_err(|source| CoreError::Persistence {
            collection: file_name,
            source,
        })?;
        tracing::warn!(
            "Moved {} unloadable {} record(s) to {}",
            kept.len() - before,
            kind.collection(),
            path.display()
        );
        Ok(())
    }

    /// Read one collection. A missing file is an empty collection. Records that
    /// fail to parse or carry the wrong kind are left out and copied to the
    /// rejected file first.
    pub fn load_collection(&self, kind: EntityKind) -> Result<Vec<Entity>, CoreError> {
        let path = self.collection_path(kind);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::Io(e)),
        };
        let values: Vec<serde_json::Value> = serde_json::from_slice(&raw)?;

        let mut entities = Vec::with_capacity(values.len());
        let mut rejected = Vec::new();
        for value in values {
            match serde_json::from_value::<Entity>(value.clone()) {
                Ok(entity) if entity.kind() == kind => entities.push(entity),
                Ok(entity) => {
                    tracing::warn!(
                        "Rejecting {} {} found in {}",
                        entity.kind(),
                        entity.id,
                        path.display()
                    );
                    rejected.push(value);
                }
                Err(e) => {
                    tracing::warn!("Rejecting unreadable record in {}: {e}", path.display());
                    rejected.push(value);
                }
            }
        }
        self.quarantine(kind, rejected)?;
        Ok(entities)
    }

    /// Read every collection.
    pub fn load_all(&self) -> Result<Vec<Entity>, CoreError> {
        let mut all = Vec::new();
        for kind in EntityKind::ALL {
            all.extend(self.load_collection(kind)?);
        }
        Ok(all)
    }

    /// Durably replace one collection. The records are written oldest first.
    pub fn save_collection(&self, kind: EntityKind, records: &[&Entity]) -> Result<(), CoreError> {
        let mut records = records.to_vec();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        let json = serde_json::to_vec_pretty(&records)?;
        let file_name = format!("{}.json", kind.collection());
        write_atomic(&self.root, &file_name, &json).map_err(|source| CoreError::Persistence {
            collection: kind.collection().to_string(),
            source,
        })?;
        tracing::debug!("Flushed {} {} record(s)", records.len(), kind.collection());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityBody, EntityId, Goal};
    use chrono::Utc;
    use tempfile::TempDir;

    fn goal(title: &str) -> Entity {
        let now = Utc::now();
        Entity {
            id: EntityId::new(),
            created_at: now,
            updated_at: now,
            links: vec![],
            body: EntityBody::Goal(Goal::new(title, "because")),
        }
    }

    #[test]
    fn test_full_lifecycle() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("data");

        assert!(JsonStorage::open(&dir).is_err());
        let storage = JsonStorage::init(&dir, false).unwrap();
        assert!(storage.is_initialized());

        // Empty collections
        assert!(storage.load_all().unwrap().is_empty());

        let a = goal("Throw 50 mugs");
        let b = goal("Apply to the winter market");
        storage.save_collection(EntityKind::Goal, &[&a, &b]).unwrap();

        let loaded = storage.load_collection(EntityKind::Goal).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains(&a));
        assert!(loaded.contains(&b));

        // Reopen sees the same data
        let reopened = JsonStorage::open(&dir).unwrap();
        assert_eq!(reopened.load_all().unwrap().len(), 2);
    }

    #[test]
    fn test_init_keeps_existing_config_without_force() {
        let tmp = TempDir::new().unwrap();
        let storage = JsonStorage::init(tmp.path(), false).unwrap();
        let custom = StudioConfig {
            available_minutes_per_day: 300,
            ..StudioConfig::default_init()
        };
        custom.save(tmp.path()).unwrap();

        JsonStorage::init(tmp.path(), false).unwrap();
        assert_eq!(storage.config().unwrap().available_minutes_per_day, 300);

        JsonStorage::init(tmp.path(), true).unwrap();
        assert_eq!(storage.config().unwrap().available_minutes_per_day, 480);
    }

    #[test]
    fn test_bad_records_are_set_aside() {
        let tmp = TempDir::new().unwrap();
        let storage = JsonStorage::init(tmp.path(), false).unwrap();
        let good = goal("Glaze tests");
        let mut records = vec![serde_json::to_value(&good).unwrap()];
        records.push(serde_json::json!({ "id": "broken" }));
        std::fs::write(
            storage.collection_path(EntityKind::Goal),
            serde_json::to_vec(&records).unwrap(),
        )
        .unwrap();

        let loaded = storage.load_collection(EntityKind::Goal).unwrap();
        assert_eq!(loaded, vec![good.clone()]);

        // Saving what was loaded keeps the broken record in the side file.
        storage.save_collection(EntityKind::Goal, &[&good]).unwrap();
        storage.load_collection(EntityKind::Goal).unwrap();
        let rejected: Vec<serde_json::Value> = serde_json::from_slice(
            &std::fs::read(storage.rejected_path(EntityKind::Goal)).unwrap(),
        )
        .unwrap();
        assert_eq!(rejected, vec![serde_json::json!({ "id": "broken" })]);

        // The same record is not accepted as another kind.
        std::fs::copy(
            storage.collection_path(EntityKind::Goal),
            storage.collection_path(EntityKind::JournalEntry),
        )
        .unwrap();
        assert!(storage
            .load_collection(EntityKind::JournalEntry)
            .unwrap()
            .is_empty());
        assert!(storage.rejected_path(EntityKind::JournalEntry).is_file());
    }

    #[test]
    fn test_quarantine_does_not_duplicate() {
        let tmp = TempDir::new().unwrap();
        let storage = JsonStorage::init(tmp.path(), false).unwrap();
        let record = serde_json::json!({ "kind": "goal", "status": "paused" });
        storage.quarantine(EntityKind::Goal, vec![record.clone()]).unwrap();
        storage.quarantine(EntityKind::Goal, vec![record.clone()]).unwrap();
        storage.quarantine(EntityKind::Goal, vec![]).unwrap();
        let kept: Vec<serde_json::Value> = serde_json::from_slice(
            &std::fs::read(storage.rejected_path(EntityKind::Goal)).unwrap(),
        )
        .unwrap();
        assert_eq!(kept, vec![record]);
    }

    #[test]
    fn test_corrupt_collection_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let storage = JsonStorage::init(tmp.path(), false).unwrap();
        std::fs::write(storage.collection_path(EntityKind::Goal), b"not json").unwrap();
        assert!(matches!(
            storage.load_collection(EntityKind::Goal),
            Err(CoreError::Json(_))
        ));
    }
}
