//! Entity Store - loads every entity record under a root directory.
//!
//! The store only checks that a record parses and carries an `id` and a
//! `type`. Everything else is the schema registry's job. Malformed records
//! are skipped and recorded on the snapshot; they never abort a load.

mod query;

pub use query::*;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::entities::{Entity, EntityId, EntityParseError, EntityType};

/// Errors from misusing the store. Bad records are [`LoadError`]s instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity root is not a directory: {0}")]
    RootNotFound(PathBuf),

    #[error("entity store queried before load_all()")]
    NotLoaded,
}

/// Why a single record was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadErrorKind {
    #[error("unreadable file: {0}")]
    Io(String),

    #[error("invalid JSON: {0}")]
    Parse(String),

    #[error(transparent)]
    Record(#[from] EntityParseError),

    #[error("duplicate id {0} (first definition kept)")]
    DuplicateId(EntityId),

    #[error("directory walk failed: {0}")]
    Walk(String),
}

/// A skipped record and where it came from.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}: {kind}", .path.display())]
pub struct LoadError {
    pub path: PathBuf,
    pub kind: LoadErrorKind,
}

/// An immutable view of every entity loaded in one pass.
#[derive(Debug, Clone, Default)]
pub struct EntitySnapshot {
    entities: BTreeMap<EntityId, Entity>,
    load_errors: Vec<LoadError>,
}

impl EntitySnapshot {
    /// Create a new empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from in-memory entities. Later duplicates of an id are
    /// recorded as load errors, as they would be when loading from disk.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut snapshot = Self::new();
        for entity in entities {
            snapshot.admit(entity);
        }
        snapshot
    }

    fn admit(&mut self, entity: Entity) {
        if self.entities.contains_key(&entity.id) {
            let path = entity.source.clone().unwrap_or_default();
            warn!(id = %entity.id, path = %path.display(), "duplicate entity id, keeping first");
            self.load_errors.push(LoadError {
                path,
                kind: LoadErrorKind::DuplicateId(entity.id),
            });
            return;
        }
        self.entities.insert(entity.id.clone(), entity);
    }

    fn record_error(&mut self, error: LoadError) {
        warn!(error = %error, "skipping entity record");
        self.load_errors.push(error);
    }

    /// Get entity by ID.
    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Check if an entity with this id was loaded.
    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Get the total number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// All ids, in order.
    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.keys()
    }

    /// Ids of every entity of one type.
    pub fn by_type(&self, entity_type: &EntityType) -> Vec<&EntityId> {
        self.entities
            .values()
            .filter(|e| &e.entity_type == entity_type)
            .map(|e| &e.id)
            .collect()
    }

    /// Records skipped while building this snapshot.
    pub fn load_errors(&self) -> &[LoadError] {
        &self.load_errors
    }
}

/// Loads entity records from a directory tree and caches the result.
///
/// The cache belongs to this instance. Anything that writes records must
/// call [`EntityStore::invalidate`] afterwards; the validation path uses
/// [`EntityStore::load_fresh`] and never reads the cache.
#[derive(Debug)]
pub struct EntityStore {
    root: PathBuf,
    cache: Option<EntitySnapshot>,
}

impl EntityStore {
    /// Create a store rooted at the given directory. Nothing is read yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every record, reusing the cached snapshot when there is one.
    pub fn load_all(&mut self) -> Result<&EntitySnapshot, StoreError> {
        if self.cache.is_none() {
            let snapshot = self.load_fresh()?;
            self.cache = Some(snapshot);
        }
        self.cache.as_ref().ok_or(StoreError::NotLoaded)
    }

    /// Load every record from disk, bypassing and not touching the cache.
    pub fn load_fresh(&self) -> Result<EntitySnapshot, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::RootNotFound(self.root.clone()));
        }

        let mut snapshot = EntitySnapshot::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    snapshot.record_error(LoadError {
                        path,
                        kind: LoadErrorKind::Walk(err.to_string()),
                    });
                    continue;
                }
            };

            let path = entry.path();
            let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
            if !entry.file_type().is_file() || !is_json {
                continue;
            }

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            match load_record(path) {
                Ok(entity) => {
                    debug!(id = %entity.id, path = %relative.display(), "loaded entity");
                    snapshot.admit(entity.with_source(relative));
                }
                Err(kind) => snapshot.record_error(LoadError {
                    path: relative.to_path_buf(),
                    kind,
                }),
            }
        }

        info!(
            root = %self.root.display(),
            entities = snapshot.len(),
            skipped = snapshot.load_errors().len(),
            "loaded entity store"
        );
        Ok(snapshot)
    }

    /// Drop the cached snapshot so the next [`EntityStore::load_all`] rereads disk.
    pub fn invalidate(&mut self) {
        if self.cache.take().is_some() {
            debug!(root = %self.root.display(), "entity cache invalidated");
        }
    }

    /// Check if a snapshot is cached.
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// The cached snapshot, if loaded.
    pub fn snapshot(&self) -> Option<&EntitySnapshot> {
        self.cache.as_ref()
    }

    /// Get entity by ID from the cached snapshot.
    pub fn get(&self, id: &str) -> Result<Option<&Entity>, StoreError> {
        self.cache
            .as_ref()
            .map(|snapshot| snapshot.get(id))
            .ok_or(StoreError::NotLoaded)
    }

    /// Number of entities in the cached snapshot.
    pub fn size(&self) -> Result<usize, StoreError> {
        self.cache
            .as_ref()
            .map(EntitySnapshot::len)
            .ok_or(StoreError::NotLoaded)
    }
}

fn load_record(path: &Path) -> Result<Entity, LoadErrorKind> {
    let content = fs::read_to_string(path).map_err(|e| LoadErrorKind::Io(e.to_string()))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| LoadErrorKind::Parse(e.to_string()))?;
    Ok(Entity::from_value(value)?)
}
