//! One-call check of a knowledge base on disk.

use thiserror::Error;
use tracing::info;

use crate::config::IntegrityConfig;
use crate::consistency::{ConsistencyEngine, EngineError, Report};
use crate::knowledge_base::{load_relationships, RelationshipLoadError};
use world_bible::{EntityStore, SchemaError, SchemaRegistry, StoreError};

/// Usage errors that stop a run before any check executes. Problems in the
/// data itself end up in the report instead.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Relationships(#[from] RelationshipLoadError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Load everything the config names and run every check.
///
/// Entities are always read fresh from disk. Relationship entries that fail
/// to parse are added to the report's load errors.
pub fn check_knowledge_base(config: &IntegrityConfig) -> Result<Report, CheckError> {
    let engine = ConsistencyEngine::new(config)?;

    let snapshot = EntityStore::new(&config.data_dir).load_fresh()?;

    let registry = match &config.schema_dir {
        Some(dir) => SchemaRegistry::load_dir(dir)?,
        None => SchemaRegistry::builtin()?,
    };

    let relationships = match &config.relationships_path {
        Some(path) => load_relationships(path)?,
        None => None,
    };

    let explicit = relationships.as_ref().map(|set| set.relationships.as_slice());
    let mut report = engine.run(&snapshot, &registry, explicit);
    if let Some(set) = relationships {
        report.load_errors.extend(set.skipped);
    }

    info!(
        data_dir = %config.data_dir.display(),
        status = ?report.status(),
        "knowledge base checked"
    );
    Ok(report)
}
