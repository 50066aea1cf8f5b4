//! Schema Registry - one validation schema per entity type.
//!
//! Schemas are a subset of JSON Schema: `required`, `properties`, `type`,
//! `pattern`, `format`, `enum`, `const`, length and range bounds, `items`,
//! and `additionalProperties: false`. Validation is pure.

mod builtin;
mod rule;

pub use rule::*;

use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::entities::{Entity, EntityType};

/// File name suffix for schema documents, e.g. `material.schema.json`.
pub const SCHEMA_FILE_SUFFIX: &str = ".schema.json";

/// Errors while building a registry. Schemas are configuration, so these
/// are usage errors rather than data-quality findings.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid pattern at {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed schema at {field}: {reason}")]
    Malformed { field: String, reason: String },

    #[error("duplicate schema for entity type: {0}")]
    Duplicate(String),
}

/// Outcome of validating one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    /// Field-level violations, never empty.
    Invalid(Vec<FieldViolation>),
    /// No schema is registered for the entity's type.
    UnknownType(EntityType),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Field violations, empty unless `Invalid`.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            ValidationResult::Invalid(violations) => violations,
            _ => &[],
        }
    }
}

/// Holds one schema per entity type.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Schema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a schema for every known entity type.
    pub fn builtin() -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for entity_type in EntityType::KNOWN {
            let document = builtin::schema_document(&entity_type);
            registry.register(Schema::from_json(entity_type, &document)?)?;
        }
        Ok(registry)
    }

    /// Load every `<type>.schema.json` file in a directory.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(SchemaError::DirNotFound(dir.to_path_buf()));
        }

        let read_err = |source| SchemaError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            let is_schema = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(SCHEMA_FILE_SUFFIX));
            if is_schema && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut registry = Self::new();
        for path in paths {
            registry.register(load_schema_file(&path)?)?;
        }

        info!(dir = %dir.display(), schemas = registry.len(), "loaded schema registry");
        Ok(registry)
    }

    /// Add a schema. Each entity type may only have one.
    pub fn register(&mut self, schema: Schema) -> Result<(), SchemaError> {
        let name = schema.entity_type().as_str().to_string();
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::Duplicate(name));
        }
        debug!(entity_type = %name, title = schema.title(), "registered schema");
        self.schemas.insert(name, schema);
        Ok(())
    }

    /// Get the schema for an entity type.
    pub fn schema_for(&self, entity_type: &EntityType) -> Option<&Schema> {
        self.schemas.get(entity_type.as_str())
    }

    /// Names of every entity type with a schema, sorted.
    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Validate an entity against the schema for its type.
    pub fn validate(&self, entity: &Entity) -> ValidationResult {
        let Some(schema) = self.schema_for(&entity.entity_type) else {
            return ValidationResult::UnknownType(entity.entity_type.clone());
        };

        let violations = schema.check(entity.record());
        if violations.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(violations)
        }
    }
}

fn load_schema_file(path: &Path) -> Result<Schema, SchemaError> {
    let content = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: Value = serde_json::from_str(&content).map_err(|source| SchemaError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let type_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(SCHEMA_FILE_SUFFIX))
        .unwrap_or_default();

    Schema::from_json(EntityType::parse(type_name), &document)
}
