//! Relationship definitions - explicit typed edges between entities.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use world_bible::EntityId;

/// Relationship types that express dependency, used for cycle detection.
pub const DEPENDENCY_TYPES: [&str; 4] = ["requires", "dependsOn", "precedes", "uses"];

/// Type given to edges synthesized from field references.
pub const REFERENCE_TYPE: &str = "references";

/// An explicit, typed link between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub from: EntityId,
    pub to: EntityId,
    pub relationship_type: String,

    /// Strength from 0.0 to 1.0, when the author gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,

    /// A reverse edge of the same type is expected to exist.
    #[serde(default)]
    pub bidirectional: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Relationship {
    /// Create a one-way relationship.
    pub fn new(
        from: impl Into<EntityId>,
        to: impl Into<EntityId>,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            from: from.into(),
            to: to.into(),
            relationship_type: relationship_type.into(),
            strength: None,
            bidirectional: false,
            description: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Mark this relationship as expecting a reverse edge.
    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }

    /// The id, or `from->to` when the relationship is anonymous.
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{}->{}", self.from, self.to),
        }
    }
}

/// Failure to read the relationship document as a whole.
#[derive(Debug, Error)]
pub enum RelationshipLoadError {
    #[error("failed to read relationships {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse relationships {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Relationships read from one document. Entries that do not parse are
/// skipped and described in `skipped`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipSet {
    pub relationships: Vec<Relationship>,
    pub skipped: Vec<String>,
}

#[derive(Deserialize)]
struct RelationshipDocument {
    #[serde(default)]
    relationships: Vec<Value>,
}

/// Load `{"relationships": [...]}` from a file.
///
/// The relationship document is optional: a missing file yields `None`. A
/// file that is not a relationship document is an error.
pub fn load_relationships(
    path: impl AsRef<Path>,
) -> Result<Option<RelationshipSet>, RelationshipLoadError> {
    let path = path.as_ref();
    if !path.exists() {
        warn!(path = %path.display(), "relationship file not found");
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| RelationshipLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let set = parse_relationships(&content).map_err(|source| RelationshipLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        path = %path.display(),
        relationships = set.relationships.len(),
        skipped = set.skipped.len(),
        "loaded relationships"
    );
    Ok(Some(set))
}

/// Parse a relationship document from a string.
pub fn parse_relationships(content: &str) -> Result<RelationshipSet, serde_json::Error> {
    let document: RelationshipDocument = serde_json::from_str(content)?;
    let mut set = RelationshipSet::default();

    for (index, entry) in document.relationships.into_iter().enumerate() {
        match serde_json::from_value::<Relationship>(entry) {
            Ok(relationship) => set.relationships.push(relationship),
            Err(err) => {
                warn!(index, error = %err, "skipping relationship entry");
                set.skipped.push(format!("relationships[{}]: {}", index, err));
            }
        }
    }

    Ok(set)
}
