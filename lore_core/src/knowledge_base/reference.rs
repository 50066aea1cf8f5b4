//! Reference extraction - finds identifier-shaped strings in entity records.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use world_bible::{Entity, EntityId, EntitySnapshot, EntityType};

/// A string field value that looks like another entity's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// Where the value was found, e.g. `connections[2].target`.
    pub field_path: String,
    pub target: EntityId,
    /// Derived from the text before the first underscore of `target`.
    pub target_type: EntityType,
}

/// Every reference found in a snapshot, keyed by the referring entity.
pub type ReferenceIndex = BTreeMap<EntityId, Vec<Reference>>;

/// Scans records for strings matching `^(prefix|...)_[a-z0-9_-]+$`.
///
/// Existence of the target is not checked here; every syntactically valid
/// reference is reported.
#[derive(Debug, Clone)]
pub struct ReferenceExtractor {
    pattern: Regex,
    prefixes: Vec<String>,
}

impl ReferenceExtractor {
    /// Create an extractor for the given set of type prefixes.
    pub fn new<I, S>(prefixes: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        prefixes.sort();
        prefixes.dedup();

        let alternatives: Vec<_> = prefixes.iter().map(|p| regex::escape(p)).collect();
        let pattern = Regex::new(&format!("^(?:{})_[a-z0-9_-]+$", alternatives.join("|")))?;

        Ok(Self { pattern, prefixes })
    }

    /// Create an extractor for the built-in entity types.
    pub fn for_known_types() -> Result<Self, regex::Error> {
        Self::new(EntityType::KNOWN.iter().map(EntityType::as_str))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Check if a string is shaped like an entity id.
    pub fn is_reference(&self, text: &str) -> bool {
        !self.prefixes.is_empty() && self.pattern.is_match(text)
    }

    /// Extract references from an entity, depth first in field declaration
    /// order, then list order. The record's own `id` is skipped.
    pub fn extract(&self, entity: &Entity) -> Vec<Reference> {
        let roots = entity
            .record()
            .iter()
            .filter(|(key, _)| key.as_str() != "id")
            .map(|(key, value)| (key.clone(), value));
        self.walk(roots)
    }

    /// Extract references from an arbitrary value. Top-level members of an
    /// object get bare paths; a top-level list uses `[index]`.
    pub fn extract_value(&self, value: &Value) -> Vec<Reference> {
        match value {
            Value::Object(fields) => self.walk(fields.iter().map(|(k, v)| (k.clone(), v))),
            other => self.walk(std::iter::once((String::new(), other))),
        }
    }

    /// Extract references for every entity in a snapshot.
    pub fn extract_all(&self, snapshot: &EntitySnapshot) -> ReferenceIndex {
        snapshot
            .iter()
            .map(|entity| (entity.id.clone(), self.extract(entity)))
            .collect()
    }

    fn walk<'a>(
        &self,
        roots: impl DoubleEndedIterator<Item = (String, &'a Value)>,
    ) -> Vec<Reference> {
        let mut references = Vec::new();
        // Children are pushed in reverse so they pop in declaration order.
        let mut stack: Vec<(String, &Value)> = roots.rev().collect();

        while let Some((path, value)) = stack.pop() {
            match value {
                Value::String(text) if self.is_reference(text) => {
                    let target = EntityId::new(text.as_str());
                    references.push(Reference {
                        target_type: EntityType::parse(target.type_prefix()),
                        field_path: path,
                        target,
                    });
                }
                Value::Array(items) => {
                    for (index, item) in items.iter().enumerate().rev() {
                        stack.push((format!("{}[{}]", path, index), item));
                    }
                }
                Value::Object(fields) => {
                    for (key, child) in fields.iter().rev() {
                        let child_path = if path.is_empty() {
                            key.clone()
                        } else {
                            format!("{}.{}", path, key)
                        };
                        stack.push((child_path, child));
                    }
                }
                _ => {}
            }
        }

        references
    }
}
