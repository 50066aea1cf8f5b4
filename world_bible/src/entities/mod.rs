//! Entity definitions for the knowledge base.

mod details;

pub use details::*;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unique identifier for all entities, by convention `<type>_<slug>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Create an entity ID from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The text before the first underscore (the whole id if there is none).
    pub fn type_prefix(&self) -> &str {
        self.0.split('_').next().unwrap_or(&self.0)
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Types of entities in the knowledge base.
///
/// The set is closed for the types the tooling knows about and open through
/// [`EntityType::Other`] so that new record kinds still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    Location,
    Character,
    Profession,
    Faction,
    Culture,
    Food,
    Concept,
    Material,
    Event,
    Other(String),
}

impl EntityType {
    /// Every type the knowledge base ships schemas for.
    pub const KNOWN: [EntityType; 9] = [
        EntityType::Location,
        EntityType::Character,
        EntityType::Profession,
        EntityType::Faction,
        EntityType::Culture,
        EntityType::Food,
        EntityType::Concept,
        EntityType::Material,
        EntityType::Event,
    ];

    /// Parse a type name. Unknown names become [`EntityType::Other`].
    pub fn parse(name: &str) -> Self {
        match name {
            "location" => EntityType::Location,
            "character" => EntityType::Character,
            "profession" => EntityType::Profession,
            "faction" => EntityType::Faction,
            "culture" => EntityType::Culture,
            "food" => EntityType::Food,
            "concept" => EntityType::Concept,
            "material" => EntityType::Material,
            "event" => EntityType::Event,
            other => EntityType::Other(other.to_string()),
        }
    }

    /// The lowercase name used in records and as the id prefix.
    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Location => "location",
            EntityType::Character => "character",
            EntityType::Profession => "profession",
            EntityType::Faction => "faction",
            EntityType::Culture => "culture",
            EntityType::Food => "food",
            EntityType::Concept => "concept",
            EntityType::Material => "material",
            EntityType::Event => "event",
            EntityType::Other(name) => name,
        }
    }

    /// Check if this is one of the built-in types.
    pub fn is_known(&self) -> bool {
        !matches!(self, EntityType::Other(_))
    }
}

impl From<String> for EntityType {
    fn from(name: String) -> Self {
        EntityType::parse(&name)
    }
}

impl From<EntityType> for String {
    fn from(entity_type: EntityType) -> Self {
        entity_type.as_str().to_string()
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reasons a parsed value cannot become an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityParseError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record has no usable `{0}` field")]
    MissingField(&'static str),
}

/// A single knowledge-base record.
///
/// The raw field tree is kept in declaration order and is the source of truth
/// for traversal and schema validation. The remaining fields are typed views
/// derived from it when the entity is assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub entity_type: EntityType,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,

    /// The `properties` block, with the tiers the checks care about typed.
    pub properties: DeclaredProperties,

    /// Typed relationship fields for the types that have them.
    pub details: EntityDetails,

    /// File the record was loaded from, relative to the store root.
    pub source: Option<PathBuf>,

    record: Map<String, Value>,
}

impl Entity {
    /// Create a new entity with the given id, type, and name.
    pub fn new(id: impl Into<String>, entity_type: EntityType, name: impl Into<String>) -> Self {
        let id = EntityId::new(id);
        let mut record = Map::new();
        record.insert("id".to_string(), Value::String(id.0.clone()));
        record.insert("type".to_string(), Value::String(entity_type.as_str().to_string()));
        record.insert("name".to_string(), Value::String(name.into()));
        Self::assemble(id, entity_type, record, None)
    }

    /// Build an entity from a parsed record.
    ///
    /// Only `id` and `type` are required here; everything else is left to the
    /// schema registry.
    pub fn from_record(record: Map<String, Value>) -> Result<Self, EntityParseError> {
        let id = required_str(&record, "id")?;
        let entity_type = EntityType::parse(required_str(&record, "type")?);
        Ok(Self::assemble(EntityId::new(id), entity_type, record, None))
    }

    /// Build an entity from any JSON value.
    pub fn from_value(value: Value) -> Result<Self, EntityParseError> {
        match value {
            Value::Object(record) => Self::from_record(record),
            _ => Err(EntityParseError::NotAnObject),
        }
    }

    fn assemble(
        id: EntityId,
        entity_type: EntityType,
        record: Map<String, Value>,
        source: Option<PathBuf>,
    ) -> Self {
        let name = optional_str(&record, "name");
        let description = optional_str(&record, "description");
        let tags = string_list(record.get("tags"));
        let properties = DeclaredProperties::from_value(record.get("properties"));
        let details = EntityDetails::from_record(&entity_type, &record);

        Self {
            id,
            entity_type,
            name,
            description,
            tags,
            properties,
            details,
            source,
            record,
        }
    }

    /// Set a field on the record. `id` and `type` are fixed at construction.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key == "id" || key == "type" {
            return self;
        }
        self.record.insert(key, value.into());
        Self::assemble(self.id, self.entity_type, self.record, self.source)
    }

    /// Set the description.
    pub fn with_description(self, description: impl Into<String>) -> Self {
        self.with_field("description", Value::String(description.into()))
    }

    /// Set the file this record came from.
    pub fn with_source(mut self, source: impl AsRef<Path>) -> Self {
        self.source = Some(source.as_ref().to_path_buf());
        self
    }

    /// The raw field tree in declaration order.
    pub fn record(&self) -> &Map<String, Value> {
        &self.record
    }

    /// Get a raw top-level field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.record.get(key)
    }

    /// Ids this record links to through its relationship fields.
    pub fn declared_links(&self) -> Vec<(&'static str, EntityId)> {
        declared_links(&self.record)
    }

    /// Name used in messages: the display name, or the id when unnamed.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record.serialize(serializer)
    }
}

impl TryFrom<Value> for Entity {
    type Error = EntityParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn required_str<'a>(
    record: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, EntityParseError> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(EntityParseError::MissingField(field))
}

fn optional_str(record: &Map<String, Value>, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Read a field that may hold one string or a list of strings.
pub(crate) fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_prefix() {
        assert_eq!(EntityId::new("location_foo_bar").type_prefix(), "location");
        assert_eq!(EntityId::new("plain").type_prefix(), "plain");
    }

    #[test]
    fn test_entity_type_round_trip_names() {
        for known in EntityType::KNOWN {
            assert_eq!(EntityType::parse(known.as_str()), known);
            assert!(known.is_known());
        }
        let custom = EntityType::parse("ritual");
        assert_eq!(custom, EntityType::Other("ritual".to_string()));
        assert!(!custom.is_known());
    }

    #[test]
    fn test_from_record_requires_id_and_type() {
        let missing_type = json!({ "id": "location_a", "name": "A" });
        assert_eq!(
            Entity::from_value(missing_type),
            Err(EntityParseError::MissingField("type"))
        );

        let blank_id = json!({ "id": "  ", "type": "location" });
        assert_eq!(
            Entity::from_value(blank_id),
            Err(EntityParseError::MissingField("id"))
        );

        assert_eq!(
            Entity::from_value(json!(["not", "an", "object"])),
            Err(EntityParseError::NotAnObject)
        );
    }

    #[test]
    fn test_from_record_derives_views() {
        let entity = Entity::from_value(json!({
            "id": "material_hinoki",
            "type": "material",
            "name": "Hinoki",
            "description": "Fragrant cypress",
            "tags": ["wood", "premium"],
            "properties": { "cost": "premium", "durability": "high" },
            "usedIn": ["location_bathhouse"]
        }))
        .unwrap();

        assert_eq!(entity.id.as_str(), "material_hinoki");
        assert_eq!(entity.entity_type, EntityType::Material);
        assert_eq!(entity.name, "Hinoki");
        assert_eq!(entity.tags, vec!["wood", "premium"]);
        assert_eq!(entity.properties.cost, Some(CostTier::Premium));
        assert_eq!(entity.properties.durability, Some(DurabilityTier::High));
        match &entity.details {
            EntityDetails::Material(material) => {
                assert_eq!(material.used_in, vec![EntityId::new("location_bathhouse")]);
            }
            other => panic!("expected material details, got {:?}", other),
        }
    }

    #[test]
    fn test_serialize_preserves_record_order() {
        let entity = Entity::new("faction_tora", EntityType::Faction, "Tora")
            .with_description("A guild")
            .with_field("leader", "character_tora");

        let rendered = serde_json::to_string(&entity).unwrap();
        assert_eq!(
            rendered,
            r#"{"id":"faction_tora","type":"faction","name":"Tora","description":"A guild","leader":"character_tora"}"#
        );
    }

    #[test]
    fn test_with_field_cannot_change_identity() {
        let entity = Entity::new("location_a", EntityType::Location, "A")
            .with_field("id", "location_b")
            .with_field("type", "faction");

        assert_eq!(entity.id.as_str(), "location_a");
        assert_eq!(entity.entity_type, EntityType::Location);
        assert_eq!(entity.field("id"), Some(&json!("location_a")));
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let unnamed = Entity::new("concept_void", EntityType::Concept, "");
        assert_eq!(unnamed.display_name(), "concept_void");
    }
}
