//! Typed views over the fields validation and consistency checks care about.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{string_list, EntityId, EntityType};

/// Cost tier declared under `properties.cost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CostTier {
    Cheap,
    Moderate,
    Expensive,
    Premium,
}

impl CostTier {
    pub const ALL: [CostTier; 4] = [
        CostTier::Cheap,
        CostTier::Moderate,
        CostTier::Expensive,
        CostTier::Premium,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CostTier::Cheap => "cheap",
            CostTier::Moderate => "moderate",
            CostTier::Expensive => "expensive",
            CostTier::Premium => "premium",
        }
    }
}

/// Durability tier declared under `properties.durability`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurabilityTier {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl DurabilityTier {
    pub const ALL: [DurabilityTier; 5] = [
        DurabilityTier::VeryLow,
        DurabilityTier::Low,
        DurabilityTier::Moderate,
        DurabilityTier::High,
        DurabilityTier::VeryHigh,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DurabilityTier::VeryLow => "very-low",
            DurabilityTier::Low => "low",
            DurabilityTier::Moderate => "moderate",
            DurabilityTier::High => "high",
            DurabilityTier::VeryHigh => "very-high",
        }
    }
}

/// The `properties` block of a record.
///
/// `cost` and `durability` are typed when they hold a known tier; anything
/// else, including unrecognised tier names, stays in `other`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeclaredProperties {
    pub cost: Option<CostTier>,
    pub durability: Option<DurabilityTier>,
    pub other: Map<String, Value>,
}

impl DeclaredProperties {
    /// Read a `properties` value. Non-object values yield an empty block.
    pub fn from_value(value: Option<&Value>) -> Self {
        let mut properties = Self::default();
        let Some(Value::Object(fields)) = value else {
            return properties;
        };

        for (key, value) in fields {
            let text = value.as_str();
            match key.as_str() {
                "cost" if text.and_then(CostTier::parse).is_some() => {
                    properties.cost = text.and_then(CostTier::parse);
                }
                "durability" if text.and_then(DurabilityTier::parse).is_some() => {
                    properties.durability = text.and_then(DurabilityTier::parse);
                }
                _ => {
                    properties.other.insert(key.clone(), value.clone());
                }
            }
        }

        properties
    }

    /// Textual value of a declared property, if it has one.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        match name {
            "cost" if self.cost.is_some() => self.cost.map(|tier| tier.as_str()),
            "durability" if self.durability.is_some() => {
                self.durability.map(|tier| tier.as_str())
            }
            _ => self.other.get(name).and_then(Value::as_str),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cost.is_none() && self.durability.is_none() && self.other.is_empty()
    }
}

/// Material-specific fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialDetails {
    pub category: Option<String>,
    pub used_in: Vec<EntityId>,
    pub related_materials: Vec<EntityId>,
}

/// Location-specific fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationDetails {
    pub location_type: Option<String>,
    pub connected_locations: Vec<EntityId>,
}

/// Character-specific fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharacterDetails {
    pub family: Vec<EntityId>,
    pub professional: Vec<EntityId>,
    pub personal: Vec<EntityId>,
}

/// Per-type typed fields.
///
/// Material, location and character records get a variant; every other type
/// is `Generic` and is reached through the raw field tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EntityDetails {
    Material(MaterialDetails),
    Location(LocationDetails),
    Character(CharacterDetails),
    #[default]
    Generic,
}

impl EntityDetails {
    /// Derive the typed view for a record of the given type.
    pub fn from_record(entity_type: &EntityType, record: &Map<String, Value>) -> Self {
        match entity_type {
            EntityType::Material => EntityDetails::Material(MaterialDetails {
                category: record
                    .get("category")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                used_in: id_list(record.get("usedIn")),
                related_materials: id_list(record.get("relatedMaterials")),
            }),
            EntityType::Location => EntityDetails::Location(LocationDetails {
                location_type: record
                    .get("locationType")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                connected_locations: id_list(record.get("connectedLocations")),
            }),
            EntityType::Character => EntityDetails::Character(CharacterDetails {
                family: id_list(record.get("family")),
                professional: id_list(record.get("professional")),
                personal: id_list(record.get("personal")),
            }),
            _ => EntityDetails::Generic,
        }
    }
}

/// Top-level fields that name related entities, in the order they are read.
/// Any entity type may carry any of them.
pub const LINK_FIELDS: [&str; 9] = [
    "usedIn",
    "requiredFor",
    "sources",
    "producedBy",
    "relatedMaterials",
    "connectedLocations",
    "family",
    "professional",
    "personal",
];

/// Ids a record declares links to through its relationship fields, tagged
/// with the field name, in `LINK_FIELDS` order.
pub fn declared_links(record: &Map<String, Value>) -> Vec<(&'static str, EntityId)> {
    LINK_FIELDS
        .iter()
        .flat_map(|&field| id_list(record.get(field)).into_iter().map(move |id| (field, id)))
        .collect()
}

fn id_list(value: Option<&Value>) -> Vec<EntityId> {
    string_list(value).into_iter().map(EntityId::from).collect()
}
