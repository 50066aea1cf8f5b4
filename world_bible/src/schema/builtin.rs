//! Built-in schema documents for the known entity types.

use serde_json::{json, Value};

use crate::entities::{CostTier, DurabilityTier, EntityType};

/// The JSON Schema document for a known entity type.
///
/// Every type shares the identity fields; types with typed details add
/// constraints on the fields those details read.
pub(super) fn schema_document(entity_type: &EntityType) -> Value {
    let name = entity_type.as_str();
    let mut document = json!({
        "title": title_case(name),
        "type": "object",
        "required": ["id", "type", "name", "description"],
        "properties": {
            "id": { "type": "string", "pattern": format!("^{}_[a-z0-9_-]+$", name) },
            "type": { "const": name },
            "name": { "type": "string", "minLength": 1 },
            "description": { "type": "string" },
            "tags": { "type": "array", "items": { "type": "string" } }
        }
    });

    let extra = match entity_type {
        EntityType::Material => json!({
            "category": { "type": "string" },
            "properties": {
                "type": "object",
                "properties": {
                    "cost": { "enum": CostTier::ALL.map(|t| t.as_str()) },
                    "durability": { "enum": DurabilityTier::ALL.map(|t| t.as_str()) }
                }
            },
            "usedIn": id_list("[a-z]+"),
            "relatedMaterials": id_list("material")
        }),
        EntityType::Location => json!({
            "locationType": { "type": "string" },
            "connectedLocations": id_list("location")
        }),
        EntityType::Character => json!({
            "family": id_list("character"),
            "professional": id_list("[a-z]+"),
            "personal": id_list("[a-z]+")
        }),
        _ => json!({}),
    };

    if let (Some(properties), Value::Object(extra)) = (
        document.get_mut("properties").and_then(Value::as_object_mut),
        extra,
    ) {
        properties.extend(extra);
    }

    document
}

fn id_list(prefix: &str) -> Value {
    json!({
        "type": "array",
        "items": { "type": "string", "pattern": format!("^{}_[a-z0-9_-]+$", prefix) }
    })
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
