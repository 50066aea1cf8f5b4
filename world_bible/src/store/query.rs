//! Entity search over a loaded snapshot.

use crate::entities::{Entity, EntityType};

use super::EntitySnapshot;

/// Filters for [`EntitySnapshot::search`].
#[derive(Debug, Clone)]
pub struct EntityQuery {
    /// Case-insensitive substring matched against name and description.
    pub text: Option<String>,
    pub entity_type: Option<EntityType>,
    /// Matches entities carrying any of these tags.
    pub tags: Vec<String>,
    pub limit: usize,
}

impl Default for EntityQuery {
    fn default() -> Self {
        Self {
            text: None,
            entity_type: None,
            tags: Vec::new(),
            limit: 50,
        }
    }
}

impl EntityQuery {
    /// Create a query matching everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn matches(&self, entity: &Entity, needle: Option<&str>) -> bool {
        if let Some(entity_type) = &self.entity_type {
            if &entity.entity_type != entity_type {
                return false;
            }
        }

        if !self.tags.is_empty() && !self.tags.iter().any(|t| entity.tags.contains(t)) {
            return false;
        }

        match needle {
            Some(needle) => {
                entity.name.to_lowercase().contains(needle)
                    || entity.description.to_lowercase().contains(needle)
            }
            None => true,
        }
    }
}

impl EntitySnapshot {
    /// Find entities matching a query.
    ///
    /// With a text filter, name matches rank ahead of description-only
    /// matches; ties keep id order.
    pub fn search(&self, query: &EntityQuery) -> Vec<&Entity> {
        let needle = query.text.as_deref().map(str::to_lowercase);
        let needle = needle.as_deref();

        let mut results: Vec<&Entity> = self
            .iter()
            .filter(|entity| query.matches(entity, needle))
            .collect();

        if let Some(needle) = needle {
            // Stable sort, so ids stay ordered within each group.
            results.sort_by_key(|entity| !entity.name.to_lowercase().contains(needle));
        }

        results.truncate(query.limit);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EntitySnapshot {
        EntitySnapshot::from_entities([
            Entity::new("location_harbor", EntityType::Location, "Tide Harbor")
                .with_description("A bustling port")
                .with_field("tags", serde_json::json!(["coastal"])),
            Entity::new("location_tea_house", EntityType::Location, "Tea House")
                .with_description("Overlooks the harbor")
                .with_field("tags", serde_json::json!(["urban"])),
            Entity::new("faction_harbor_guild", EntityType::Faction, "Harbor Guild")
                .with_field("tags", serde_json::json!(["coastal", "trade"])),
        ])
    }

    #[test]
    fn test_search_ranks_name_matches_first() {
        let snapshot = sample();
        let found: Vec<_> = snapshot
            .search(&EntityQuery::new().with_text("HARBOR"))
            .into_iter()
            .map(|e| e.id.as_str())
            .collect();

        assert_eq!(
            found,
            vec!["faction_harbor_guild", "location_harbor", "location_tea_house"]
        );
    }

    #[test]
    fn test_search_filters_by_type_and_tag() {
        let snapshot = sample();

        let locations = snapshot.search(&EntityQuery::new().with_type(EntityType::Location));
        assert_eq!(locations.len(), 2);

        let coastal = snapshot.search(&EntityQuery::new().with_tag("coastal"));
        assert_eq!(coastal.len(), 2);

        let coastal_locations = snapshot.search(
            &EntityQuery::new()
                .with_type(EntityType::Location)
                .with_tag("coastal"),
        );
        assert_eq!(coastal_locations.len(), 1);
        assert_eq!(coastal_locations[0].id.as_str(), "location_harbor");
    }

    #[test]
    fn test_search_limit() {
        let snapshot = sample();
        assert_eq!(snapshot.search(&EntityQuery::new().with_limit(1)).len(), 1);
    }
}
