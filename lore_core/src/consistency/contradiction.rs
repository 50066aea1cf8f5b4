//! Keyword heuristics for declared properties that prose contradicts.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use world_bible::Entity;

/// A declared property value and the words that contradict it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContradictionRule {
    /// Name under the record's `properties` block, e.g. `cost`.
    pub property: String,
    pub value: String,
    pub keywords: Vec<String>,
}

impl ContradictionRule {
    pub fn new<I, S>(property: impl Into<String>, value: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            property: property.into(),
            value: value.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// The rules used when none are configured.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("cost", "premium", ["cheap", "inexpensive"]),
            Self::new("cost", "cheap", ["premium", "luxurious", "expensive"]),
            Self::new("durability", "very-high", ["fragile", "delicate", "weak"]),
        ]
    }
}

/// A rule that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contradiction<'a> {
    pub rule: &'a ContradictionRule,
    /// The keyword as written in the description.
    pub keyword: String,
}

/// Compiled rules. Keywords match whole words, ignoring case.
#[derive(Debug, Clone)]
pub struct ContradictionMatcher {
    rules: Vec<(ContradictionRule, Regex)>,
}

impl ContradictionMatcher {
    pub fn new(rules: &[ContradictionRule]) -> Result<Self, regex::Error> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules.iter().filter(|r| !r.keywords.is_empty()) {
            let alternatives: Vec<_> = rule.keywords.iter().map(|k| regex::escape(k)).collect();
            let pattern = RegexBuilder::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
                .case_insensitive(true)
                .build()?;
            compiled.push((rule.clone(), pattern));
        }
        Ok(Self { rules: compiled })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose property the holder declares with the rule's value and
    /// whose keywords occur in `text`. Reports the first keyword per rule.
    pub fn find<'a>(&'a self, holder: &Entity, text: &str) -> Vec<Contradiction<'a>> {
        self.rules
            .iter()
            .filter(|(rule, _)| {
                holder.properties.value_of(&rule.property) == Some(rule.value.as_str())
            })
            .filter_map(|(rule, pattern)| {
                pattern.find(text).map(|found| Contradiction {
                    rule,
                    keyword: found.as_str().to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use world_bible::EntityType;

    fn hinoki(cost: &str) -> Entity {
        Entity::new("material_hinoki", EntityType::Material, "Hinoki")
            .with_field("properties", json!({ "cost": cost, "durability": "very-high" }))
    }

    fn matcher() -> ContradictionMatcher {
        ContradictionMatcher::new(&ContradictionRule::defaults()).unwrap()
    }

    #[test]
    fn test_keyword_contradicts_declared_value() {
        let matcher = matcher();
        let found = matcher.find(&hinoki("premium"), "Built from Cheap local timber.");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule.property, "cost");
        assert_eq!(found[0].keyword, "Cheap");
    }

    #[test]
    fn test_whole_words_only() {
        let matcher = matcher();
        assert!(matcher.find(&hinoki("premium"), "A cheapskate's dream").is_empty());
        assert!(matcher.find(&hinoki("premium"), "weakness is not mentioned").is_empty());
    }

    #[test]
    fn test_value_must_match() {
        let matcher = matcher();
        assert!(matcher.find(&hinoki("moderate"), "cheap and plentiful").is_empty());
    }

    #[test]
    fn test_several_rules_can_fire() {
        let matcher = matcher();
        let found = matcher.find(&hinoki("premium"), "Inexpensive, but fragile in damp air.");
        let properties: Vec<_> = found.iter().map(|c| c.rule.property.as_str()).collect();
        assert_eq!(properties, vec!["cost", "durability"]);
    }

    #[test]
    fn test_rules_without_keywords_are_dropped() {
        let rules = vec![ContradictionRule::new("cost", "premium", Vec::<String>::new())];
        assert!(ContradictionMatcher::new(&rules).unwrap().is_empty());
        assert_eq!(matcher().len(), 3);
    }
}
