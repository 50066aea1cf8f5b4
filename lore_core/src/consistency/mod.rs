//! Consistency Engine - runs every integrity check over one snapshot.
//!
//! The checks are independent and all of them always run:
//! 1. **Schema validation**: every entity against its type's schema
//! 2. **Referential integrity**: both endpoints of every explicit relationship exist
//! 3. **Bidirectional consistency**: bidirectional relationships have a reverse edge
//! 4. **Cycle detection**: loops among dependency-style edges
//! 5. **Orphan detection**: entities nothing links to
//! 6. **Duplicate names**: one name used by entities of different types
//! 7. **Property contradictions**: declared tiers that referring prose disputes
//! 8. **Orphaned references**: reference fields naming entities that do not exist
//! 9. **Missing graph relationships**: relationship fields with no explicit edge
//!
//! Issues are sorted before they are reported, so output never depends on
//! check order.

mod contradiction;
mod issue;

pub use contradiction::*;
pub use issue::*;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::IntegrityConfig;
use crate::knowledge_base::{
    EdgeTypeFilter, OrphanPolicy, ReferenceExtractor, ReferenceIndex, Relationship,
    RelationshipGraph,
};
use world_bible::{EntityId, EntitySnapshot, EntityType, SchemaRegistry, ValidationResult};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid entity type prefixes: {0}")]
    ReferencePattern(#[source] regex::Error),

    #[error("invalid contradiction keywords: {0}")]
    ContradictionPattern(#[source] regex::Error),
}

/// Runs the checks. Holds only compiled configuration, so one engine can
/// check any number of snapshots.
#[derive(Debug, Clone)]
pub struct ConsistencyEngine {
    extractor: ReferenceExtractor,
    cycle_filter: EdgeTypeFilter,
    orphan_policy: OrphanPolicy,
    contradictions: ContradictionMatcher,
}

impl ConsistencyEngine {
    /// Create an engine from a run configuration.
    pub fn new(config: &IntegrityConfig) -> Result<Self, EngineError> {
        let extractor = ReferenceExtractor::new(config.entity_types.iter().cloned())
            .map_err(EngineError::ReferencePattern)?;
        let contradictions = ContradictionMatcher::new(&config.contradictions)
            .map_err(EngineError::ContradictionPattern)?;

        Ok(Self {
            extractor,
            cycle_filter: EdgeTypeFilter::of(config.dependency_types.iter().cloned()),
            orphan_policy: config.orphans,
            contradictions,
        })
    }

    /// Create an engine with the default configuration.
    pub fn with_defaults() -> Result<Self, EngineError> {
        Self::new(&IntegrityConfig::default())
    }

    pub fn extractor(&self) -> &ReferenceExtractor {
        &self.extractor
    }

    /// Check a snapshot.
    ///
    /// `relationships` is the explicit relationship list, if one was
    /// supplied. Without one, the graph holds only reference edges and the
    /// missing-graph-relationship check is skipped.
    pub fn run(
        &self,
        snapshot: &EntitySnapshot,
        registry: &SchemaRegistry,
        relationships: Option<&[Relationship]>,
    ) -> Report {
        let explicit = relationships.unwrap_or_default();
        let references = self.extractor.extract_all(snapshot);
        let graph = RelationshipGraph::from_references(snapshot, explicit, &references);

        let mut issues = Vec::new();

        // Step 1: Schema validation
        let valid = check_schemas(snapshot, registry, &mut issues);

        // Step 2: Referential integrity
        check_endpoints(snapshot, explicit, &mut issues);

        // Step 3: Bidirectional consistency
        for violation in graph.find_bidirectional_violations() {
            let edge = violation.edge;
            issues.push(
                Issue::new(
                    IssueKind::MissingBidirectionalPair,
                    vec![edge.from, edge.to],
                    violation.reason,
                )
                .with_relationship(edge.label),
            );
        }

        // Step 4: Cycle detection
        for cycle in graph.find_cycles(&self.cycle_filter) {
            let message = format!("dependency cycle: {}", cycle);
            issues.push(Issue::new(
                IssueKind::DependencyCycle,
                cycle.members().to_vec(),
                message,
            ));
        }

        // Step 5: Orphan detection
        for id in graph.find_orphans(self.orphan_policy) {
            let name = snapshot.get(id.as_str()).map_or(id.as_str(), |e| e.display_name());
            issues.push(Issue::new(
                IssueKind::OrphanedEntity,
                vec![id.clone()],
                format!("{} ({}) has no incoming relationships", name, id),
            ));
        }

        // Step 6: Duplicate names
        check_duplicate_names(snapshot, &mut issues);

        // Step 7: Property contradictions
        self.check_contradictions(snapshot, &references, &mut issues);

        // Step 8: Orphaned references
        check_reference_targets(snapshot, &references, &mut issues);

        // Step 9: Missing graph relationships
        if relationships.is_some() {
            check_declared_links(snapshot, explicit, &mut issues);
        }

        let load_errors = snapshot.load_errors().iter().map(ToString::to_string).collect();
        let report = Report::new(issues, snapshot.len(), valid, explicit.len(), load_errors);

        info!(
            entities = report.summary.total_entities,
            relationships = report.summary.total_relationships,
            issues = report.summary.total_issues,
            critical = report.summary.critical,
            high = report.summary.high,
            status = ?report.status(),
            "consistency check finished"
        );
        report
    }

    /// Referring descriptions are checked against the declared properties
    /// of the entities they reference. A holder's own description is not.
    fn check_contradictions(
        &self,
        snapshot: &EntitySnapshot,
        references: &ReferenceIndex,
        issues: &mut Vec<Issue>,
    ) {
        if self.contradictions.is_empty() {
            return;
        }

        let before = issues.len();
        for referrer in snapshot.iter() {
            if referrer.description.trim().is_empty() {
                continue;
            }

            let targets: BTreeSet<&EntityId> = references
                .get(&referrer.id)
                .into_iter()
                .flatten()
                .map(|r| &r.target)
                .filter(|target| *target != &referrer.id)
                .collect();

            for holder in targets.into_iter().filter_map(|t| snapshot.get(t.as_str())) {
                for found in self.contradictions.find(holder, &referrer.description) {
                    let rule = found.rule;
                    issues.push(
                        Issue::new(
                            IssueKind::PropertyContradiction,
                            vec![holder.id.clone(), referrer.id.clone()],
                            format!(
                                "{} declares {} \"{}\" but {} describes it with \"{}\"",
                                holder.id, rule.property, rule.value, referrer.id, found.keyword
                            ),
                        )
                        .with_field(format!("properties.{}", rule.property)),
                    );
                }
            }
        }
        debug!(check = "contradictions", issues = issues.len() - before, "check finished");
    }
}

/// Returns the number of valid entities.
fn check_schemas(
    snapshot: &EntitySnapshot,
    registry: &SchemaRegistry,
    issues: &mut Vec<Issue>,
) -> usize {
    let mut valid = 0;
    for entity in snapshot.iter() {
        match registry.validate(entity) {
            ValidationResult::Valid => valid += 1,
            ValidationResult::Invalid(violations) => {
                let details: Vec<String> = violations.iter().map(ToString::to_string).collect();
                issues.push(Issue::new(
                    IssueKind::InvalidEntity,
                    vec![entity.id.clone()],
                    format!("{} failed schema validation: {}", entity.id, details.join("; ")),
                ));
            }
            ValidationResult::UnknownType(entity_type) => {
                issues.push(Issue::new(
                    IssueKind::UnknownEntityType,
                    vec![entity.id.clone()],
                    format!("{} has unknown entity type `{}`", entity.id, entity_type),
                ));
            }
        }
    }
    debug!(check = "schemas", valid, invalid = snapshot.len() - valid, "check finished");
    valid
}

fn check_endpoints(
    snapshot: &EntitySnapshot,
    relationships: &[Relationship],
    issues: &mut Vec<Issue>,
) {
    let before = issues.len();
    for relationship in relationships {
        let label = relationship.label();
        let (from, to) = (&relationship.from, &relationship.to);

        if !snapshot.contains(from.as_str()) {
            issues.push(
                Issue::new(
                    IssueKind::MissingEntity,
                    vec![from.clone(), to.clone()],
                    format!("relationship {} starts at missing entity {}", label, from),
                )
                .with_relationship(label.clone()),
            );
        }
        if !snapshot.contains(to.as_str()) {
            issues.push(
                Issue::new(
                    IssueKind::MissingEntity,
                    vec![to.clone(), from.clone()],
                    format!("relationship {} points to missing entity {}", label, to),
                )
                .with_relationship(label),
            );
        }
    }
    debug!(check = "endpoints", issues = issues.len() - before, "check finished");
}

/// Names are compared trimmed and case-folded. Unnamed entities are skipped.
fn check_duplicate_names(snapshot: &EntitySnapshot, issues: &mut Vec<Issue>) {
    let mut by_name: BTreeMap<String, Vec<(&EntityId, &EntityType)>> = BTreeMap::new();
    for entity in snapshot.iter() {
        let name = entity.name.trim().to_lowercase();
        if !name.is_empty() {
            by_name.entry(name).or_default().push((&entity.id, &entity.entity_type));
        }
    }

    for (name, holders) in by_name {
        let types: BTreeSet<&EntityType> = holders.iter().map(|(_, t)| *t).collect();
        if types.len() < 2 {
            continue;
        }
        let listed: Vec<String> = holders
            .iter()
            .map(|(id, t)| format!("{} ({})", id, t))
            .collect();
        issues.push(Issue::new(
            IssueKind::DuplicateNameConflictingType,
            holders.iter().map(|(id, _)| (*id).clone()).collect(),
            format!(
                "name \"{}\" is used by entities of different types: {}",
                name,
                listed.join(", ")
            ),
        ));
    }
}

fn check_reference_targets(
    snapshot: &EntitySnapshot,
    references: &ReferenceIndex,
    issues: &mut Vec<Issue>,
) {
    let before = issues.len();
    for (from, found) in references {
        for reference in found.iter().filter(|r| !snapshot.contains(r.target.as_str())) {
            issues.push(
                Issue::new(
                    IssueKind::OrphanedReference,
                    vec![from.clone(), reference.target.clone()],
                    format!(
                        "{} references missing {} {} in {}",
                        from, reference.target_type, reference.target, reference.field_path
                    ),
                )
                .with_field(reference.field_path.clone()),
            );
        }
    }
    debug!(check = "references", issues = issues.len() - before, "check finished");
}

fn check_declared_links(
    snapshot: &EntitySnapshot,
    relationships: &[Relationship],
    issues: &mut Vec<Issue>,
) {
    let explicit: HashSet<(&EntityId, &EntityId)> =
        relationships.iter().map(|r| (&r.from, &r.to)).collect();

    let before = issues.len();
    for entity in snapshot.iter() {
        let mut seen = HashSet::new();
        for (field, target) in entity.declared_links() {
            if target == entity.id
                || !snapshot.contains(target.as_str())
                || explicit.contains(&(&entity.id, &target))
                || !seen.insert((field, target.clone()))
            {
                continue;
            }
            issues.push(
                Issue::new(
                    IssueKind::MissingGraphRelationship,
                    vec![entity.id.clone(), target.clone()],
                    format!(
                        "{} lists {} in {} but no relationship {} -> {} exists",
                        entity.id, target, field, entity.id, target
                    ),
                )
                .with_field(field),
            );
        }
    }
    debug!(check = "declared-links", issues = issues.len() - before, "check finished");
}
