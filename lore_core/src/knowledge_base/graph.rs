//! Relationship Graph - explicit relationships plus edges synthesized from
//! field references.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

use super::{
    Reference, ReferenceExtractor, ReferenceIndex, Relationship, DEPENDENCY_TYPES, REFERENCE_TYPE,
};
use world_bible::{EntityId, EntitySnapshot};

/// Default depth limit for [`RelationshipGraph::dependency_tree`].
pub const DEFAULT_TREE_DEPTH: usize = 5;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("entity not in graph: {0}")]
    UnknownEntity(String),
}

/// Where an edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeOrigin {
    /// Declared in the relationship document.
    Explicit,
    /// Synthesized from a field holding another entity's id.
    Reference,
}

/// A directed edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub from: EntityId,
    pub to: EntityId,
    pub relationship_type: String,
    pub strength: Option<f64>,
    pub bidirectional: bool,
    pub origin: EdgeOrigin,
    /// Relationship label for explicit edges, field path for references.
    pub label: String,
}

impl Edge {
    fn explicit(relationship: &Relationship) -> Self {
        Self {
            from: relationship.from.clone(),
            to: relationship.to.clone(),
            relationship_type: relationship.relationship_type.clone(),
            strength: relationship.strength,
            bidirectional: relationship.bidirectional,
            origin: EdgeOrigin::Explicit,
            label: relationship.label(),
        }
    }

    fn reference(from: &EntityId, reference: &Reference) -> Self {
        Self {
            from: from.clone(),
            to: reference.target.clone(),
            relationship_type: REFERENCE_TYPE.to_string(),
            strength: None,
            bidirectional: false,
            origin: EdgeOrigin::Reference,
            label: reference.field_path.clone(),
        }
    }

    pub fn is_explicit(&self) -> bool {
        self.origin == EdgeOrigin::Explicit
    }
}

/// Which relationship types take part in cycle detection and dependency trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeTypeFilter {
    types: BTreeSet<String>,
}

impl EdgeTypeFilter {
    /// The dependency types: `requires`, `dependsOn`, `precedes`, `uses`.
    pub fn dependency() -> Self {
        Self::of(DEPENDENCY_TYPES)
    }

    /// A filter over an explicit set of types.
    pub fn of<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, relationship_type: &str) -> bool {
        self.types.contains(relationship_type)
    }
}

impl Default for EdgeTypeFilter {
    fn default() -> Self {
        Self::dependency()
    }
}

/// When an entity with no incoming edge still counts as linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrphanPolicy {
    /// The source of a bidirectional relationship counts as linked.
    pub bidirectional_source_is_linked: bool,
}

impl Default for OrphanPolicy {
    fn default() -> Self {
        Self {
            bidirectional_source_is_linked: true,
        }
    }
}

/// A bidirectional relationship with no reverse edge of the same type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidirectionalViolation {
    pub edge: Edge,
    pub reason: String,
}

/// A closed walk through dependency edges. The first node is repeated at
/// the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cycle(pub Vec<EntityId>);

impl Cycle {
    /// Distinct members, in walk order.
    pub fn members(&self) -> &[EntityId] {
        match self.0.split_last() {
            Some((_, members)) => members,
            None => &[],
        }
    }
}

impl std::fmt::Display for Cycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.0.iter().map(EntityId::as_str).collect();
        write!(f, "{}", ids.join(" -> "))
    }
}

/// A node in a dependency tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyNode {
    pub id: EntityId,
    /// Type of the edge leading here, `None` at the root.
    pub relationship_type: Option<String>,
    pub strength: Option<f64>,
    /// Whether the entity exists in the snapshot the graph was built from.
    pub exists: bool,
    pub dependencies: Vec<DependencyNode>,
}

/// Directed multigraph over entity ids.
///
/// Edges are stored once; adjacency indexes hold positions into the edge
/// list, so edge order is the order edges were added.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    nodes: BTreeSet<EntityId>,
    edges: Vec<Edge>,
    outgoing: HashMap<EntityId, Vec<usize>>,
    incoming: HashMap<EntityId, Vec<usize>>,
}

impl RelationshipGraph {
    /// Build the graph for a snapshot.
    pub fn build(
        snapshot: &EntitySnapshot,
        relationships: &[Relationship],
        extractor: &ReferenceExtractor,
    ) -> Self {
        Self::from_references(snapshot, relationships, &extractor.extract_all(snapshot))
    }

    /// Build the graph from references that were already extracted.
    ///
    /// Explicit edges come first, in input order. One `references` edge is
    /// added per ordered pair that no explicit edge already covers, keeping
    /// the first field path seen. Self references are ignored.
    pub fn from_references(
        snapshot: &EntitySnapshot,
        relationships: &[Relationship],
        references: &ReferenceIndex,
    ) -> Self {
        let mut graph = Self {
            nodes: snapshot.ids().cloned().collect(),
            ..Self::default()
        };

        for relationship in relationships {
            graph.add_edge(Edge::explicit(relationship));
        }

        let mut covered: HashSet<(EntityId, EntityId)> = relationships
            .iter()
            .map(|r| (r.from.clone(), r.to.clone()))
            .collect();

        for (from, found) in references {
            for reference in found {
                if &reference.target == from {
                    continue;
                }
                if covered.insert((from.clone(), reference.target.clone())) {
                    graph.add_edge(Edge::reference(from, reference));
                }
            }
        }

        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            explicit = relationships.len(),
            "built relationship graph"
        );
        graph
    }

    fn add_edge(&mut self, edge: Edge) {
        let index = self.edges.len();
        self.outgoing.entry(edge.from.clone()).or_default().push(index);
        self.incoming.entry(edge.to.clone()).or_default().push(index);
        self.edges.push(edge);
    }

    /// Check if an entity from the snapshot is a node.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges, explicit first.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges leaving an entity.
    pub fn outgoing(&self, id: &str) -> Vec<&Edge> {
        self.indexed(self.outgoing.get(id))
    }

    /// Edges arriving at an entity.
    pub fn incoming(&self, id: &str) -> Vec<&Edge> {
        self.indexed(self.incoming.get(id))
    }

    fn indexed(&self, positions: Option<&Vec<usize>>) -> Vec<&Edge> {
        positions
            .map(|positions| positions.iter().filter_map(|&i| self.edges.get(i)).collect())
            .unwrap_or_default()
    }

    /// Entities linked to this one in either direction, sorted.
    pub fn neighbors(&self, id: &str) -> Vec<&EntityId> {
        let outgoing = self.outgoing(id).into_iter().map(|e| &e.to);
        let incoming = self.incoming(id).into_iter().map(|e| &e.from);
        let linked: BTreeSet<&EntityId> = outgoing
            .chain(incoming)
            .filter(|n| n.as_str() != id)
            .collect();
        linked.into_iter().collect()
    }

    /// Explicit bidirectional edges with no explicit reverse edge of the
    /// same type.
    pub fn find_bidirectional_violations(&self) -> Vec<BidirectionalViolation> {
        let explicit: HashSet<(&EntityId, &EntityId, &str)> = self
            .edges
            .iter()
            .filter(|e| e.is_explicit())
            .map(|e| (&e.from, &e.to, e.relationship_type.as_str()))
            .collect();

        self.edges
            .iter()
            .filter(|e| e.is_explicit() && e.bidirectional)
            .filter(|e| !explicit.contains(&(&e.to, &e.from, e.relationship_type.as_str())))
            .map(|e| BidirectionalViolation {
                reason: format!(
                    "bidirectional {} relationship has no reverse edge from {} to {}",
                    e.relationship_type, e.to, e.from
                ),
                edge: e.clone(),
            })
            .collect()
    }

    /// Find cycles among edges whose type passes the filter.
    ///
    /// Depth-first from every unexplored node in id order, neighbours in id
    /// order. A node is finished once all its descendants are; the on-path
    /// set is local to the walk from each root. Every back edge yields one
    /// cycle, so a component with several loops reports each of them.
    pub fn find_cycles(&self, filter: &EdgeTypeFilter) -> Vec<Cycle> {
        let mut adjacency: BTreeMap<&EntityId, BTreeSet<&EntityId>> = BTreeMap::new();
        for edge in self.edges.iter().filter(|e| filter.matches(&e.relationship_type)) {
            adjacency.entry(&edge.from).or_default().insert(&edge.to);
        }
        let adjacency: BTreeMap<&EntityId, Vec<&EntityId>> = adjacency
            .into_iter()
            .map(|(node, targets)| (node, targets.into_iter().collect()))
            .collect();

        let mut finished: HashSet<&EntityId> = HashSet::new();
        let mut cycles = Vec::new();

        for &root in adjacency.keys() {
            if finished.contains(root) {
                continue;
            }

            // (node, index of the next neighbour to visit)
            let mut stack: Vec<(&EntityId, usize)> = vec![(root, 0)];
            let mut on_path: HashMap<&EntityId, usize> = HashMap::from([(root, 0)]);

            while let Some(&(node, next)) = stack.last() {
                let neighbours = adjacency.get(node).map(Vec::as_slice).unwrap_or_default();

                let Some(&child) = neighbours.get(next) else {
                    finished.insert(node);
                    on_path.remove(node);
                    stack.pop();
                    continue;
                };

                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }

                if let Some(&start) = on_path.get(child) {
                    let mut walk: Vec<EntityId> =
                        stack[start..].iter().map(|(n, _)| (*n).clone()).collect();
                    walk.push(child.clone());
                    cycles.push(Cycle(walk));
                } else if !finished.contains(child) {
                    on_path.insert(child, stack.len());
                    stack.push((child, 0));
                }
            }
        }

        debug!(cycles = cycles.len(), "cycle detection finished");
        cycles
    }

    /// Entities with no incoming edge, in id order.
    pub fn find_orphans(&self, policy: OrphanPolicy) -> Vec<&EntityId> {
        self.nodes
            .iter()
            .filter(|id| {
                let has_incoming = self.incoming.get(id.as_str()).is_some_and(|e| !e.is_empty());
                let bidirectional_source = policy.bidirectional_source_is_linked
                    && self
                        .outgoing(id.as_str())
                        .iter()
                        .any(|e| e.is_explicit() && e.bidirectional);
                !has_incoming && !bidirectional_source
            })
            .collect()
    }

    /// Follow outgoing edges that pass the filter, up to `max_depth` levels.
    ///
    /// A node already on the current branch is listed but not expanded
    /// again, nor is a node that is not in the snapshot.
    pub fn dependency_tree(
        &self,
        root: &str,
        max_depth: usize,
        filter: &EdgeTypeFilter,
    ) -> Result<DependencyNode, GraphError> {
        let root = self
            .nodes
            .get(root)
            .ok_or_else(|| GraphError::UnknownEntity(root.to_string()))?;

        let mut branch = vec![root];
        Ok(self.expand(root, None, max_depth, filter, &mut branch))
    }

    fn expand<'a>(
        &'a self,
        id: &'a EntityId,
        via: Option<&Edge>,
        remaining: usize,
        filter: &EdgeTypeFilter,
        branch: &mut Vec<&'a EntityId>,
    ) -> DependencyNode {
        let mut node = DependencyNode {
            id: id.clone(),
            relationship_type: via.map(|e| e.relationship_type.clone()),
            strength: via.and_then(|e| e.strength),
            exists: self.nodes.contains(id),
            dependencies: Vec::new(),
        };
        if remaining == 0 || !node.exists {
            return node;
        }

        for edge in self.outgoing(id.as_str()) {
            if !filter.matches(&edge.relationship_type) {
                continue;
            }
            if branch.contains(&&edge.to) {
                node.dependencies.push(self.expand(&edge.to, Some(edge), 0, filter, branch));
                continue;
            }
            branch.push(&edge.to);
            node.dependencies.push(self.expand(&edge.to, Some(edge), remaining - 1, filter, branch));
            branch.pop();
        }

        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_bible::{Entity, EntityType};

    fn snapshot(ids: &[&str]) -> EntitySnapshot {
        EntitySnapshot::from_entities(
            ids.iter()
                .map(|id| Entity::new(*id, EntityType::parse(EntityId::new(*id).type_prefix()), *id)),
        )
    }

    fn extractor() -> ReferenceExtractor {
        ReferenceExtractor::for_known_types().unwrap()
    }

    fn explicit_graph(ids: &[&str], relationships: &[Relationship]) -> RelationshipGraph {
        RelationshipGraph::build(&snapshot(ids), relationships, &extractor())
    }

    fn cycle_strings(cycles: &[Cycle]) -> Vec<String> {
        cycles.iter().map(Cycle::to_string).collect()
    }

    #[test]
    fn test_reference_edges_are_synthesized_once() {
        let snapshot = EntitySnapshot::from_entities([
            Entity::new("location_a", EntityType::Location, "A")
                .with_field("connectedLocations", serde_json::json!(["location_b", "location_b"]))
                .with_field("ruler", "character_c"),
            Entity::new("location_b", EntityType::Location, "B"),
        ]);
        let graph = RelationshipGraph::build(&snapshot, &[], &extractor());

        let out = graph.outgoing("location_a");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].to.as_str(), "location_b");
        assert_eq!(out[0].label, "connectedLocations[0]");
        assert_eq!(out[0].origin, EdgeOrigin::Reference);
        assert_eq!(out[1].to.as_str(), "character_c");
        assert_eq!(graph.incoming("location_b").len(), 1);
    }

    #[test]
    fn test_explicit_edge_suppresses_reference_edge() {
        let snapshot = EntitySnapshot::from_entities([
            Entity::new("location_a", EntityType::Location, "A").with_field("next", "location_b"),
            Entity::new("location_b", EntityType::Location, "B"),
        ]);
        let rel = Relationship::new("location_a", "location_b", "connectedTo");
        let graph = RelationshipGraph::build(&snapshot, &[rel], &extractor());

        assert_eq!(graph.node_count(), 2);
        assert!(graph.contains("location_b"));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges()[0].is_explicit());
    }

    #[test]
    fn test_self_reference_is_not_an_edge() {
        let snapshot = EntitySnapshot::from_entities([
            Entity::new("concept_loop", EntityType::Concept, "Loop").with_field("see", "concept_loop"),
        ]);
        let graph = RelationshipGraph::build(&snapshot, &[], &extractor());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_bidirectional_violations() {
        let graph = explicit_graph(
            &["location_a", "location_b", "location_c"],
            &[
                Relationship::new("location_a", "location_b", "connectedTo").bidirectional(),
                Relationship::new("location_b", "location_c", "connectedTo").bidirectional(),
                Relationship::new("location_c", "location_b", "connectedTo"),
            ],
        );

        let violations = graph.find_bidirectional_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].edge.from.as_str(), "location_a");
        assert!(violations[0].reason.contains("location_b to location_a"));
    }

    #[test]
    fn test_reverse_edge_of_other_type_does_not_count() {
        let graph = explicit_graph(
            &["character_a", "character_b"],
            &[
                Relationship::new("character_a", "character_b", "allyOf").bidirectional(),
                Relationship::new("character_b", "character_a", "rivalOf"),
            ],
        );
        assert_eq!(graph.find_bidirectional_violations().len(), 1);
    }

    #[test]
    fn test_reference_reverse_does_not_satisfy_bidirectional() {
        let snapshot = EntitySnapshot::from_entities([
            Entity::new("location_a", EntityType::Location, "A"),
            Entity::new("location_b", EntityType::Location, "B").with_field("next", "location_a"),
        ]);
        let rel = Relationship::new("location_a", "location_b", "connectedTo").bidirectional();
        let graph = RelationshipGraph::build(&snapshot, &[rel], &extractor());
        assert_eq!(graph.find_bidirectional_violations().len(), 1);
    }

    #[test]
    fn test_three_cycle() {
        let graph = explicit_graph(
            &["event_a", "event_b", "event_c"],
            &[
                Relationship::new("event_a", "event_b", "requires"),
                Relationship::new("event_b", "event_c", "requires"),
                Relationship::new("event_c", "event_a", "requires"),
            ],
        );

        let cycles = graph.find_cycles(&EdgeTypeFilter::dependency());
        assert_eq!(cycle_strings(&cycles), vec!["event_a -> event_b -> event_c -> event_a"]);
        assert_eq!(cycles[0].members().len(), 3);
    }

    #[test]
    fn test_dag_has_no_cycles() {
        let graph = explicit_graph(
            &[],
            &[
                Relationship::new("event_a", "event_b", "requires"),
                Relationship::new("event_a", "event_c", "requires"),
                Relationship::new("event_b", "event_d", "uses"),
                Relationship::new("event_c", "event_d", "dependsOn"),
                Relationship::new("event_d", "event_e", "precedes"),
            ],
        );
        assert!(graph.find_cycles(&EdgeTypeFilter::dependency()).is_empty());

        // One back edge closes exactly one loop.
        let mut closed = vec![
            Relationship::new("event_a", "event_b", "requires"),
            Relationship::new("event_a", "event_c", "requires"),
            Relationship::new("event_b", "event_d", "uses"),
            Relationship::new("event_c", "event_d", "dependsOn"),
            Relationship::new("event_d", "event_e", "precedes"),
        ];
        closed.push(Relationship::new("event_e", "event_b", "requires"));
        let graph = explicit_graph(&[], &closed);
        assert_eq!(
            cycle_strings(&graph.find_cycles(&EdgeTypeFilter::dependency())),
            vec!["event_b -> event_d -> event_e -> event_b"]
        );
    }

    #[test]
    fn test_cycles_do_not_leak_across_roots() {
        // a -> x, b -> x with no loop: visiting x from a must not make b's
        // walk think x is on its path.
        let graph = explicit_graph(
            &[],
            &[
                Relationship::new("event_a", "event_x", "requires"),
                Relationship::new("event_b", "event_x", "requires"),
                Relationship::new("event_x", "event_y", "requires"),
            ],
        );
        assert!(graph.find_cycles(&EdgeTypeFilter::dependency()).is_empty());
    }

    #[test]
    fn test_shared_cyclic_descendant_reported_once() {
        let graph = explicit_graph(
            &[],
            &[
                Relationship::new("event_a", "event_x", "requires"),
                Relationship::new("event_b", "event_x", "requires"),
                Relationship::new("event_x", "event_y", "requires"),
                Relationship::new("event_y", "event_x", "requires"),
            ],
        );
        assert_eq!(
            cycle_strings(&graph.find_cycles(&EdgeTypeFilter::dependency())),
            vec!["event_x -> event_y -> event_x"]
        );
    }

    #[test]
    fn test_two_cycles_through_one_root() {
        let graph = explicit_graph(
            &[],
            &[
                Relationship::new("event_a", "event_b", "requires"),
                Relationship::new("event_b", "event_a", "requires"),
                Relationship::new("event_a", "event_c", "requires"),
                Relationship::new("event_c", "event_a", "requires"),
            ],
        );
        assert_eq!(
            cycle_strings(&graph.find_cycles(&EdgeTypeFilter::dependency())),
            vec!["event_a -> event_b -> event_a", "event_a -> event_c -> event_a"]
        );
    }

    #[test]
    fn test_cycles_ignore_unfiltered_types() {
        let graph = explicit_graph(
            &[],
            &[
                Relationship::new("location_a", "location_b", "connectedTo"),
                Relationship::new("location_b", "location_a", "connectedTo"),
            ],
        );
        assert!(graph.find_cycles(&EdgeTypeFilter::dependency()).is_empty());
        assert_eq!(graph.find_cycles(&EdgeTypeFilter::of(["connectedTo"])).len(), 1);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = explicit_graph(&[], &[Relationship::new("event_a", "event_a", "precedes")]);
        assert_eq!(
            cycle_strings(&graph.find_cycles(&EdgeTypeFilter::dependency())),
            vec!["event_a -> event_a"]
        );
    }

    #[test]
    fn test_orphans_with_policy() {
        let graph = explicit_graph(
            &["location_a", "location_b", "faction_x"],
            &[Relationship::new("location_a", "location_b", "connectedTo").bidirectional()],
        );

        let linked_source = graph.find_orphans(OrphanPolicy::default());
        assert_eq!(linked_source, vec![&EntityId::new("faction_x")]);

        let strict = graph.find_orphans(OrphanPolicy {
            bidirectional_source_is_linked: false,
        });
        assert_eq!(
            strict,
            vec![&EntityId::new("faction_x"), &EntityId::new("location_a")]
        );
    }

    #[test]
    fn test_reference_edges_count_as_incoming() {
        let snapshot = EntitySnapshot::from_entities([
            Entity::new("character_a", EntityType::Character, "A").with_field("guild", "faction_x"),
            Entity::new("faction_x", EntityType::Faction, "X"),
        ]);
        let graph = RelationshipGraph::build(&snapshot, &[], &extractor());
        assert_eq!(
            graph.find_orphans(OrphanPolicy::default()),
            vec![&EntityId::new("character_a")]
        );
    }

    #[test]
    fn test_dependency_tree() {
        let graph = explicit_graph(
            &["event_a", "event_b", "event_c"],
            &[
                Relationship::new("event_a", "event_b", "requires").with_strength(0.9),
                Relationship::new("event_b", "event_c", "uses"),
                Relationship::new("event_c", "event_a", "precedes"),
                Relationship::new("event_a", "event_ghost", "requires"),
                Relationship::new("event_a", "event_c", "inspires"),
            ],
        );

        let tree = graph
            .dependency_tree("event_a", DEFAULT_TREE_DEPTH, &EdgeTypeFilter::dependency())
            .unwrap();
        assert_eq!(tree.dependencies.len(), 2);

        let b = &tree.dependencies[0];
        assert_eq!(b.id.as_str(), "event_b");
        assert_eq!(b.strength, Some(0.9));
        let c = &b.dependencies[0];
        assert_eq!(c.relationship_type.as_deref(), Some("uses"));
        // event_a is already on the branch, so it is listed but not expanded.
        assert_eq!(c.dependencies[0].id.as_str(), "event_a");
        assert!(c.dependencies[0].dependencies.is_empty());

        let ghost = &tree.dependencies[1];
        assert!(!ghost.exists);
        assert!(ghost.dependencies.is_empty());

        let shallow = graph
            .dependency_tree("event_a", 1, &EdgeTypeFilter::dependency())
            .unwrap();
        assert!(shallow.dependencies[0].dependencies.is_empty());
    }

    #[test]
    fn test_dependency_tree_unknown_root() {
        let graph = explicit_graph(&["event_a"], &[]);
        assert!(matches!(
            graph.dependency_tree("event_nope", 3, &EdgeTypeFilter::dependency()),
            Err(GraphError::UnknownEntity(id)) if id == "event_nope"
        ));
    }

    #[test]
    fn test_neighbors() {
        let graph = explicit_graph(
            &["location_a", "location_b", "location_c"],
            &[
                Relationship::new("location_b", "location_a", "connectedTo"),
                Relationship::new("location_a", "location_c", "connectedTo"),
                Relationship::new("location_c", "location_a", "connectedTo"),
            ],
        );
        let neighbors: Vec<_> = graph
            .neighbors("location_a")
            .into_iter()
            .map(EntityId::as_str)
            .collect();
        assert_eq!(neighbors, vec!["location_b", "location_c"]);
    }
}
