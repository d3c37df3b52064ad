//! Relationship Graph
//!
//! Directed, typed multi-relation graph over term identifiers. Adjacency is kept in
//! both directions as `term -> relation -> neighbors`, so walking one relation from
//! one term costs O(degree) instead of a scan over all edges. Only asserted edges
//! are stored; closure over transitive relations is computed by the query engine.

use crate::error::ReferentialError;
use crate::models::{Edge, RelationType, ANY, INHERITABLE, IS_A};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use tracing::debug;

const PART_OF: &str = "part_of";

/// Edge direction relative to the queried term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// From the term towards its parents (edge source is the term)
    Outgoing,
    /// From the term towards its children (edge target is the term)
    Incoming,
}

type Adjacency = HashMap<String, HashMap<String, BTreeSet<String>>>;

#[derive(Debug, Default)]
pub struct RelationshipGraph {
    relation_types: BTreeMap<String, RelationType>,
    outgoing: Adjacency,
    incoming: Adjacency,
    edge_count: usize,
}

impl RelationshipGraph {
    /// Create an empty graph over the given relation types
    ///
    /// `is_a` is always registered. Every declared parent relation must itself be
    /// declared.
    pub fn with_relation_types(
        types: impl IntoIterator<Item = RelationType>,
    ) -> Result<Self, ReferentialError> {
        let mut relation_types = BTreeMap::new();
        relation_types.insert(IS_A.to_string(), RelationType::is_a());
        for rel in types {
            if rel.id == IS_A {
                debug!("Keeping builtin is_a over the declared typedef");
                continue;
            }
            relation_types.insert(rel.id.clone(), rel);
        }

        for rel in relation_types.values() {
            if let Some(parent) = rel.parents.iter().find(|p| !relation_types.contains_key(*p)) {
                return Err(ReferentialError::UnknownParentRelation {
                    relation: rel.id.clone(),
                    parent: parent.clone(),
                });
            }
        }

        Ok(RelationshipGraph {
            relation_types,
            ..Default::default()
        })
    }

    /// Register a relation type that was used without a declaration
    pub(crate) fn declare_relation(&mut self, rel: RelationType) {
        self.relation_types.entry(rel.id.clone()).or_insert(rel);
    }

    /// Store one asserted edge; duplicates are ignored
    pub(crate) fn add_edge(&mut self, edge: Edge) -> bool {
        let inserted = self
            .outgoing
            .entry(edge.source.clone())
            .or_default()
            .entry(edge.relation.clone())
            .or_default()
            .insert(edge.target.clone());

        if inserted {
            self.incoming
                .entry(edge.target)
                .or_default()
                .entry(edge.relation)
                .or_default()
                .insert(edge.source);
            self.edge_count += 1;
        }
        inserted
    }

    fn adjacency(&self, direction: Direction) -> &Adjacency {
        match direction {
            Direction::Outgoing => &self.outgoing,
            Direction::Incoming => &self.incoming,
        }
    }

    /// Direct neighbors of `id` over one relation, without allocating
    pub fn neighbor_iter<'a>(
        &'a self,
        id: &str,
        relation: &str,
        direction: Direction,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.adjacency(direction)
            .get(id)
            .and_then(|by_rel| by_rel.get(relation))
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Direct neighbors of `id` over one relation
    ///
    /// Unknown terms and relations simply have no neighbors.
    pub fn neighbors(&self, id: &str, relation: &str, direction: Direction) -> BTreeSet<&str> {
        self.neighbor_iter(id, relation, direction).collect()
    }

    pub fn is_transitive(&self, relation: &str) -> bool {
        self.relation_types
            .get(relation)
            .is_some_and(|rel| rel.is_transitive)
    }

    pub fn relation_type(&self, relation: &str) -> Option<&RelationType> {
        self.relation_types.get(relation)
    }

    pub fn relation_types(&self) -> impl Iterator<Item = &RelationType> + '_ {
        self.relation_types.values()
    }

    pub fn has_relation(&self, relation: &str) -> bool {
        self.relation_types.contains_key(relation)
    }

    /// Whether an edge labelled `specific` also counts as `general`
    ///
    /// Holds when `general` is `specific` or one of its ancestors in the relation
    /// hierarchy. `inheritable` is implied by `is_a` and `part_of` (and anything
    /// below them); `any` is implied by every relation.
    pub fn relation_implies(&self, specific: &str, general: &str) -> bool {
        match general {
            ANY => true,
            INHERITABLE => {
                self.relation_implies(specific, IS_A) || self.relation_implies(specific, PART_OF)
            },
            _ => self.relation_ancestors(specific).contains(general),
        }
    }

    /// `relation` and every relation above it in the type hierarchy
    fn relation_ancestors<'a>(&'a self, relation: &'a str) -> HashSet<&'a str> {
        let mut seen = HashSet::from([relation]);
        let mut queue = VecDeque::from([relation]);
        while let Some(current) = queue.pop_front() {
            let Some(rel) = self.relation_types.get(current) else {
                continue;
            };
            for parent in &rel.parents {
                if seen.insert(parent.as_str()) {
                    queue.push_back(parent.as_str());
                }
            }
        }
        seen
    }

    /// `relation` plus every declared relation that implies it, sorted
    pub fn subrelations(&self, relation: &str) -> Vec<String> {
        let mut found: Vec<String> = self
            .relation_types
            .keys()
            .filter(|candidate| self.relation_implies(candidate, relation))
            .cloned()
            .collect();
        if !found.iter().any(|r| r == relation) {
            found.push(relation.to_string());
        }
        found.sort();
        found
    }

    /// Every asserted edge, sorted
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .outgoing
            .keys()
            .flat_map(|source| self.edges_from(source))
            .collect();
        edges.sort();
        edges
    }

    pub fn edges_from(&self, source: &str) -> Vec<Edge> {
        self.collect_edges(source, Direction::Outgoing)
    }

    pub fn edges_to(&self, target: &str) -> Vec<Edge> {
        self.collect_edges(target, Direction::Incoming)
    }

    /// Asserted edges from `source` to `target`, any relation
    pub fn edges_between(&self, source: &str, target: &str) -> Vec<Edge> {
        self.edges_from(source)
            .into_iter()
            .filter(|edge| edge.target == target)
            .collect()
    }

    fn collect_edges(&self, id: &str, direction: Direction) -> Vec<Edge> {
        let Some(by_rel) = self.adjacency(direction).get(id) else {
            return Vec::new();
        };
        let mut edges = Vec::new();
        for (relation, neighbors) in by_rel {
            for neighbor in neighbors {
                edges.push(match direction {
                    Direction::Outgoing => Edge::new(id, relation, neighbor),
                    Direction::Incoming => Edge::new(neighbor, relation, id),
                });
            }
        }
        edges.sort();
        edges
    }

    /// Terms with at least one outgoing edge of `relation`
    pub(crate) fn sources_of(&self, relation: &str) -> Vec<&str> {
        self.outgoing
            .iter()
            .filter(|(_, by_rel)| by_rel.contains_key(relation))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Whether the term takes part in any edge
    pub fn has_edges(&self, id: &str) -> bool {
        self.outgoing.contains_key(id) || self.incoming.contains_key(id)
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn regulation_types() -> Vec<RelationType> {
        let mut part_of = RelationType::new("part_of");
        part_of.is_transitive = true;
        let regulates = RelationType::new("regulates");
        let mut negatively = RelationType::new("negatively_regulates");
        negatively.parents = vec!["regulates".to_string()];
        let mut positively = RelationType::new("positively_regulates");
        positively.parents = vec!["regulates".to_string()];
        vec![part_of, regulates, negatively, positively]
    }

    #[test]
    fn test_neighbors_by_relation_and_direction() {
        let mut graph = RelationshipGraph::with_relation_types(regulation_types()).unwrap();
        graph.add_edge(Edge::new("B", "is_a", "A"));
        graph.add_edge(Edge::new("C", "is_a", "A"));
        graph.add_edge(Edge::new("C", "part_of", "B"));

        assert_eq!(graph.neighbors("C", "is_a", Direction::Outgoing), BTreeSet::from(["A"]));
        assert_eq!(
            graph.neighbors("A", "is_a", Direction::Incoming),
            BTreeSet::from(["B", "C"])
        );
        assert_eq!(graph.neighbors("C", "part_of", Direction::Outgoing), BTreeSet::from(["B"]));
        assert!(graph.neighbors("A", "part_of", Direction::Incoming).is_empty());
        assert!(graph.neighbors("missing", "is_a", Direction::Outgoing).is_empty());
    }

    #[test]
    fn test_duplicate_edges_stored_once() {
        let mut graph = RelationshipGraph::with_relation_types(Vec::new()).unwrap();
        assert!(graph.add_edge(Edge::new("B", "is_a", "A")));
        assert!(!graph.add_edge(Edge::new("B", "is_a", "A")));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges(), vec![Edge::new("B", "is_a", "A")]);
    }

    #[test]
    fn test_transitivity_flags() {
        let graph = RelationshipGraph::with_relation_types(regulation_types()).unwrap();
        assert!(graph.is_transitive("is_a"));
        assert!(graph.is_transitive("part_of"));
        assert!(!graph.is_transitive("regulates"));
        assert!(!graph.is_transitive("undeclared"));
    }

    #[test]
    fn test_relation_hierarchy() {
        let graph = RelationshipGraph::with_relation_types(regulation_types()).unwrap();

        assert!(graph.relation_implies("negatively_regulates", "regulates"));
        assert!(graph.relation_implies("regulates", "regulates"));
        assert!(!graph.relation_implies("regulates", "negatively_regulates"));
        assert!(graph.relation_implies("is_a", "inheritable"));
        assert!(graph.relation_implies("part_of", "inheritable"));
        assert!(!graph.relation_implies("regulates", "inheritable"));
        assert!(graph.relation_implies("regulates", "any"));

        assert_eq!(
            graph.subrelations("regulates"),
            vec!["negatively_regulates", "positively_regulates", "regulates"]
        );
        assert_eq!(graph.subrelations("part_of"), vec!["part_of"]);
    }

    #[test]
    fn test_unknown_parent_relation_rejected() {
        let mut rel = RelationType::new("negatively_regulates");
        rel.parents = vec!["regulates".to_string()];
        let err = RelationshipGraph::with_relation_types(vec![rel]).unwrap_err();
        assert!(matches!(err, ReferentialError::UnknownParentRelation { .. }));
    }

    #[test]
    fn test_edges_between() {
        let mut graph = RelationshipGraph::with_relation_types(regulation_types()).unwrap();
        graph.add_edge(Edge::new("B", "is_a", "A"));
        graph.add_edge(Edge::new("B", "part_of", "A"));
        graph.add_edge(Edge::new("B", "is_a", "C"));

        assert_eq!(
            graph.edges_between("B", "A"),
            vec![Edge::new("B", "is_a", "A"), Edge::new("B", "part_of", "A")]
        );
        assert!(graph.edges_between("A", "B").is_empty());
        assert_eq!(graph.edges_to("A").len(), 2);
        assert!(graph.has_edges("C"));
        assert!(!graph.has_edges("D"));
    }
}
