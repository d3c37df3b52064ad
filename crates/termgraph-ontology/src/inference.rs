//! Rule-based inference over asserted edges
//!
//! A rule `(r1, r2, r3)` reads: if `A r1 B` and `B r2 C`, then `A r3 C`. The
//! conclusion may also repeat the first or the second relation as asserted,
//! which is how `is_a` passes any relation up the hierarchy. Rules are tried in
//! order and the first match wins, so specific rules go before general ones.

use crate::error::{QueryError, QueryResult};
use crate::graph::{Direction, RelationshipGraph};
use crate::models::{normalize_relation_name, Edge, ANY, INHERITABLE, IS_A};
use crate::snapshot::Snapshot;
use crate::store::Lookup;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::debug;

/// Relation drawn by a matching rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Relation(String),
    /// The relation of the first edge, as asserted
    First,
    /// The relation of the second edge, as asserted
    Second,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub first: String,
    pub second: String,
    pub conclusion: Conclusion,
}

impl Rule {
    pub fn new(first: &str, second: &str, conclusion: Conclusion) -> Self {
        Self {
            first: first.to_string(),
            second: second.to_string(),
            conclusion,
        }
    }
}

/// Ordered ruleset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Default for Rules {
    fn default() -> Self {
        Self::gene_ontology()
    }
}

impl Rules {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The standard Gene Ontology inference rules
    pub fn gene_ontology() -> Self {
        Self::new(vec![
            Rule::new("regulates", IS_A, Conclusion::First),
            Rule::new("regulates", "part_of", Conclusion::Relation("regulates".to_string())),
            Rule::new("part_of", INHERITABLE, Conclusion::Relation("part_of".to_string())),
            Rule::new(IS_A, ANY, Conclusion::Second),
        ])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Combine two chained edges into an inferred one
    ///
    /// Returns `None` when the edges do not chain or no rule matches.
    pub fn apply(&self, graph: &RelationshipGraph, first: &Edge, second: &Edge) -> Option<Edge> {
        if first.target != second.source {
            return None;
        }
        let relation = self.conclude(graph, &first.relation, &second.relation)?;
        Some(Edge::new(first.source.as_str(), relation, second.target.as_str()))
    }

    fn conclude<'r>(&'r self, graph: &RelationshipGraph, r1: &'r str, r2: &'r str) -> Option<&'r str> {
        let rule = self.rules.iter().find(|rule| {
            graph.relation_implies(r1, &rule.first) && graph.relation_implies(r2, &rule.second)
        })?;
        Some(match &rule.conclusion {
            Conclusion::Relation(rel) => rel.as_str(),
            Conclusion::First => r1,
            Conclusion::Second => r2,
        })
    }
}

pub struct InferenceEngine<'a> {
    snapshot: &'a Snapshot,
    rules: Rules,
}

impl<'a> InferenceEngine<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self::with_rules(snapshot, Rules::default())
    }

    pub fn with_rules(snapshot: &'a Snapshot, rules: Rules) -> Self {
        Self { snapshot, rules }
    }

    /// Every object `Y` such that `subject relation Y` follows from the rules
    ///
    /// Inferred facts whose relation implies `relation` count as well, so asking
    /// for `regulates` also returns `negatively_regulates` objects.
    pub fn infer(&self, subject: &str, relation: &str) -> QueryResult<BTreeSet<String>> {
        let subject = self.resolve(subject)?;
        let relation = self.relation(relation)?;
        let graph = self.snapshot.graph();
        let store = self.snapshot.store();

        Ok(self
            .facts(subject)
            .into_iter()
            .filter(|(rel, object)| {
                graph.relation_implies(rel, &relation) && store.is_active(object)
            })
            .map(|(_, object)| object.to_string())
            .collect())
    }

    /// Whether `subject relation object` follows from the rules
    pub fn holds(&self, subject: &str, relation: &str, object: &str) -> QueryResult<bool> {
        let object = self.resolve(object)?;
        Ok(self.infer(subject, relation)?.contains(object))
    }

    /// Every subject `X` such that `X relation object` follows from the rules
    pub fn infer_subjects(&self, relation: &str, object: &str) -> QueryResult<BTreeSet<String>> {
        let object = self.resolve(object)?;
        let relation = self.relation(relation)?;
        let graph = self.snapshot.graph();

        // Only terms with some path to the object can stand in any relation to it
        let relation_ids: Vec<String> = graph.relation_types().map(|r| r.id.clone()).collect();
        let mut candidates: HashSet<&str> = HashSet::new();
        let mut queue = VecDeque::from([object]);
        while let Some(current) = queue.pop_front() {
            for rel in &relation_ids {
                for child in graph.neighbor_iter(current, rel, Direction::Incoming) {
                    if candidates.insert(child) {
                        queue.push_back(child);
                    }
                }
            }
        }

        let mut subjects = BTreeSet::new();
        for candidate in candidates {
            if !self.snapshot.store().is_active(candidate) {
                continue;
            }
            let reached = self
                .facts(candidate)
                .into_iter()
                .any(|(rel, obj)| obj == object && graph.relation_implies(rel, &relation));
            if reached {
                subjects.insert(candidate.to_string());
            }
        }
        Ok(subjects)
    }

    /// Fixpoint of (relation, object) facts about `subject`
    ///
    /// Starts from the asserted edges and extends each fact with the asserted
    /// edges of its object. The fact space is finite, so cycles terminate.
    fn facts(&self, subject: &'a str) -> HashSet<(&'a str, &'a str)> {
        let graph = self.snapshot.graph();
        let mut facts: HashSet<(&'a str, &'a str)> = HashSet::new();
        let mut queue: VecDeque<(&'a str, &'a str)> = VecDeque::new();

        for rel in graph.relation_types() {
            for object in graph.neighbor_iter(subject, &rel.id, Direction::Outgoing) {
                if facts.insert((rel.id.as_str(), object)) {
                    queue.push_back((rel.id.as_str(), object));
                }
            }
        }

        while let Some((r1, middle)) = queue.pop_front() {
            for rel in graph.relation_types() {
                for object in graph.neighbor_iter(middle, &rel.id, Direction::Outgoing) {
                    let Some(r3) = self.conclude_static(r1, rel.id.as_str()) else {
                        continue;
                    };
                    if facts.insert((r3, object)) {
                        queue.push_back((r3, object));
                    }
                }
            }
        }

        debug!(subject, facts = facts.len(), "Inference fixpoint reached");
        facts
    }

    /// Conclusion of a rule as a relation id owned by the snapshot
    fn conclude_static(&self, r1: &'a str, r2: &'a str) -> Option<&'a str> {
        let graph = self.snapshot.graph();
        let concluded = self.rules.conclude(graph, r1, r2)?;
        // Fixed conclusions are rule-owned strings; map them onto the graph's copy
        graph
            .relation_type(concluded)
            .map(|rel| rel.id.as_str())
            .or_else(|| {
                debug!(relation = concluded, "Rule concludes an undeclared relation");
                None
            })
    }

    fn resolve(&self, id: &str) -> QueryResult<&'a str> {
        self.snapshot
            .store()
            .resolve(id, Lookup::Active)
            .map(|term| term.id.as_str())
    }

    fn relation(&self, relation: &str) -> QueryResult<String> {
        let relation = normalize_relation_name(relation);
        let known = relation == ANY
            || relation == INHERITABLE
            || self.snapshot.graph().has_relation(&relation);
        if known {
            Ok(relation)
        } else {
            Err(QueryError::UnknownRelation(relation))
        }
    }
}
