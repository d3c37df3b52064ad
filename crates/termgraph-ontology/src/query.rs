//! Query Engine
//!
//! Typed traversals over one immutable [`Snapshot`]. Every query is a pure
//! function of the snapshot: no locks, no I/O, no caching.
//!
//! Transitive relations are walked breadth-first with a visited set, so cyclic
//! input terminates. Non-transitive relations only ever yield direct neighbors.
//!
//! Walks pass through obsolete terms but never report them unless
//! [`QueryOptions::include_obsolete`] is set.
//!
//! ```no_run
//! # use termgraph_ontology::Snapshot;
//! # fn demo(snapshot: &Snapshot) -> Result<(), termgraph_ontology::QueryError> {
//! let query = snapshot.query();
//! let parents = query.ancestors_sorted("GO:0005764", "part_of")?;
//! let is_process = query.is_a("GO:0006350", "GO:0008150")?;
//! # Ok(())
//! # }
//! ```

use crate::error::{QueryError, QueryResult};
use crate::graph::Direction;
use crate::models::{normalize_relation_name, Edge, Namespace, Term, IS_A};
use crate::snapshot::Snapshot;
use crate::store::Lookup;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Traversal options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Also follow every relation that implies the queried one
    /// (e.g., `negatively_regulates` when asking for `regulates`)
    pub include_subrelations: bool,
    /// Accept an obsolete start term and report obsolete terms reached
    pub include_obsolete: bool,
}

impl QueryOptions {
    pub fn with_subrelations() -> Self {
        Self {
            include_subrelations: true,
            ..Self::default()
        }
    }

    fn lookup(self) -> Lookup {
        Lookup::from_flag(self.include_obsolete)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> QueryEngine<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Terms reachable over outgoing edges of `relation`
    pub fn ancestors(&self, id: &str, relation: &str) -> QueryResult<HashSet<String>> {
        self.ancestors_with(id, relation, QueryOptions::default())
    }

    /// Terms reachable over incoming edges of `relation`
    pub fn descendants(&self, id: &str, relation: &str) -> QueryResult<HashSet<String>> {
        self.descendants_with(id, relation, QueryOptions::default())
    }

    pub fn ancestors_with(
        &self,
        id: &str,
        relation: &str,
        options: QueryOptions,
    ) -> QueryResult<HashSet<String>> {
        self.closure(id, relation, Direction::Outgoing, options)
    }

    pub fn descendants_with(
        &self,
        id: &str,
        relation: &str,
        options: QueryOptions,
    ) -> QueryResult<HashSet<String>> {
        self.closure(id, relation, Direction::Incoming, options)
    }

    pub fn ancestors_sorted(&self, id: &str, relation: &str) -> QueryResult<Vec<String>> {
        self.ancestors(id, relation).map(sorted)
    }

    pub fn descendants_sorted(&self, id: &str, relation: &str) -> QueryResult<Vec<String>> {
        self.descendants(id, relation).map(sorted)
    }

    /// BFS frontiers from `id`, nearest first, each level sorted
    ///
    /// A non-transitive relation produces at most one level.
    pub fn levels(
        &self,
        id: &str,
        relation: &str,
        direction: Direction,
        options: QueryOptions,
    ) -> QueryResult<Vec<Vec<String>>> {
        let root = self.root_with(id, options.lookup())?;
        let (relations, transitive) = self.relations(relation, options)?;

        let mut visited: HashSet<&str> = HashSet::new();
        let mut frontier = vec![root];
        let mut levels = Vec::new();

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for current in frontier {
                for rel in &relations {
                    for neighbor in self.snapshot.graph().neighbor_iter(current, rel, direction) {
                        if visited.insert(neighbor) {
                            next.push(neighbor);
                        }
                    }
                }
            }
            if next.is_empty() {
                break;
            }

            let mut level: Vec<String> = next
                .iter()
                .filter(|id| self.reportable(id, options))
                .map(|s| s.to_string())
                .collect();
            level.sort();
            if !level.is_empty() {
                levels.push(level);
            }

            if !transitive {
                break;
            }
            frontier = next;
        }

        Ok(levels)
    }

    /// Whether `id` is a `candidate`, directly or transitively
    ///
    /// Every non-obsolete term `is_a` itself. Both ids may be alternate ids.
    /// Obsolete terms on the way are walked through, as in [`Self::ancestors`].
    pub fn is_a(&self, id: &str, candidate: &str) -> QueryResult<bool> {
        let root = self.root(id)?;
        let target = self.root(candidate)?;
        if root == target {
            return Ok(true);
        }

        let graph = self.snapshot.graph();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            for parent in graph.neighbor_iter(current, IS_A, Direction::Outgoing) {
                if parent == target {
                    return Ok(true);
                }
                if visited.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }
        Ok(false)
    }

    /// Asserted edges from `subject` to `object`, over any relation
    pub fn relationships(&self, subject: &str, object: &str) -> QueryResult<Vec<Edge>> {
        let subject = self.root(subject)?;
        let object = self.root(object)?;
        Ok(self.snapshot.graph().edges_between(subject, object))
    }

    /// Non-obsolete terms of `namespace` without an `is_a` parent
    pub fn roots(&self, namespace: Namespace) -> Vec<&'a Term> {
        let graph = self.snapshot.graph();
        self.snapshot
            .store()
            .in_namespace(namespace)
            .filter(|term| {
                graph
                    .neighbor_iter(&term.id, IS_A, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .collect()
    }

    /// Non-obsolete terms that take part in no edge at all
    pub fn orphans(&self) -> Vec<&'a Term> {
        let graph = self.snapshot.graph();
        self.snapshot
            .store()
            .all()
            .filter(|term| !graph.has_edges(&term.id))
            .collect()
    }

    fn root(&self, id: &str) -> QueryResult<&'a str> {
        self.root_with(id, Lookup::Active)
    }

    fn root_with(&self, id: &str, lookup: Lookup) -> QueryResult<&'a str> {
        self.snapshot
            .store()
            .resolve(id, lookup)
            .map(|term| term.id.as_str())
    }

    fn reportable(&self, id: &str, options: QueryOptions) -> bool {
        options.include_obsolete || self.snapshot.store().is_active(id)
    }

    /// Relations to follow, and whether the walk is transitive
    fn relations(&self, relation: &str, options: QueryOptions) -> QueryResult<(Vec<String>, bool)> {
        let graph = self.snapshot.graph();
        let relation = normalize_relation_name(relation);
        if !graph.has_relation(&relation) {
            return Err(QueryError::UnknownRelation(relation));
        }

        let transitive = graph.is_transitive(&relation);
        let relations = if options.include_subrelations {
            graph.subrelations(&relation)
        } else {
            vec![relation]
        };
        Ok((relations, transitive))
    }

    fn closure(
        &self,
        id: &str,
        relation: &str,
        direction: Direction,
        options: QueryOptions,
    ) -> QueryResult<HashSet<String>> {
        let root = self.root_with(id, options.lookup())?;
        let (relations, transitive) = self.relations(relation, options)?;
        let graph = self.snapshot.graph();

        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            for rel in &relations {
                for neighbor in graph.neighbor_iter(current, rel, direction) {
                    if visited.insert(neighbor) && transitive {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        Ok(visited
            .into_iter()
            .filter(|id| self.reportable(id, options))
            .map(str::to_string)
            .collect())
    }
}

fn sorted(set: HashSet<String>) -> Vec<String> {
    let mut ids: Vec<String> = set.into_iter().collect();
    ids.sort();
    ids
}
