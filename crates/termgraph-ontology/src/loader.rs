//! Ontology Loader
//!
//! Builds a [`Snapshot`] from OBO text in two passes. The first pass creates every
//! term and relation type; edge declarations are deferred because a term may point
//! at a target defined further down the file. The second pass resolves each
//! deferred edge against the complete term set. Any failure aborts the whole load.

use crate::config::LoaderConfig;
use crate::error::{LoadError, ReferentialError, Result};
use crate::graph::{Direction, RelationshipGraph};
use crate::models::{Edge, RelationType};
use crate::parser::{OboParser, ParsedObo, PendingLink};
use crate::snapshot::{CycleWarning, Snapshot, SnapshotInfo};
use crate::store::TermStore;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;
use termgraph_common::checksum::sha256_hex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct OntologyLoader {
    config: LoaderConfig,
}

impl OntologyLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Build a snapshot from OBO text on the current thread
    pub fn load(&self, source: &str, cancel: &CancellationToken) -> Result<Snapshot> {
        let started = Instant::now();

        let ParsedObo {
            header,
            terms,
            typedefs,
        } = OboParser::parse(source, cancel)?;

        // Pass 1: terms and relation types; edges wait for the full term set
        let mut pending: Vec<(String, Vec<PendingLink>)> = Vec::with_capacity(terms.len());
        let mut term_list = Vec::with_capacity(terms.len());
        for parsed in terms {
            pending.push((parsed.term.id.clone(), parsed.links));
            term_list.push(parsed.term);
        }

        let store = TermStore::from_terms(term_list)?;
        check_typedef_ids(&typedefs)?;
        let mut graph = RelationshipGraph::with_relation_types(typedefs)?;

        debug!(
            terms = store.len(),
            relation_types = graph.relation_types().count(),
            "Term pass complete"
        );

        // Pass 2: resolve every deferred edge
        for (source_id, links) in pending {
            if cancel.is_cancelled() {
                info!("Ontology load cancelled during edge resolution");
                return Err(LoadError::Cancelled);
            }
            for link in links {
                let edge = self.resolve_link(&store, &mut graph, &source_id, link)?;
                graph.add_edge(edge);
            }
        }

        let cycle_warnings = if self.config.detect_cycles {
            find_cycles(&graph)
        } else {
            Vec::new()
        };
        for cycle in &cycle_warnings {
            warn!(
                relation = %cycle.relation,
                members = ?cycle.members,
                "Cycle detected in transitive relation"
            );
        }

        let info = SnapshotInfo {
            id: uuid::Uuid::new_v4(),
            format_version: header.format_version,
            data_version: header.data_version,
            ontology: header.ontology,
            source_checksum: sha256_hex(source),
            loaded_at: chrono::Utc::now(),
            term_count: store.active_len(),
            obsolete_count: store.len() - store.active_len(),
            edge_count: graph.edge_count(),
            relation_type_count: graph.relation_types().count(),
            cycle_warnings,
        };

        info!(
            snapshot = %info.id,
            terms = info.term_count,
            obsolete = info.obsolete_count,
            edges = info.edge_count,
            relation_types = info.relation_type_count,
            cycles = info.cycle_warnings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Ontology loaded"
        );

        Ok(Snapshot::new(store, graph, info))
    }

    /// Build a snapshot on a blocking worker thread
    pub async fn load_text(&self, source: String, cancel: &CancellationToken) -> Result<Snapshot> {
        let loader = self.clone();
        let token = cancel.clone();
        tokio::task::spawn_blocking(move || loader.load(&source, &token)).await?
    }

    /// Read an OBO file and build a snapshot from it
    ///
    /// The read races against `cancel`; parsing then runs on a blocking worker.
    pub async fn load_path(
        &self,
        path: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<Snapshot> {
        let path = path.as_ref();
        info!(path = %path.display(), "Reading ontology source");

        let source = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(path = %path.display(), "Ontology read cancelled");
                return Err(LoadError::Cancelled);
            },
            read = tokio::fs::read_to_string(path) => read?,
        };

        self.load_text(source, cancel).await
    }

    fn resolve_link(
        &self,
        store: &TermStore,
        graph: &mut RelationshipGraph,
        source_id: &str,
        link: PendingLink,
    ) -> std::result::Result<Edge, ReferentialError> {
        if !graph.has_relation(&link.relation) {
            if self.config.strict_relation_types {
                return Err(ReferentialError::UnknownRelationType {
                    term: source_id.to_string(),
                    relation: link.relation,
                });
            }
            warn!(
                relation = %link.relation,
                term = %source_id,
                line = link.line,
                "Registering undeclared relation type as non-transitive"
            );
            graph.declare_relation(RelationType::new(link.relation.clone()));
        }

        let target = if store.contains(&link.target) {
            Some(link.target.clone())
        } else if self.config.resolve_alt_id_targets {
            store.canonical_id(&link.target).map(str::to_string)
        } else {
            None
        };

        match target {
            Some(target) => {
                if target != link.target {
                    debug!(alt_id = %link.target, canonical = %target, "Edge target given as alt_id");
                }
                Ok(Edge::new(source_id, link.relation, target))
            },
            None => Err(ReferentialError::UnresolvedTarget {
                source_id: source_id.to_string(),
                relation: link.relation,
                target: link.target,
            }),
        }
    }
}

fn check_typedef_ids(typedefs: &[RelationType]) -> std::result::Result<(), ReferentialError> {
    let mut seen = HashSet::new();
    for rel in typedefs {
        if !seen.insert(rel.id.as_str()) {
            return Err(ReferentialError::DuplicateId(rel.id.clone()));
        }
    }
    Ok(())
}

// ============================================================================
// Cycle detection
// ============================================================================

/// Strongly connected components with more than one member (or a self loop)
/// in `is_a` and every transitive relation
pub(crate) fn find_cycles(graph: &RelationshipGraph) -> Vec<CycleWarning> {
    let mut warnings = Vec::new();
    for rel in graph.relation_types().filter(|r| r.is_transitive) {
        for members in strongly_connected(graph, &rel.id) {
            let self_loop = members.len() == 1
                && graph
                    .neighbor_iter(members[0], &rel.id, Direction::Outgoing)
                    .any(|n| n == members[0]);
            if members.len() > 1 || self_loop {
                let mut members: Vec<String> = members.into_iter().map(str::to_string).collect();
                members.sort();
                warnings.push(CycleWarning {
                    relation: rel.id.clone(),
                    members,
                });
            }
        }
    }
    warnings
}

/// Tarjan's algorithm, iterative so deep hierarchies cannot overflow the stack
fn strongly_connected<'a>(graph: &'a RelationshipGraph, relation: &str) -> Vec<Vec<&'a str>> {
    let mut nodes = graph.sources_of(relation);
    nodes.sort_unstable();

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut lowlink: HashMap<&str, usize> = HashMap::new();
    let mut on_stack: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = Vec::new();
    let mut components = Vec::new();
    let mut next_index = 0;

    for start in nodes {
        if index.contains_key(start) {
            continue;
        }

        let mut work: Vec<(&str, Vec<&str>, usize)> = Vec::new();
        index.insert(start, next_index);
        lowlink.insert(start, next_index);
        next_index += 1;
        stack.push(start);
        on_stack.insert(start);
        work.push((
            start,
            graph.neighbor_iter(start, relation, Direction::Outgoing).collect(),
            0,
        ));

        while let Some(frame) = work.last_mut() {
            let node = frame.0;
            if frame.2 < frame.1.len() {
                let next = frame.1[frame.2];
                frame.2 += 1;

                if !index.contains_key(next) {
                    index.insert(next, next_index);
                    lowlink.insert(next, next_index);
                    next_index += 1;
                    stack.push(next);
                    on_stack.insert(next);
                    work.push((
                        next,
                        graph.neighbor_iter(next, relation, Direction::Outgoing).collect(),
                        0,
                    ));
                } else if on_stack.contains(next) {
                    let low = lowlink[node].min(index[next]);
                    lowlink.insert(node, low);
                }
                continue;
            }

            work.pop();
            if let Some(parent) = work.last() {
                let low = lowlink[parent.0].min(lowlink[node]);
                lowlink.insert(parent.0, low);
            }

            if lowlink[node] == index[node] {
                let mut component = Vec::new();
                while let Some(member) = stack.pop() {
                    on_stack.remove(member);
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }

    components
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::Lookup;

    const HEADER: &str = "format-version: 1.2\ndefault-namespace: biological_process\n\n";

    fn load(body: &str) -> Result<Snapshot> {
        OntologyLoader::default().load(&format!("{HEADER}{body}"), &CancellationToken::new())
    }

    fn term(id: &str, extra: &str) -> String {
        format!("[Term]\nid: {id}\nname: {id} name\n{extra}\n")
    }

    #[test]
    fn test_forward_references_resolve() {
        let body = [
            term("A", "is_a: B ! defined later"),
            term("B", "is_a: C"),
            term("C", ""),
        ]
        .concat();
        let snapshot = load(&body).unwrap();

        assert_eq!(snapshot.info().term_count, 3);
        assert_eq!(snapshot.info().edge_count, 2);
        assert_eq!(snapshot.info().format_version.as_deref(), Some("1.2"));
        assert!(snapshot.info().cycle_warnings.is_empty());
    }

    #[test]
    fn test_unresolved_target_fails_load() {
        let body = term("A", "relationship: part_of NOWHERE");
        let err = load(&body).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Referential(ReferentialError::UnresolvedTarget { ref target, .. }) if target == "NOWHERE"
        ));
    }

    #[test]
    fn test_alt_id_target_resolves_to_canonical() {
        let body = [term("A", "is_a: OLD"), term("B", "alt_id: OLD")].concat();
        let snapshot = load(&body).unwrap();
        assert_eq!(snapshot.graph().edges(), vec![Edge::new("A", "is_a", "B")]);

        let strict = OntologyLoader::new(LoaderConfig::builder().resolve_alt_id_targets(false).build());
        let err = strict
            .load(&format!("{HEADER}{body}"), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, LoadError::Referential(ReferentialError::UnresolvedTarget { .. })));
    }

    #[test]
    fn test_undeclared_relation_lenient_and_strict() {
        let body = [term("A", "relationship: adjacent_to B"), term("B", "")].concat();

        let snapshot = load(&body).unwrap();
        let rel = snapshot.graph().relation_type("adjacent_to").unwrap();
        assert!(!rel.is_transitive);

        let strict = OntologyLoader::new(LoaderConfig::builder().strict_relation_types(true).build());
        let err = strict
            .load(&format!("{HEADER}{body}"), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Referential(ReferentialError::UnknownRelationType { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_fail_even_when_obsolete() {
        let body = [term("A", ""), term("A", "is_obsolete: true")].concat();
        let err = load(&body).unwrap_err();
        assert!(matches!(err, LoadError::Referential(ReferentialError::DuplicateId(_))));

        let body = "[Typedef]\nid: part_of\n\n[Typedef]\nid: part_of\n";
        assert!(matches!(
            load(body).unwrap_err(),
            LoadError::Referential(ReferentialError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_obsolete_terms_counted_separately() {
        let body = [term("A", ""), term("B", "is_obsolete: true")].concat();
        let snapshot = load(&body).unwrap();
        assert_eq!(snapshot.info().term_count, 1);
        assert_eq!(snapshot.info().obsolete_count, 1);
        assert!(snapshot.store().get("B", Lookup::IncludeObsolete).is_ok());
    }

    #[test]
    fn test_cycles_are_warnings() {
        let body = [
            "[Typedef]\nid: part_of\nis_transitive: true\n\n".to_string(),
            term("A", "relationship: part_of B"),
            term("B", "relationship: part_of A"),
            term("C", "is_a: C"),
            term("D", "relationship: regulates E"),
            term("E", "relationship: regulates D"),
        ]
        .concat();
        let snapshot = load(&body).unwrap();

        let cycles = &snapshot.info().cycle_warnings;
        assert_eq!(
            cycles,
            &vec![
                CycleWarning {
                    relation: "is_a".to_string(),
                    members: vec!["C".to_string()],
                },
                CycleWarning {
                    relation: "part_of".to_string(),
                    members: vec!["A".to_string(), "B".to_string()],
                },
            ]
        );

        let quiet = OntologyLoader::new(LoaderConfig::builder().detect_cycles(false).build());
        let snapshot = quiet
            .load(&format!("{HEADER}{body}"), &CancellationToken::new())
            .unwrap();
        assert!(snapshot.info().cycle_warnings.is_empty());
    }

    #[test]
    fn test_checksum_identifies_source() {
        let first = load(&term("A", "")).unwrap();
        let second = load(&term("A", "")).unwrap();
        let third = load(&term("B", "")).unwrap();

        assert_eq!(first.info().source_checksum, second.info().source_checksum);
        assert_ne!(first.info().source_checksum, third.info().source_checksum);
        assert_ne!(first.info().id, second.info().id);
    }
}
