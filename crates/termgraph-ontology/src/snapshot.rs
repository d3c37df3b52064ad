//! Snapshots and the registry that publishes them
//!
//! A [`Snapshot`] is one fully loaded, immutable ontology. Readers hold it through
//! an `Arc`, so a snapshot stays valid for as long as any query needs it, even
//! after a newer one has been published.
//!
//! [`OntologyRegistry`] owns the pointer to the current snapshot. Loads are
//! serialized by an async mutex and build entirely outside the pointer lock; the
//! pointer is replaced only once a build has succeeded.

use crate::config::LoaderConfig;
use crate::error::{LoadError, QueryError, QueryResult, Result};
use crate::graph::RelationshipGraph;
use crate::inference::InferenceEngine;
use crate::loader::OntologyLoader;
use crate::query::QueryEngine;
use crate::store::TermStore;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Cycle found in a relation that should be acyclic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleWarning {
    pub relation: String,
    /// Terms of the strongly connected component, sorted
    pub members: Vec<String>,
}

impl std::fmt::Display for CycleWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} cycle through {}", self.relation, self.members.join(", "))
    }
}

/// Metadata recorded when a snapshot is built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub id: Uuid,
    pub format_version: Option<String>,
    pub data_version: Option<String>,
    pub ontology: Option<String>,
    /// SHA-256 of the OBO text
    pub source_checksum: String,
    pub loaded_at: DateTime<Utc>,
    /// Non-obsolete terms
    pub term_count: usize,
    pub obsolete_count: usize,
    pub edge_count: usize,
    pub relation_type_count: usize,
    pub cycle_warnings: Vec<CycleWarning>,
}

#[derive(Debug)]
pub struct Snapshot {
    store: TermStore,
    graph: RelationshipGraph,
    info: SnapshotInfo,
}

impl Snapshot {
    pub(crate) fn new(store: TermStore, graph: RelationshipGraph, info: SnapshotInfo) -> Self {
        Self { store, graph, info }
    }

    pub fn store(&self) -> &TermStore {
        &self.store
    }

    pub fn graph(&self) -> &RelationshipGraph {
        &self.graph
    }

    pub fn info(&self) -> &SnapshotInfo {
        &self.info
    }

    pub fn query(&self) -> QueryEngine<'_> {
        QueryEngine::new(self)
    }

    pub fn inference(&self) -> InferenceEngine<'_> {
        InferenceEngine::new(self)
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug)]
pub struct OntologyRegistry {
    loader: OntologyLoader,
    current: RwLock<Option<Arc<Snapshot>>>,
    load_lock: tokio::sync::Mutex<()>,
    generation: AtomicU64,
}

impl Default for OntologyRegistry {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl OntologyRegistry {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            loader: OntologyLoader::new(config),
            current: RwLock::new(None),
            load_lock: tokio::sync::Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// The published snapshot, if any
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    /// The published snapshot, or [`QueryError::NoSnapshot`]
    pub fn require_current(&self) -> QueryResult<Arc<Snapshot>> {
        self.current().ok_or(QueryError::NoSnapshot)
    }

    /// Number of snapshots published so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Build a snapshot from OBO text and publish it
    pub async fn load_str(
        &self,
        source: impl Into<String>,
        cancel: &CancellationToken,
    ) -> Result<Arc<Snapshot>> {
        let _guard = self.load_lock.lock().await;
        let built = self.loader.load_text(source.into(), cancel).await;
        self.publish(built, cancel)
    }

    /// Read an OBO file, build a snapshot from it and publish it
    pub async fn load_path(
        &self,
        path: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<Arc<Snapshot>> {
        let _guard = self.load_lock.lock().await;
        let built = self.loader.load_path(path, cancel).await;
        self.publish(built, cancel)
    }

    /// Publish an already built snapshot, returning the one it replaces
    pub fn swap(&self, snapshot: Snapshot) -> Option<Arc<Snapshot>> {
        self.install(Arc::new(snapshot))
    }

    fn publish(&self, built: Result<Snapshot>, cancel: &CancellationToken) -> Result<Arc<Snapshot>> {
        let snapshot = match built {
            Ok(snapshot) if cancel.is_cancelled() => {
                info!(snapshot = %snapshot.info().id, "Discarding snapshot built after cancellation");
                return Err(LoadError::Cancelled);
            },
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                warn!(error = %e, generation = self.generation(), "Load failed; keeping current snapshot");
                return Err(e);
            },
        };

        self.install(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    fn install(&self, snapshot: Arc<Snapshot>) -> Option<Arc<Snapshot>> {
        let id = snapshot.info().id;
        let previous = std::mem::replace(&mut *self.current.write(), Some(snapshot));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        info!(
            snapshot = %id,
            generation,
            replaced = ?previous.as_ref().map(|s| s.info().id),
            "Published ontology snapshot"
        );
        previous
    }
}
