//! termgraph ontology engine
//!
//! Loads OBO ontologies into immutable, queryable snapshots.
//!
//! # Overview
//!
//! - **Parsing**: [`parser::OboParser`] turns OBO 1.2 text into terms, typedefs and pending links
//! - **Loading**: [`OntologyLoader`] resolves links in a second pass and builds a [`Snapshot`]
//! - **Publishing**: [`OntologyRegistry`] swaps snapshots atomically; readers keep an `Arc`
//! - **Queries**: [`QueryEngine`] for transitive closure, `is_a` tests and roots
//! - **Inference**: [`InferenceEngine`] applies composition rules such as
//!   `part_of` inherited through `is_a`
//! - **Export**: relational TSV/SQL rows and a JSON document
//! - **Annotations**: GAF files checked against a snapshot
//!
//! # Example
//!
//! ```no_run
//! use termgraph_ontology::{OntologyRegistry, LoaderConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let registry = OntologyRegistry::new(LoaderConfig::default());
//! let snapshot = registry.load_path("go-basic.obo", &CancellationToken::new()).await?;
//!
//! let ancestors = snapshot.query().ancestors("GO:0006351", "is_a")?;
//! println!("{} ancestors", ancestors.len());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod annotation;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod inference;
pub mod loader;
pub mod models;
pub mod parser;
pub mod query;
pub mod snapshot;
pub mod store;

// Re-export commonly used types
pub use annotation::{Annotation, EvidenceCode, GafFile, GafParser};
pub use config::LoaderConfig;
pub use error::{
    AnnotationError, ExportError, LoadError, QueryError, QueryResult, ReferentialError, Result,
    SyntaxError,
};
pub use export::{JsonExport, PlaceholderStyle, RelationalExport, Table};
pub use graph::{Direction, RelationshipGraph};
pub use inference::{Conclusion, InferenceEngine, Rule, Rules};
pub use loader::OntologyLoader;
pub use models::{Edge, Namespace, RelationType, Synonym, SynonymScope, Term, IS_A};
pub use query::{QueryEngine, QueryOptions};
pub use snapshot::{CycleWarning, OntologyRegistry, Snapshot, SnapshotInfo};
pub use store::{Lookup, TermStore};
