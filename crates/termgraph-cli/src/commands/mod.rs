//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod annotations;
pub mod export;
pub mod infer;
pub mod is_a;
pub mod lineage;
pub mod term;
pub mod validate;

use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;
use termgraph_ontology::{OntologyRegistry, Snapshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Load the configured ontology
///
/// Ctrl-C cancels the load.
pub async fn open_snapshot(config: &Config) -> Result<Arc<Snapshot>> {
    let path = config.ontology_path()?;
    let registry = OntologyRegistry::new(config.loader.clone());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received; cancelling load");
            on_interrupt.cancel();
        }
    });

    let loaded = registry.load_path(path, &cancel).await;
    watcher.abort();
    Ok(loaded?)
}
