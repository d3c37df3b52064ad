//! `termgraph ancestors` and `termgraph descendants` command implementation

use super::open_snapshot;
use crate::config::Config;
use crate::error::Result;
use crate::output::{format_terms, TermSummary};
use crate::LineageArgs;
use termgraph_ontology::{Direction, QueryOptions, Snapshot};
use tracing::debug;

/// List the terms reachable from `args.id` in `direction`
pub async fn run(config: &Config, args: &LineageArgs, direction: Direction) -> Result<()> {
    let snapshot = open_snapshot(config).await?;
    print!("{}", render(&snapshot, args, direction)?);
    Ok(())
}

fn render(snapshot: &Snapshot, args: &LineageArgs, direction: Direction) -> Result<String> {
    let options = QueryOptions {
        include_subrelations: args.include_subrelations,
        include_obsolete: args.include_obsolete,
    };
    let query = snapshot.query();
    let mut ids: Vec<String> = match direction {
        Direction::Outgoing => query.ancestors_with(&args.id, &args.relation, options)?,
        Direction::Incoming => query.descendants_with(&args.id, &args.relation, options)?,
    }
    .into_iter()
    .collect();
    ids.sort();

    debug!(id = %args.id, relation = %args.relation, ?direction, count = ids.len(), "Traversal finished");

    format_terms(&TermSummary::collect(snapshot, &ids), args.format)
}
