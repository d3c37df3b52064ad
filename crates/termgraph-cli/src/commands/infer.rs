//! `termgraph infer` command implementation
//!
//! Lists every term the GO inference rules relate to the given one.

use super::open_snapshot;
use crate::config::Config;
use crate::error::Result;
use crate::output::{format_terms, TermSummary};
use crate::OutputFormat;

pub async fn run(config: &Config, id: &str, relation: &str, format: OutputFormat) -> Result<()> {
    let snapshot = open_snapshot(config).await?;
    let inferred = snapshot.inference().infer(id, relation)?;

    print!("{}", format_terms(&TermSummary::collect(&snapshot, &inferred), format)?);
    Ok(())
}
