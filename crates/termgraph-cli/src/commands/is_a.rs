//! `termgraph is-a` command implementation

use super::open_snapshot;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;

/// Print and return whether `id` is_a `ancestor`
pub async fn run(config: &Config, id: &str, ancestor: &str) -> Result<bool> {
    let snapshot = open_snapshot(config).await?;
    let holds = snapshot.query().is_a(id, ancestor)?;

    if holds {
        println!("{} {} is_a {}", "true".green().bold(), id, ancestor);
    } else {
        println!("{} {} is not a {}", "false".red().bold(), id, ancestor);
    }
    Ok(holds)
}
