//! `termgraph validate` command implementation
//!
//! Loads the ontology and prints what it contains.

use super::open_snapshot;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use termgraph_ontology::Namespace;

pub async fn run(config: &Config) -> Result<()> {
    let snapshot = open_snapshot(config).await?;
    let info = snapshot.info();
    let query = snapshot.query();

    println!("{} {}", "✓".green(), "Ontology loaded".bold());
    println!();
    println!("{}", "Source:".cyan().bold());
    println!("  Ontology:       {}", info.ontology.as_deref().unwrap_or("-"));
    println!("  Format version: {}", info.format_version.as_deref().unwrap_or("-"));
    println!("  Data version:   {}", info.data_version.as_deref().unwrap_or("-"));
    println!("  Checksum:       {}", &info.source_checksum[..16]);
    println!("  Snapshot:       {}", info.id);
    println!();

    println!("{}", "Contents:".cyan().bold());
    println!("  Terms:          {}", info.term_count);
    println!("  Obsolete:       {}", info.obsolete_count);
    println!("  Edges:          {}", info.edge_count);
    println!("  Relation types: {}", info.relation_type_count);
    println!();

    println!("{}", "Roots:".cyan().bold());
    for namespace in Namespace::ALL {
        let roots = query.roots(namespace);
        let listed: Vec<String> = roots.iter().map(|t| format!("{} ({})", t.id, t.name)).collect();
        let listed = if listed.is_empty() { "-".to_string() } else { listed.join(", ") };
        println!("  {:<19} {}", format!("{namespace}:"), listed);
    }

    let orphans = query.orphans();
    if !orphans.is_empty() {
        println!();
        println!("{} {} terms take part in no relationship", "!".yellow(), orphans.len());
    }

    if !info.cycle_warnings.is_empty() {
        println!();
        println!("{}", "Cycle warnings:".yellow().bold());
        for warning in &info.cycle_warnings {
            println!("  {} {}", "!".yellow(), warning);
        }
    }

    Ok(())
}
