//! `termgraph annotations` command implementation
//!
//! Summarizes a GAF file and, with `--check`, compares its GO ids against the ontology.

use super::open_snapshot;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use std::path::Path;
use termgraph_ontology::GafParser;

pub async fn run(config: &Config, gaf: &Path, check: bool) -> Result<()> {
    let parsed = GafParser::parse_path(gaf).await?;

    println!("{}", "Annotations:".cyan().bold());
    println!("  File:        {}", gaf.display());
    println!("  GAF version: {}", parsed.version().unwrap_or("-"));
    println!("  Rows:        {}", parsed.annotations.len());
    println!(
        "  Negated:     {}",
        parsed.annotations.iter().filter(|a| a.is_negated()).count()
    );
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Evidence", "Description", "Count"]);
    for (code, count) in parsed.evidence_counts() {
        table.add_row(vec![code.to_string(), code.description().to_string(), count.to_string()]);
    }
    println!("{table}");

    if !check {
        return Ok(());
    }

    let snapshot = open_snapshot(config).await?;
    let unknown = parsed.unknown_terms(&snapshot);
    let obsolete = parsed.obsolete_terms(&snapshot);

    println!();
    if unknown.is_empty() && obsolete.is_empty() {
        println!("{} Every annotated GO id is defined", "✓".green());
        return Ok(());
    }
    for id in &unknown {
        println!("{} {} is not defined in the ontology", "✗".red(), id);
    }
    for id in &obsolete {
        println!("{} {} is obsolete", "!".yellow(), id);
    }
    Ok(())
}
