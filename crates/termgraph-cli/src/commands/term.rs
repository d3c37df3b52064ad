//! `termgraph term` command implementation
//!
//! Shows one term with its synonyms and asserted relationships.

use super::open_snapshot;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use termgraph_ontology::{Lookup, Snapshot};

pub async fn run(config: &Config, id: &str, include_obsolete: bool) -> Result<()> {
    let snapshot = open_snapshot(config).await?;
    print!("{}", render(&snapshot, id, include_obsolete)?);
    Ok(())
}

fn render(snapshot: &Snapshot, id: &str, include_obsolete: bool) -> Result<String> {
    let term = snapshot
        .store()
        .resolve(id, Lookup::from_flag(include_obsolete))?;
    let graph = snapshot.graph();
    let name_of = |id: &str| {
        snapshot
            .store()
            .get(id, Lookup::IncludeObsolete)
            .map(|t| t.name.clone())
            .unwrap_or_default()
    };

    let mut out = String::new();
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };

    line(format!("{} {}", term.id.green().bold(), term.name.bold()));
    if term.id != id {
        line(format!("  {}", format!("({id} is an alternate id)").dimmed()));
    }
    if term.is_obsolete {
        line(format!("  {}", "OBSOLETE".red().bold()));
    }
    line(format!("  Namespace:  {}", term.namespace));
    if let Some(def) = &term.definition {
        line(format!("  Definition: {def}"));
    }
    if let Some(comment) = &term.comment {
        line(format!("  Comment:    {comment}"));
    }
    if !term.alt_ids.is_empty() {
        line(format!("  Alt ids:    {}", term.alt_ids.join(", ")));
    }
    if !term.subsets.is_empty() {
        line(format!("  Subsets:    {}", term.subsets.join(", ")));
    }
    for synonym in &term.synonyms {
        line(format!("  Synonym:    \"{}\" {}", synonym.text, synonym.scope));
    }
    for xref in &term.xrefs {
        line(format!("  Xref:       {xref}"));
    }

    let parents = graph.edges_from(&term.id);
    if !parents.is_empty() {
        line(String::new());
        line(format!("{}", "Relationships:".cyan().bold()));
        for edge in parents {
            line(format!("  {} {} {}", edge.relation, edge.target, name_of(&edge.target).dimmed()));
        }
    }

    let children = graph.edges_to(&term.id);
    if !children.is_empty() {
        line(String::new());
        line(format!("{}", "Referenced by:".cyan().bold()));
        for edge in children {
            line(format!("  {} {} {}", edge.source, edge.relation, name_of(&edge.source).dimmed()));
        }
    }

    Ok(out)
}
