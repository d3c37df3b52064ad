//! Rendering of term lists

use crate::error::Result;
use crate::OutputFormat;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;
use termgraph_ontology::{Lookup, Snapshot};

/// One row of a term listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermSummary {
    pub id: String,
    pub name: String,
    pub namespace: String,
}

impl TermSummary {
    /// Summaries for `ids`, in the given order
    pub fn collect<I, S>(snapshot: &Snapshot, ids: I) -> Vec<TermSummary>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter()
            .filter_map(|id| snapshot.store().get(id.as_ref(), Lookup::IncludeObsolete).ok())
            .map(|term| TermSummary {
                id: term.id.clone(),
                name: term.name.clone(),
                namespace: term.namespace.to_string(),
            })
            .collect()
    }
}

/// Format term summaries for stdout
pub fn format_terms(terms: &[TermSummary], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Table => format_as_table(terms),
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(terms)?),
        OutputFormat::Plain => terms.iter().map(|t| format!("{}\n", t.id)).collect(),
    })
}

fn format_as_table(terms: &[TermSummary]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["ID", "Name", "Namespace"]);

    for term in terms {
        table.add_row(vec![term.id.as_str(), term.name.as_str(), term.namespace.as_str()]);
    }

    format!("{}\n", table)
}
