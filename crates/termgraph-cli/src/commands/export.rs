//! `termgraph export` command implementation
//!
//! Writes the term / term2term / term_synonym tables, or the whole snapshot as JSON.

use super::open_snapshot;
use crate::config::Config;
use crate::error::Result;
use crate::ExportFormat;
use colored::Colorize;
use std::path::{Path, PathBuf};
use termgraph_ontology::{JsonExport, RelationalExport, Snapshot};
use tracing::info;

/// Name of the SQL script written by `--format sql`
pub const SQL_FILE_NAME: &str = "termgraph.sql";

/// Name of the document written by `--format json`
pub const JSON_FILE_NAME: &str = "ontology.json";

pub async fn run(config: &Config, out_dir: &Path, format: ExportFormat) -> Result<()> {
    let snapshot = open_snapshot(config).await?;
    let written = write(&snapshot, out_dir, format)?;

    for path in &written {
        println!("{} Wrote {}", "✓".green(), path.display().to_string().cyan());
    }
    Ok(())
}

/// Write the export into `out_dir` and return the files created
pub fn write(snapshot: &Snapshot, out_dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;

    let written = match format {
        ExportFormat::Tsv => RelationalExport::from_snapshot(snapshot).write_tsv(out_dir)?,
        ExportFormat::Sql => {
            let path = out_dir.join(SQL_FILE_NAME);
            std::fs::write(&path, RelationalExport::from_snapshot(snapshot).to_sql_script())?;
            vec![path]
        },
        ExportFormat::Json => {
            let path = out_dir.join(JSON_FILE_NAME);
            JsonExport::from_snapshot(snapshot).write(&path)?;
            vec![path]
        },
    };

    info!(format = ?format, files = written.len(), dir = %out_dir.display(), "Export finished");
    Ok(written)
}
