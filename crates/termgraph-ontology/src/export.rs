// Relational export
//
// Flattens a snapshot into the `term` / `term2term` / `term_synonym` tables used
// by GO-style relational databases, plus a lossless JSON form.

use crate::error::ExportError;
use crate::graph::Direction;
use crate::models::{parse_accession, Edge, RelationType, SynonymScope, Term, IS_A};
use crate::snapshot::{Snapshot, SnapshotInfo};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// NULL marker in tab-separated dumps
pub const TSV_NULL: &str = "\\N";

const TERM_TYPE_RELATIONSHIP: &str = "relationship";
const TERM_TYPE_SYNONYM: &str = "synonym_type";
const ALT_ID_SYNONYM_TYPE: &str = "alt_id";

// ============================================================================
// Tables and rows
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Term,
    Term2Term,
    TermSynonym,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Term, Table::Term2Term, Table::TermSynonym];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Term => "term",
            Table::Term2Term => "term2term",
            Table::TermSynonym => "term_synonym",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Term => &["id", "name", "term_type", "acc", "is_obsolete", "is_root"],
            Table::Term2Term => &[
                "id",
                "relationship_type_id",
                "term1_id",
                "term2_id",
                "complete",
            ],
            Table::TermSynonym => &["term_id", "term_synonym", "acc_synonym", "synonym_type_id"],
        }
    }

    /// Dump file name, e.g. `term2term.txt`
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.name())
    }
}

impl std::str::FromStr for Table {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| ExportError::UnknownTable(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRow {
    pub id: i64,
    pub name: String,
    /// Namespace for ontology terms, `relationship` or `synonym_type` otherwise
    pub term_type: String,
    pub acc: String,
    pub is_obsolete: bool,
    pub is_root: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term2TermRow {
    pub id: i64,
    pub relationship_type_id: i64,
    /// Parent (edge target)
    pub term1_id: i64,
    /// Child (edge source)
    pub term2_id: i64,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSynonymRow {
    pub term_id: i64,
    pub term_synonym: String,
    pub acc_synonym: Option<String>,
    pub synonym_type_id: i64,
}

/// A value as it appears in a dump
enum Cell<'a> {
    Int(i64),
    Text(&'a str),
    Null,
}

impl Cell<'_> {
    fn flag(value: bool) -> Self {
        Cell::Int(i64::from(value))
    }

    /// Text in `LOAD DATA` form: backslash escapes, never quoted
    fn tsv(&self) -> String {
        match self {
            Cell::Int(v) => v.to_string(),
            Cell::Text(s) => escape_tsv(s),
            Cell::Null => TSV_NULL.to_string(),
        }
    }

    fn sql(&self) -> String {
        match self {
            Cell::Int(v) => v.to_string(),
            Cell::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Cell::Null => "NULL".to_string(),
        }
    }
}

fn escape_tsv(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

impl TermRow {
    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            Cell::Int(self.id),
            Cell::Text(&self.name),
            Cell::Text(&self.term_type),
            Cell::Text(&self.acc),
            Cell::flag(self.is_obsolete),
            Cell::flag(self.is_root),
        ]
    }
}

impl Term2TermRow {
    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            Cell::Int(self.id),
            Cell::Int(self.relationship_type_id),
            Cell::Int(self.term1_id),
            Cell::Int(self.term2_id),
            Cell::flag(self.complete),
        ]
    }
}

impl TermSynonymRow {
    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            Cell::Int(self.term_id),
            Cell::Text(&self.term_synonym),
            self.acc_synonym.as_deref().map_or(Cell::Null, Cell::Text),
            Cell::Int(self.synonym_type_id),
        ]
    }
}

// ============================================================================
// Relational export
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationalExport {
    pub terms: Vec<TermRow>,
    pub term2term: Vec<Term2TermRow>,
    pub term_synonyms: Vec<TermSynonymRow>,
}

impl RelationalExport {
    /// Flatten a snapshot into table rows
    ///
    /// Row ids are assigned in order: relation types, synonym types, then
    /// ontology terms by numeric accession. `term2term` holds the asserted
    /// edges followed by the `is_a` links between relation types.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let store = snapshot.store();
        let graph = snapshot.graph();
        let mut export = RelationalExport::default();
        let mut relation_ids: HashMap<&str, i64> = HashMap::new();
        let mut synonym_type_ids: HashMap<&str, i64> = HashMap::new();
        let mut term_ids: HashMap<&str, i64> = HashMap::new();

        for rel in graph.relation_types() {
            let id = export.push_term(rel.display_name(), TERM_TYPE_RELATIONSHIP, &rel.id);
            relation_ids.insert(rel.id.as_str(), id);
        }

        let synonym_types = SynonymScope::ALL
            .iter()
            .map(|scope| scope.as_str())
            .chain(std::iter::once(ALT_ID_SYNONYM_TYPE));
        for name in synonym_types {
            let id = export.push_term(name, TERM_TYPE_SYNONYM, name);
            synonym_type_ids.insert(name, id);
        }

        let mut terms: Vec<&Term> = store.all_including_obsolete().collect();
        terms.sort_by_cached_key(|t| (parse_accession(&t.id).unwrap_or(i64::MAX), t.id.clone()));

        for term in terms {
            let term_id = export.push_term(&term.name, term.namespace.as_str(), &term.id);
            let has_parent = graph
                .neighbor_iter(&term.id, IS_A, Direction::Outgoing)
                .next()
                .is_some();
            if let Some(row) = export.terms.last_mut() {
                row.is_obsolete = term.is_obsolete;
                row.is_root = !term.is_obsolete && !has_parent;
            }
            term_ids.insert(term.id.as_str(), term_id);

            for synonym in &term.synonyms {
                if let Some(&synonym_type_id) = synonym_type_ids.get(synonym.scope.as_str()) {
                    export.term_synonyms.push(TermSynonymRow {
                        term_id,
                        term_synonym: synonym.text.clone(),
                        acc_synonym: None,
                        synonym_type_id,
                    });
                }
            }
            if let Some(&synonym_type_id) = synonym_type_ids.get(ALT_ID_SYNONYM_TYPE) {
                for alt_id in &term.alt_ids {
                    export.term_synonyms.push(TermSynonymRow {
                        term_id,
                        term_synonym: alt_id.clone(),
                        acc_synonym: Some(alt_id.clone()),
                        synonym_type_id,
                    });
                }
            }
        }

        for edge in graph.edges() {
            let ids = (
                relation_ids.get(edge.relation.as_str()),
                term_ids.get(edge.target.as_str()),
                term_ids.get(edge.source.as_str()),
            );
            if let (Some(&rel), Some(&parent), Some(&child)) = ids {
                export.push_edge(rel, parent, child);
            }
        }

        if let Some(&is_a) = relation_ids.get(IS_A) {
            for rel in graph.relation_types() {
                for parent in &rel.parents {
                    let ids = (relation_ids.get(parent.as_str()), relation_ids.get(rel.id.as_str()));
                    if let (Some(&parent), Some(&child)) = ids {
                        export.push_edge(is_a, parent, child);
                    }
                }
            }
        }

        info!(
            terms = export.terms.len(),
            term2term = export.term2term.len(),
            term_synonyms = export.term_synonyms.len(),
            "Built relational export"
        );

        export
    }

    /// Append a non-obsolete, non-root term row and return its id
    fn push_term(&mut self, name: &str, term_type: &str, acc: &str) -> i64 {
        let id = self.terms.len() as i64 + 1;
        self.terms.push(TermRow {
            id,
            name: name.to_string(),
            term_type: term_type.to_string(),
            acc: acc.to_string(),
            is_obsolete: false,
            is_root: false,
        });
        id
    }

    fn push_edge(&mut self, relationship_type_id: i64, parent: i64, child: i64) {
        self.term2term.push(Term2TermRow {
            id: self.term2term.len() as i64 + 1,
            relationship_type_id,
            term1_id: parent,
            term2_id: child,
            complete: false,
        });
    }

    fn rows(&self, table: Table) -> Vec<Vec<Cell<'_>>> {
        match table {
            Table::Term => self.terms.iter().map(TermRow::cells).collect(),
            Table::Term2Term => self.term2term.iter().map(Term2TermRow::cells).collect(),
            Table::TermSynonym => self.term_synonyms.iter().map(TermSynonymRow::cells).collect(),
        }
    }

    /// Write `term.txt`, `term2term.txt` and `term_synonym.txt` into `dir`
    pub fn write_tsv(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ExportError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(Table::ALL.len());
        for table in Table::ALL {
            let path = dir.join(table.file_name());
            let mut writer = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .quote_style(csv::QuoteStyle::Never)
                .has_headers(false)
                .from_path(&path)?;
            let rows = self.rows(table);
            for row in &rows {
                writer.write_record(row.iter().map(Cell::tsv))?;
            }
            writer.flush()?;

            info!(table = table.name(), rows = rows.len(), path = %path.display(), "Wrote table dump");
            written.push(path);
        }
        Ok(written)
    }

    /// `CREATE TABLE` statements followed by one `INSERT` per row
    pub fn to_sql_script(&self) -> String {
        let mut sql = String::from(SCHEMA_SQL);
        for table in Table::ALL {
            sql.push('\n');
            for row in self.rows(table) {
                let values: Vec<String> = row.iter().map(Cell::sql).collect();
                let _ = writeln!(sql, "INSERT INTO {} VALUES ({});", table.name(), values.join(", "));
            }
        }
        sql
    }
}

const SCHEMA_SQL: &str = "\
CREATE TABLE IF NOT EXISTS term (
    id INTEGER PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    term_type VARCHAR(55) NOT NULL,
    acc VARCHAR(255) NOT NULL UNIQUE,
    is_obsolete INTEGER NOT NULL DEFAULT 0,
    is_root INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS term2term (
    id INTEGER PRIMARY KEY,
    relationship_type_id INTEGER NOT NULL REFERENCES term (id),
    term1_id INTEGER NOT NULL REFERENCES term (id),
    term2_id INTEGER NOT NULL REFERENCES term (id),
    complete INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS term_synonym (
    term_id INTEGER NOT NULL REFERENCES term (id),
    term_synonym VARCHAR(996),
    acc_synonym VARCHAR(255),
    synonym_type_id INTEGER NOT NULL REFERENCES term (id)
);
";

// ============================================================================
// Parameterized statements
// ============================================================================

/// Placeholder conventions of common database drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStyle {
    /// `?`
    Qmark,
    /// `:1`, `:2`, ...
    Numeric,
    /// `%s`
    #[default]
    Format,
}

impl std::str::FromStr for PlaceholderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qmark" => Ok(PlaceholderStyle::Qmark),
            "numeric" => Ok(PlaceholderStyle::Numeric),
            "format" => Ok(PlaceholderStyle::Format),
            _ => Err(format!("Unknown placeholder style: {}", s)),
        }
    }
}

/// Rewrite `%s` markers into the given placeholder style
pub fn rewrite_placeholders(sql: &str, style: PlaceholderStyle) -> String {
    match style {
        PlaceholderStyle::Format => sql.to_string(),
        PlaceholderStyle::Qmark => sql.replace("%s", "?"),
        PlaceholderStyle::Numeric => {
            let mut out = String::with_capacity(sql.len());
            for (idx, part) in sql.split("%s").enumerate() {
                if idx > 0 {
                    let _ = write!(out, ":{idx}");
                }
                out.push_str(part);
            }
            out
        },
    }
}

/// Parameterized `INSERT` for one table
pub fn insert_template(table: &str, style: PlaceholderStyle) -> Result<String, ExportError> {
    let table: Table = table.parse()?;
    let columns = table.columns();
    let markers = vec!["%s"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name(),
        columns.join(", "),
        markers
    );
    Ok(rewrite_placeholders(&sql, style))
}

// ============================================================================
// JSON export
// ============================================================================

/// Complete snapshot contents, suitable for reloading elsewhere
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonExport {
    pub info: SnapshotInfo,
    pub terms: Vec<Term>,
    pub relation_types: Vec<RelationType>,
    pub edges: Vec<Edge>,
    /// Alt id -> primary id
    pub aliases: BTreeMap<String, String>,
}

impl JsonExport {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let store = snapshot.store();
        let graph = snapshot.graph();
        JsonExport {
            info: snapshot.info().clone(),
            terms: store.all_including_obsolete().cloned().collect(),
            relation_types: graph.relation_types().cloned().collect(),
            edges: graph.edges(),
            aliases: store
                .aliases()
                .map(|(alt, primary)| (alt.to_string(), primary.to_string()))
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const QUERIES: [&str; 5] = [
        "",
        "%s",
        "SELECT * FROM term WHERE id = %s",
        "SELECT * FROM term WHERE id = %s AND acc = %s",
        "SELECT * FROM term WHERE id = %s AND acc = %s AND 1 = 1",
    ];

    #[test]
    fn test_rewrite_qmark() {
        let rewritten: Vec<String> = QUERIES
            .iter()
            .map(|q| rewrite_placeholders(q, PlaceholderStyle::Qmark))
            .collect();
        assert_eq!(
            rewritten,
            vec![
                "",
                "?",
                "SELECT * FROM term WHERE id = ?",
                "SELECT * FROM term WHERE id = ? AND acc = ?",
                "SELECT * FROM term WHERE id = ? AND acc = ? AND 1 = 1",
            ]
        );
    }

    #[test]
    fn test_rewrite_numeric() {
        let rewritten: Vec<String> = QUERIES
            .iter()
            .map(|q| rewrite_placeholders(q, PlaceholderStyle::Numeric))
            .collect();
        assert_eq!(
            rewritten,
            vec![
                "",
                ":1",
                "SELECT * FROM term WHERE id = :1",
                "SELECT * FROM term WHERE id = :1 AND acc = :2",
                "SELECT * FROM term WHERE id = :1 AND acc = :2 AND 1 = 1",
            ]
        );
    }

    #[test]
    fn test_rewrite_format_is_identity() {
        for q in QUERIES {
            assert_eq!(rewrite_placeholders(q, PlaceholderStyle::Format), q);
        }
    }

    #[test]
    fn test_insert_template() {
        assert_eq!(
            insert_template("term_synonym", PlaceholderStyle::Qmark).unwrap(),
            "INSERT INTO term_synonym (term_id, term_synonym, acc_synonym, synonym_type_id) VALUES (?, ?, ?, ?)"
        );
        assert!(matches!(
            insert_template("gene_product", PlaceholderStyle::Qmark),
            Err(ExportError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_sql_literals_are_escaped() {
        assert_eq!(Cell::Text("5' end").sql(), "'5'' end'");
        assert_eq!(Cell::Null.sql(), "NULL");
        assert_eq!(Cell::Null.tsv(), "\\N");
        assert_eq!(Cell::flag(true).tsv(), "1");
    }
}
