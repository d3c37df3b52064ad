//! Relational and JSON export of the mini Gene Ontology fixture

mod common;

use common::*;
use std::collections::HashMap;
use termgraph_ontology::export::{insert_template, TermRow, TermSynonymRow, TSV_NULL};
use termgraph_ontology::{JsonExport, PlaceholderStyle, RelationalExport};

fn read_rows(path: &std::path::Path) -> Vec<Vec<String>> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.split('\t').map(String::from).collect())
        .collect()
}

#[test]
fn test_row_counts() {
    let export = RelationalExport::from_snapshot(&mini_go());

    // 5 relation types + 5 synonym types + 17 terms (obsolete included)
    assert_eq!(export.terms.len(), 27);
    // 19 asserted edges + 2 relation type is_a links
    assert_eq!(export.term2term.len(), 21);
    // 5 synonyms + 3 alt ids
    assert_eq!(export.term_synonyms.len(), 8);
}

#[test]
fn test_term_rows() {
    let export = RelationalExport::from_snapshot(&mini_go());
    let by_acc: HashMap<&str, _> = export.terms.iter().map(|r| (r.acc.as_str(), r)).collect();

    let part_of = by_acc["part_of"];
    assert_eq!(part_of.term_type, "relationship");
    assert_eq!(part_of.name, "part of");

    assert_eq!(by_acc["alt_id"].term_type, "synonym_type");
    assert_eq!(by_acc["exact"].term_type, "synonym_type");

    let bp = by_acc[BIOLOGICAL_PROCESS];
    assert_eq!(bp.term_type, "biological_process");
    assert!(bp.is_root);
    assert!(!by_acc[TRANSCRIPTION].is_root);

    let obsolete = by_acc[OBSOLETE_TERM];
    assert!(obsolete.is_obsolete);
    assert!(!obsolete.is_root);

    // Ontology terms follow numeric accession order
    let accessions: Vec<&str> = export.terms[10..].iter().map(|r| r.acc.as_str()).collect();
    let mut expected = accessions.clone();
    expected.sort();
    assert_eq!(accessions, expected);
    assert_eq!(accessions[0], OBSOLETE_TERM);
}

#[test]
fn test_term2term_parent_is_term1() {
    let export = RelationalExport::from_snapshot(&mini_go());
    let id_of = |acc: &str| export.terms.iter().find(|r| r.acc == acc).unwrap().id;

    let row = export
        .term2term
        .iter()
        .find(|r| r.term2_id == id_of(TRANSCRIPTION) && r.relationship_type_id == id_of("part_of"))
        .unwrap();
    assert_eq!(row.term1_id, id_of(BIOLOGICAL_PROCESS));
    assert!(!row.complete);
}

#[test]
fn test_relation_hierarchy_in_term2term() {
    let export = RelationalExport::from_snapshot(&mini_go());
    let id_of = |acc: &str| export.terms.iter().find(|r| r.acc == acc).unwrap().id;

    let mut children: Vec<i64> = export
        .term2term
        .iter()
        .filter(|r| r.relationship_type_id == id_of("is_a") && r.term1_id == id_of("regulates"))
        .map(|r| r.term2_id)
        .collect();
    children.sort();
    assert_eq!(children, vec![id_of("negatively_regulates"), id_of("positively_regulates")]);
}

#[test]
fn test_alt_id_synonym_rows() {
    let export = RelationalExport::from_snapshot(&mini_go());
    let alt_type = export.terms.iter().find(|r| r.acc == "alt_id").unwrap().id;

    let alt_rows: Vec<_> = export
        .term_synonyms
        .iter()
        .filter(|r| r.synonym_type_id == alt_type)
        .collect();
    assert_eq!(alt_rows.len(), 3);
    assert!(alt_rows.iter().all(|r| r.acc_synonym.as_deref() == Some(r.term_synonym.as_str())));
    assert!(export
        .term_synonyms
        .iter()
        .filter(|r| r.synonym_type_id != alt_type)
        .all(|r| r.acc_synonym.is_none()));
}

#[test]
fn test_write_tsv() {
    let export = RelationalExport::from_snapshot(&mini_go());
    let dir = tempfile::tempdir().unwrap();

    let written = export.write_tsv(dir.path()).unwrap();
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["term.txt", "term2term.txt", "term_synonym.txt"]);

    let terms = read_rows(&dir.path().join("term.txt"));
    assert_eq!(terms.len(), 27);
    assert!(terms.iter().all(|row| row.len() == 6));
    assert_eq!(terms[0][0], "1");

    let synonyms = read_rows(&dir.path().join("term_synonym.txt"));
    assert_eq!(synonyms.len(), 8);
    let lysosomal = synonyms.iter().find(|row| row[1] == "lysosomal").unwrap();
    assert_eq!(lysosomal[2], TSV_NULL);
    let alt = synonyms.iter().find(|row| row[1] == BIOLOGICAL_PROCESS_ALT).unwrap();
    assert_eq!(alt[2], BIOLOGICAL_PROCESS_ALT);

    let edges = read_rows(&dir.path().join("term2term.txt"));
    assert!(edges.iter().all(|row| row[4] == "0"));
}

/// Undo `LOAD DATA` backslash escapes
fn unescape(field: &str) -> String {
    let mut out = String::new();
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[test]
fn test_write_tsv_escapes_text() {
    let export = RelationalExport {
        terms: vec![TermRow {
            id: 1,
            name: "tab\there \\ slash".to_string(),
            term_type: "biological_process".to_string(),
            acc: "GO:0000001".to_string(),
            is_obsolete: false,
            is_root: true,
        }],
        term2term: Vec::new(),
        term_synonyms: vec![TermSynonymRow {
            term_id: 1,
            term_synonym: "the \"x\" form".to_string(),
            acc_synonym: None,
            synonym_type_id: 2,
        }],
    };
    let dir = tempfile::tempdir().unwrap();
    export.write_tsv(dir.path()).unwrap();

    let synonyms = std::fs::read_to_string(dir.path().join("term_synonym.txt")).unwrap();
    assert_eq!(synonyms, "1\tthe \"x\" form\t\\N\t2\n");

    let terms = read_rows(&dir.path().join("term.txt"));
    assert_eq!(terms[0].len(), 6);
    assert_eq!(terms[0][1], "tab\\there \\\\ slash");
    assert_eq!(unescape(&terms[0][1]), export.terms[0].name);
}

#[test]
fn test_sql_script() {
    let sql = RelationalExport::from_snapshot(&mini_go()).to_sql_script();

    assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS term ("));
    assert!(sql.contains("INSERT INTO term VALUES (3, 'part of', 'relationship', 'part_of', 0, 0);"));
    assert!(sql.contains("'lysosomal', NULL,"));
    assert_eq!(sql.matches("INSERT INTO term2term").count(), 21);
}

#[test]
fn test_insert_templates() {
    assert_eq!(
        insert_template("term2term", PlaceholderStyle::Numeric).unwrap(),
        "INSERT INTO term2term (id, relationship_type_id, term1_id, term2_id, complete) VALUES (:1, :2, :3, :4, :5)"
    );
    assert!(insert_template("dbxref", PlaceholderStyle::Qmark).is_err());
}

#[test]
fn test_json_export_round_trips_through_file() {
    let snapshot = mini_go();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("go.json");

    JsonExport::from_snapshot(&snapshot).write(&path).unwrap();
    let read: JsonExport = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(read.info.id, snapshot.info().id);
    assert_eq!(read.terms.len(), 17);
    assert_eq!(read.edges.len(), 19);
    assert_eq!(read.relation_types.len(), 5);
    assert_eq!(read.aliases[BIOLOGICAL_PROCESS_ALT], BIOLOGICAL_PROCESS);
}
