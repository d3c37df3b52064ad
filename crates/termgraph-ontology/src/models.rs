// Ontology data models

use serde::{Deserialize, Serialize};

/// Identifier of the builtin subsumption relation
pub const IS_A: &str = "is_a";

/// Pseudo-relation matched by `is_a` and `part_of`, used by inference rules
pub const INHERITABLE: &str = "inheritable";

/// Pseudo-relation matched by every relation, used by inference rules
pub const ANY: &str = "any";

/// Digits in a GO identifier, as fixed by the GO Consortium
pub const GO_ID_DIGITS: usize = 7;

// ============================================================================
// Term
// ============================================================================

/// A node of the ontology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Stable identifier (e.g., "GO:0008150")
    pub id: String,

    pub name: String,

    pub namespace: Namespace,

    pub definition: Option<String>,

    pub comment: Option<String>,

    /// Retired identifiers merged into this term
    pub alt_ids: Vec<String>,

    pub synonyms: Vec<Synonym>,

    /// Free-text cross-references to other databases
    pub xrefs: Vec<String>,

    pub subsets: Vec<String>,

    pub is_obsolete: bool,
}

impl Term {
    pub fn new(id: impl Into<String>, name: impl Into<String>, namespace: Namespace) -> Self {
        Term {
            id: id.into(),
            name: name.into(),
            namespace,
            definition: None,
            comment: None,
            alt_ids: Vec::new(),
            synonyms: Vec::new(),
            xrefs: Vec::new(),
            subsets: Vec::new(),
            is_obsolete: false,
        }
    }
}

// ============================================================================
// Namespace
// ============================================================================

/// Sub-ontology a term belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    BiologicalProcess,
    MolecularFunction,
    CellularComponent,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [
        Namespace::BiologicalProcess,
        Namespace::MolecularFunction,
        Namespace::CellularComponent,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "biological_process" => Some(Namespace::BiologicalProcess),
            "molecular_function" => Some(Namespace::MolecularFunction),
            "cellular_component" => Some(Namespace::CellularComponent),
            _ => None,
        }
    }

    /// GAF aspect column: P, F or C
    pub fn from_aspect(aspect: &str) -> Option<Self> {
        match aspect.trim() {
            "P" => Some(Namespace::BiologicalProcess),
            "F" => Some(Namespace::MolecularFunction),
            "C" => Some(Namespace::CellularComponent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::BiologicalProcess => "biological_process",
            Namespace::MolecularFunction => "molecular_function",
            Namespace::CellularComponent => "cellular_component",
        }
    }

    pub fn aspect(&self) -> char {
        match self {
            Namespace::BiologicalProcess => 'P',
            Namespace::MolecularFunction => 'F',
            Namespace::CellularComponent => 'C',
        }
    }
}

impl std::str::FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Namespace::parse(s).ok_or_else(|| format!("Unknown namespace: {}", s))
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Synonym
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synonym {
    pub text: String,

    pub scope: SynonymScope,

    /// Optional synonym type (e.g., "systematic_synonym")
    pub synonym_type: Option<String>,

    pub xrefs: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SynonymScope {
    Exact,
    Broad,
    Narrow,
    Related,
}

impl SynonymScope {
    pub const ALL: [SynonymScope; 4] = [
        SynonymScope::Exact,
        SynonymScope::Broad,
        SynonymScope::Narrow,
        SynonymScope::Related,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "EXACT" => Some(SynonymScope::Exact),
            "BROAD" | "BROADER" => Some(SynonymScope::Broad),
            "NARROW" => Some(SynonymScope::Narrow),
            "RELATED" => Some(SynonymScope::Related),
            _ => None,
        }
    }

    /// Lowercase name, as used for synonym type rows of the relational export
    pub fn as_str(&self) -> &'static str {
        match self {
            SynonymScope::Exact => "exact",
            SynonymScope::Broad => "broad",
            SynonymScope::Narrow => "narrow",
            SynonymScope::Related => "related",
        }
    }
}

impl std::fmt::Display for SynonymScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

// ============================================================================
// Relation types and edges
// ============================================================================

/// A declared edge label, with its own small is-a hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationType {
    pub id: String,

    pub name: Option<String>,

    pub namespace: Option<String>,

    pub is_transitive: bool,

    /// More general relation types (e.g., `regulates` for `negatively_regulates`)
    pub parents: Vec<String>,

    pub xrefs: Vec<String>,

    /// Present without a `[Typedef]` stanza
    pub builtin: bool,
}

impl RelationType {
    pub fn new(id: impl Into<String>) -> Self {
        RelationType {
            id: id.into(),
            name: None,
            namespace: None,
            is_transitive: false,
            parents: Vec::new(),
            xrefs: Vec::new(),
            builtin: false,
        }
    }

    /// The builtin `is_a` relation
    pub fn is_a() -> Self {
        RelationType {
            name: Some("is_a".to_string()),
            is_transitive: true,
            builtin: true,
            ..RelationType::new(IS_A)
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Directed, typed edge between two terms
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub relation: String,
    pub target: String,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        relation: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Edge {
            source: source.into(),
            relation: relation.into(),
            target: target.into(),
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.source, self.relation, self.target)
    }
}

// ============================================================================
// Identifier helpers
// ============================================================================

/// Normalize a GO identifier to the `GO:NNNNNNN` form
///
/// Accepts either the prefixed form or the bare seven digits.
pub fn normalize_go_id(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    let digits = raw.strip_prefix("GO:").unwrap_or(raw);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!(
            "GO ID should contain only digits, optionally prefixed with \"GO:\": {raw}"
        ));
    }
    if digits.len() != GO_ID_DIGITS {
        return Err(format!(
            "GO ID should have precisely {GO_ID_DIGITS} digits: {raw}"
        ));
    }

    Ok(format!("GO:{digits}"))
}

/// Numeric accession of a prefixed identifier
/// Example: "GO:0008150" -> 8150
pub fn parse_accession(id: &str) -> Option<i64> {
    let (_, local) = id.split_once(':')?;
    local.parse::<i64>().ok()
}

/// Canonical spelling of a relation name: lowercase with underscores
///
/// `"Is A"` and `"is a"` both become `is_a`.
pub fn normalize_relation_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_go_id() {
        assert_eq!(normalize_go_id("GO:1234567").unwrap(), "GO:1234567");
        assert_eq!(normalize_go_id("1234567").unwrap(), "GO:1234567");

        for invalid in ["Australopithecus", "GO:1", "GO:12345678", "1", "12345678", ""] {
            assert!(normalize_go_id(invalid).is_err(), "{invalid} should be rejected");
        }
    }

    #[test]
    fn test_parse_accession() {
        assert_eq!(parse_accession("GO:0008150"), Some(8150));
        assert_eq!(parse_accession("GO:0000001"), Some(1));
        assert_eq!(parse_accession("part_of"), None);
        assert_eq!(parse_accession("GO:abc"), None);
    }

    #[test]
    fn test_normalize_relation_name() {
        for name in ["is a", "is_a", "Is A", "IS_A"] {
            assert_eq!(normalize_relation_name(name), "is_a");
        }
        assert_eq!(normalize_relation_name("part Of"), "part_of");
        assert_eq!(
            normalize_relation_name("negatively rEgUlAtEs"),
            "negatively_regulates"
        );
    }

    #[test]
    fn test_namespace_parsing() {
        assert_eq!(
            "biological_process".parse::<Namespace>().unwrap(),
            Namespace::BiologicalProcess
        );
        assert_eq!(Namespace::from_aspect("F"), Some(Namespace::MolecularFunction));
        assert_eq!(Namespace::CellularComponent.aspect(), 'C');
        assert!("cellular component".parse::<Namespace>().is_err());
    }

    #[test]
    fn test_synonym_scope_parsing() {
        assert_eq!(SynonymScope::parse("exact"), Some(SynonymScope::Exact));
        assert_eq!(SynonymScope::parse("BROADER"), Some(SynonymScope::Broad));
        assert_eq!(SynonymScope::parse("Narrow"), Some(SynonymScope::Narrow));
        assert_eq!(SynonymScope::parse("fuzzy"), None);
        assert_eq!(SynonymScope::Related.to_string(), "RELATED");
    }

    #[test]
    fn test_is_a_builtin() {
        let is_a = RelationType::is_a();
        assert!(is_a.is_transitive);
        assert!(is_a.builtin);
        assert_eq!(is_a.display_name(), "is_a");
    }
}
