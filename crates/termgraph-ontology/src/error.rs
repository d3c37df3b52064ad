//! Error types for loading, querying and exporting ontologies
//!
//! Load-time failures abort the whole load ([`LoadError`]). Query-time failures are
//! ordinary values ([`QueryError`]) because probing for an identifier that does not
//! exist is an expected outcome.

use thiserror::Error;

/// Result type for load operations
pub type Result<T> = std::result::Result<T, LoadError>;

/// Result type for query operations
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Malformed input, reported with the 1-based line it was found on
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason} (`{text}`)")]
pub struct SyntaxError {
    pub line: usize,
    pub text: String,
    pub reason: String,
}

impl SyntaxError {
    pub fn new(line: usize, text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
            reason: reason.into(),
        }
    }
}

/// Identifier that fails to resolve, or collides, against the final term set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferentialError {
    #[error("term {source_id} references undefined {relation} target {target}")]
    UnresolvedTarget {
        source_id: String,
        relation: String,
        target: String,
    },

    #[error("term {term} uses undeclared relation type {relation}")]
    UnknownRelationType { term: String, relation: String },

    #[error("relation type {relation} declares undefined parent relation {parent}")]
    UnknownParentRelation { relation: String, parent: String },

    #[error("identifier {0} is defined more than once")]
    DuplicateId(String),

    #[error("alt_id {alt_id} of {term} collides with the primary id of another term")]
    AltIdCollidesWithPrimary { alt_id: String, term: String },

    #[error("alt_id {alt_id} is claimed by both {first} and {second}")]
    AltIdClaimedTwice {
        alt_id: String,
        first: String,
        second: String,
    },
}

/// Errors that abort a load; the previously published snapshot stays active
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Referential error: {0}")]
    Referential(#[from] ReferentialError),

    #[error("Load cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Load worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl LoadError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }
}

/// Typed not-found results returned by queries
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("term not found: {0}")]
    TermNotFound(String),

    #[error("unknown relation type: {0}")]
    UnknownRelation(String),

    #[error("no ontology snapshot has been loaded")]
    NoSnapshot,
}

/// Errors raised while writing the relational export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown table: {0}")]
    UnknownTable(String),
}

/// Errors raised while reading GAF annotation files
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnnotationError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        AnnotationError::Malformed {
            line,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display_carries_line() {
        let err = LoadError::from(SyntaxError::new(12, "synonym: broken", "missing quoted text"));
        let msg = err.to_string();
        assert!(msg.contains("line 12"));
        assert!(msg.contains("synonym: broken"));
    }

    #[test]
    fn test_referential_error_display() {
        let err = ReferentialError::UnresolvedTarget {
            source_id: "GO:0000001".to_string(),
            relation: "part_of".to_string(),
            target: "GO:9999999".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "term GO:0000001 references undefined part_of target GO:9999999"
        );
    }
}
