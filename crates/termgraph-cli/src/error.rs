//! Error types for the termgraph CLI
//!
//! Every variant is user-facing: the message says what went wrong and what to try next.

use termgraph_ontology::{AnnotationError, ExportError, LoadError, QueryError};
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// No OBO file given
    #[error("No ontology given. Pass --ontology <PATH> or set TERMGRAPH_ONTOLOGY_PATH.")]
    MissingOntology,

    /// Required file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// OBO file failed to load
    #[error("Failed to load ontology: {0}. Run 'termgraph validate' for details; use --verbose for the full log.")]
    Load(#[from] LoadError),

    /// Term or relation lookup failed
    #[error("{0}. Check the id (alt ids are accepted) or pass --include-obsolete where supported.")]
    Query(#[from] QueryError),

    /// Export could not be written
    #[error("Export failed: {0}. Check that the output directory is writable.")]
    Export(#[from] ExportError),

    /// GAF file is malformed
    #[error("Invalid GAF file: {0}. GAF rows need 15 (GAF 1.0) or 17 (GAF 2.x) tab-separated columns.")]
    Annotation(#[from] AnnotationError),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your TERMGRAPH_* environment variables.")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound(path.into())
    }
}
