//! termgraph CLI Library
//!
//! Command-line interface over the termgraph ontology engine.
//!
//! # Overview
//!
//! - **Validation**: Load an OBO file and report counts and cycles (`termgraph validate`)
//! - **Lookup**: Show a single term, resolving retired ids (`termgraph term`)
//! - **Traversal**: Ancestors and descendants over any relation (`termgraph ancestors`)
//! - **Inference**: Relations implied by the GO composition rules (`termgraph infer`)
//! - **Export**: Relational TSV/SQL dumps and JSON (`termgraph export`)
//! - **Annotations**: Summarize and check GAF files (`termgraph annotations`)

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod commands;
pub mod config;
pub mod error;
pub mod output;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// termgraph - OBO ontology loader and query tool
#[derive(Parser, Debug)]
#[command(name = "termgraph")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// OBO file to load
    #[arg(long, env = "TERMGRAPH_ONTOLOGY_PATH", global = true)]
    pub ontology: Option<PathBuf>,

    /// Reject relationships whose type has no [Typedef]
    #[arg(long, global = true)]
    pub strict: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the ontology and report what was found
    Validate,

    /// Show a single term
    Term {
        /// Term id or alt id (e.g., GO:0008150)
        id: String,

        /// Show obsolete terms instead of reporting them as missing
        #[arg(long)]
        include_obsolete: bool,
    },

    /// List ancestors of a term
    Ancestors {
        #[command(flatten)]
        args: LineageArgs,
    },

    /// List descendants of a term
    Descendants {
        #[command(flatten)]
        args: LineageArgs,
    },

    /// Test whether a term is a (transitive) subclass of another
    ///
    /// Exits with status 0 when it is and 1 when it is not.
    IsA {
        /// Term id
        id: String,

        /// Candidate ancestor id
        ancestor: String,
    },

    /// List terms related to a term by inference
    Infer {
        /// Term id
        id: String,

        /// Relation to infer (e.g., part_of, regulates)
        #[arg(short, long)]
        relation: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Write the relational export
    Export {
        /// Directory to write into (created if missing)
        #[arg(long)]
        out_dir: PathBuf,

        /// Export format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Tsv)]
        format: ExportFormat,
    },

    /// Summarize a GAF annotation file
    Annotations {
        /// GAF file
        gaf: PathBuf,

        /// Report GO ids missing from, or obsolete in, the ontology
        #[arg(long)]
        check: bool,
    },
}

/// Arguments shared by `ancestors` and `descendants`
#[derive(clap::Args, Debug, Clone)]
pub struct LineageArgs {
    /// Term id or alt id
    pub id: String,

    /// Relation to follow
    #[arg(short, long, default_value = "is_a")]
    pub relation: String,

    /// Also follow sub-relations (e.g., negatively_regulates for regulates)
    #[arg(long)]
    pub include_subrelations: bool,

    /// Accept an obsolete id and list obsolete terms reached
    #[arg(long)]
    pub include_obsolete: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// How term lists are printed
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    /// One id per line
    Plain,
}

/// Relational export formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// term.txt, term2term.txt and term_synonym.txt
    Tsv,
    /// A single SQL script with schema and INSERT statements
    Sql,
    /// The full snapshot as JSON
    Json,
}
