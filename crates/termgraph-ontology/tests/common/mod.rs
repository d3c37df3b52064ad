//! Shared helpers for termgraph-ontology integration tests
#![allow(dead_code)]

use std::path::PathBuf;
use termgraph_ontology::{LoaderConfig, OntologyLoader, Snapshot};
use tokio_util::sync::CancellationToken;

pub const TRANSCRIPTION: &str = "GO:0006351";
pub const CELLULAR_PROCESS: &str = "GO:0009987";
pub const BIOLOGICAL_PROCESS: &str = "GO:0008150";
pub const BIOLOGICAL_PROCESS_ALT: &str = "GO:0000004";
pub const BIOLOGICAL_REGULATION: &str = "GO:0065007";
pub const REGULATION_OF_BP: &str = "GO:0050789";
pub const NEG_REGULATION_OF_TRANSCRIPTION: &str = "GO:0045892";
pub const POS_REGULATION_OF_TRANSCRIPTION: &str = "GO:0045893";
pub const CELLULAR_COMPONENT: &str = "GO:0005575";
pub const INTRACELLULAR: &str = "GO:0005622";
pub const INTRACELLULAR_PART: &str = "GO:0044424";
pub const CYTOPLASM: &str = "GO:0005737";
pub const VACUOLE: &str = "GO:0005773";
pub const LYTIC_VACUOLE: &str = "GO:0000323";
pub const LYSOSOME: &str = "GO:0005764";
pub const MOLECULAR_FUNCTION: &str = "GO:0003674";
pub const MOLECULAR_FUNCTION_ALT: &str = "GO:0005554";
pub const BINDING: &str = "GO:0005488";
pub const OBSOLETE_TERM: &str = "GO:0000005";

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("Failed to read fixture")
}

/// The mini Gene Ontology excerpt, loaded with default settings
pub fn mini_go() -> Snapshot {
    load_with(LoaderConfig::default(), &fixture_text("mini.obo"))
}

pub fn load_with(config: LoaderConfig, source: &str) -> Snapshot {
    OntologyLoader::new(config)
        .load(source, &CancellationToken::new())
        .expect("Failed to load ontology")
}

pub fn sorted<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut items: Vec<String> = items.into_iter().map(Into::into).collect();
    items.sort();
    items
}
