//! Configuration for the termgraph CLI
//!
//! Settings come from `TERMGRAPH_*` environment variables (and `.env`), then
//! global command-line flags override them.

use crate::error::{CliError, Result};
use crate::Cli;
use std::path::Path;
use termgraph_ontology::LoaderConfig;

/// CLI configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Settings handed to the ontology loader, including the OBO path
    pub loader: LoaderConfig,

    /// Enable verbose output
    pub verbose: bool,
}

impl Config {
    /// Load config from environment variables
    pub fn from_env() -> Result<Self> {
        let loader = LoaderConfig::from_env()?;
        Ok(Self {
            loader,
            verbose: false,
        })
    }

    /// Environment settings with the global flags of `cli` applied on top
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = Self::from_env()?;
        config.apply_cli(cli);
        config.loader.validate()?;
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(path) = &cli.ontology {
            self.loader.source_path = Some(path.clone());
        }
        if cli.strict {
            self.loader.strict_relation_types = true;
        }
        self.verbose = cli.verbose;
    }

    /// The OBO file to load; it must exist
    pub fn ontology_path(&self) -> Result<&Path> {
        let path = self
            .loader
            .source_path
            .as_deref()
            .ok_or(CliError::MissingOntology)?;
        if !path.is_file() {
            return Err(CliError::file_not_found(path.display().to_string()));
        }
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from(["termgraph", "--ontology", "go.obo", "--strict", "validate"]).unwrap();
        let mut config = Config::default();
        config.apply_cli(&cli);

        assert_eq!(config.loader.source_path.as_deref(), Some(Path::new("go.obo")));
        assert!(config.loader.strict_relation_types);
        assert!(config.loader.detect_cycles);
    }

    #[test]
    fn test_missing_ontology() {
        let config = Config::default();
        assert!(matches!(config.ontology_path(), Err(CliError::MissingOntology)));

        let mut config = Config::default();
        config.loader.source_path = Some("/nonexistent/go.obo".into());
        assert!(matches!(config.ontology_path(), Err(CliError::FileNotFound(_))));
    }

    #[test]
    #[serial]
    fn test_invalid_env_flag_is_config_error() {
        std::env::set_var("TERMGRAPH_DETECT_CYCLES", "sometimes");
        let result = Config::from_env();
        std::env::remove_var("TERMGRAPH_DETECT_CYCLES");

        let err = result.unwrap_err();
        assert!(err.to_string().contains("TERMGRAPH_DETECT_CYCLES"));
    }
}
