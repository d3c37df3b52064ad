// Ontology loader configuration

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_ONTOLOGY_PATH: &str = "TERMGRAPH_ONTOLOGY_PATH";
pub const ENV_STRICT_RELATIONS: &str = "TERMGRAPH_STRICT_RELATIONS";
pub const ENV_DETECT_CYCLES: &str = "TERMGRAPH_DETECT_CYCLES";
pub const ENV_RESOLVE_ALT_TARGETS: &str = "TERMGRAPH_RESOLVE_ALT_TARGETS";

/// Configuration for building snapshots from OBO sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Reject relationships whose type has no `[Typedef]` stanza
    pub strict_relation_types: bool,

    /// Look for cycles in `is_a` and transitive relations after the build
    pub detect_cycles: bool,

    /// Accept alternate identifiers as edge targets
    pub resolve_alt_id_targets: bool,

    /// Default OBO file to load
    pub source_path: Option<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            strict_relation_types: false,
            detect_cycles: true,
            resolve_alt_id_targets: true,
            source_path: None,
        }
    }
}

impl LoaderConfig {
    /// Create new config with builder pattern
    pub fn builder() -> LoaderConfigBuilder {
        LoaderConfigBuilder::default()
    }

    /// Load configuration from environment variables (and a `.env` file, if any)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let default = LoaderConfig::default();
        Ok(LoaderConfig {
            strict_relation_types: env_flag(ENV_STRICT_RELATIONS)?
                .unwrap_or(default.strict_relation_types),
            detect_cycles: env_flag(ENV_DETECT_CYCLES)?.unwrap_or(default.detect_cycles),
            resolve_alt_id_targets: env_flag(ENV_RESOLVE_ALT_TARGETS)?
                .unwrap_or(default.resolve_alt_id_targets),
            source_path: std::env::var(ENV_ONTOLOGY_PATH).ok().map(PathBuf::from),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.source_path {
            if path.as_os_str().is_empty() {
                anyhow::bail!("Ontology source path cannot be empty");
            }
        }
        Ok(())
    }
}

/// Parse a boolean environment variable; unset means `None`
fn env_flag(name: &str) -> anyhow::Result<Option<bool>> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(None);
    };
    let value = match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        other => {
            return Err(anyhow::anyhow!("expected a boolean, got `{other}`"))
                .with_context(|| format!("Invalid value for {name}"));
        },
    };
    Ok(Some(value))
}

/// Builder for LoaderConfig
#[derive(Debug, Default)]
pub struct LoaderConfigBuilder {
    strict_relation_types: Option<bool>,
    detect_cycles: Option<bool>,
    resolve_alt_id_targets: Option<bool>,
    source_path: Option<PathBuf>,
}

impl LoaderConfigBuilder {
    pub fn strict_relation_types(mut self, strict: bool) -> Self {
        self.strict_relation_types = Some(strict);
        self
    }

    pub fn detect_cycles(mut self, detect: bool) -> Self {
        self.detect_cycles = Some(detect);
        self
    }

    pub fn resolve_alt_id_targets(mut self, resolve: bool) -> Self {
        self.resolve_alt_id_targets = Some(resolve);
        self
    }

    pub fn source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn build(self) -> LoaderConfig {
        let default = LoaderConfig::default();

        LoaderConfig {
            strict_relation_types: self
                .strict_relation_types
                .unwrap_or(default.strict_relation_types),
            detect_cycles: self.detect_cycles.unwrap_or(default.detect_cycles),
            resolve_alt_id_targets: self
                .resolve_alt_id_targets
                .unwrap_or(default.resolve_alt_id_targets),
            source_path: self.source_path,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            ENV_ONTOLOGY_PATH,
            ENV_STRICT_RELATIONS,
            ENV_DETECT_CYCLES,
            ENV_RESOLVE_ALT_TARGETS,
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert!(!config.strict_relation_types);
        assert!(config.detect_cycles);
        assert!(config.resolve_alt_id_targets);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = LoaderConfig::builder()
            .strict_relation_types(true)
            .detect_cycles(false)
            .source_path("go-basic.obo")
            .build();

        assert!(config.strict_relation_types);
        assert!(!config.detect_cycles);
        assert!(config.resolve_alt_id_targets);
        assert_eq!(config.source_path, Some(PathBuf::from("go-basic.obo")));
    }

    #[test]
    fn test_validate_rejects_empty_path() {
        let config = LoaderConfig::builder().source_path("").build();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        std::env::set_var(ENV_ONTOLOGY_PATH, "/data/go.obo");
        std::env::set_var(ENV_STRICT_RELATIONS, "true");
        std::env::set_var(ENV_DETECT_CYCLES, "0");

        let config = LoaderConfig::from_env().unwrap();
        assert_eq!(config.source_path, Some(PathBuf::from("/data/go.obo")));
        assert!(config.strict_relation_types);
        assert!(!config.detect_cycles);
        assert!(config.resolve_alt_id_targets);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_flag() {
        clear_env();
        std::env::set_var(ENV_RESOLVE_ALT_TARGETS, "sometimes");

        let err = LoaderConfig::from_env().unwrap_err();
        assert!(format!("{err:#}").contains(ENV_RESOLVE_ALT_TARGETS));

        clear_env();
    }
}
