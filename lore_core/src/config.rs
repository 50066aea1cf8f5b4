//! Configuration for a consistency run, read from TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::consistency::ContradictionRule;
use crate::knowledge_base::{OrphanPolicy, DEPENDENCY_TYPES};
use world_bible::EntityType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where the knowledge base lives and how it is checked.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Root of the entity record tree.
    pub data_dir: PathBuf,

    /// The relationship document. A missing file means no relationships.
    pub relationships_path: Option<PathBuf>,

    /// Directory of `<type>.schema.json` files. Built-in schemas when unset.
    pub schema_dir: Option<PathBuf>,

    /// Id prefixes recognised as references.
    pub entity_types: Vec<String>,

    /// Relationship types checked for cycles.
    pub dependency_types: Vec<String>,

    pub orphans: OrphanPolicy,

    pub contradictions: Vec<ContradictionRule>,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            relationships_path: Some(PathBuf::from("relationships/graph.json")),
            schema_dir: None,
            entity_types: EntityType::KNOWN.iter().map(|t| t.as_str().to_string()).collect(),
            dependency_types: DEPENDENCY_TYPES.iter().map(|t| t.to_string()).collect(),
            orphans: OrphanPolicy::default(),
            contradictions: ContradictionRule::defaults(),
        }
    }
}

impl IntegrityConfig {
    /// Parse a config from TOML text. Paths are left as written.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config file. Relative paths resolve against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve_paths(base))
    }

    /// Join every relative path onto `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        self.data_dir = base.join(&self.data_dir);
        self.relationships_path = self.relationships_path.map(|p| base.join(p));
        self.schema_dir = self.schema_dir.map(|p| base.join(p));
        self
    }

    /// A config rooted at a knowledge-base directory, otherwise default.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        Self::default().resolve_paths(root.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_config_is_default() {
        let config = IntegrityConfig::from_toml_str("").unwrap();
        assert_eq!(config, IntegrityConfig::default());
        assert_eq!(config.entity_types.len(), EntityType::KNOWN.len());
        assert_eq!(config.contradictions.len(), 3);
        assert!(config.orphans.bidirectional_source_is_linked);
    }

    #[test]
    fn test_parse_full_config() {
        let config = IntegrityConfig::from_toml_str(
            r#"
data_dir = "world"
schema_dir = "schemas"
dependency_types = ["requires"]

[orphans]
bidirectional_source_is_linked = false

[[contradictions]]
property = "weight"
value = "light"
keywords = ["heavy", "massive"]
"#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("world"));
        assert_eq!(config.schema_dir, Some(PathBuf::from("schemas")));
        assert_eq!(config.dependency_types, vec!["requires"]);
        assert!(!config.orphans.bidirectional_source_is_linked);
        assert_eq!(
            config.contradictions,
            vec![ContradictionRule::new("weight", "light", ["heavy", "massive"])]
        );
        // Unset keys keep their defaults.
        assert_eq!(
            config.relationships_path,
            Some(PathBuf::from("relationships/graph.json"))
        );
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lore.toml");
        fs::write(&path, "data_dir = \"entities\"\nschema_dir = \"/abs/schemas\"\n").unwrap();

        let config = IntegrityConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, dir.path().join("entities"));
        assert_eq!(config.schema_dir, Some(PathBuf::from("/abs/schemas")));
        assert_eq!(
            config.relationships_path,
            Some(dir.path().join("relationships/graph.json"))
        );
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            IntegrityConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));

        let path = dir.path().join("bad.toml");
        fs::write(&path, "data_dir = [").unwrap();
        assert!(matches!(IntegrityConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
