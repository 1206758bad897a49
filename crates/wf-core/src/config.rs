//! Configuration types and parsing for weft.yml

use crate::error::{CoreError, CoreResult};
use crate::names::SchemaName;
use crate::serde_helpers::default_true;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Main project configuration from weft.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Target SQL dialect for rendering
    #[serde(default)]
    pub dialect: Dialect,

    /// Rendering options
    #[serde(default)]
    pub render: RenderConfig,

    /// Schemas and their shared settings
    #[serde(default)]
    pub schemas: Vec<SchemaConfig>,

    /// Execution database used when rendered SQL is run
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// SQL dialect selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// DuckDB (default)
    #[default]
    DuckDb,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Options controlling SQL text emission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Parse every rendered statement with the dialect's parser before returning it
    #[serde(default = "default_true")]
    pub validate_sql: bool,

    /// Start each clause keyword on its own line
    #[serde(default)]
    pub pretty: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            validate_sql: true,
            pretty: false,
        }
    }
}

/// Settings shared by every table of one schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Schema name
    pub name: SchemaName,

    /// Connection options (passed through to the execution collaborator)
    #[serde(default)]
    pub connection: BTreeMap<String, String>,

    /// Text substitutions applied to file paths of this schema's sources
    #[serde(default)]
    pub substitutions: BTreeMap<String, String>,

    /// Database extensions the schema's SQL needs (`spatial`, `httpfs`, ...)
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Execution database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path, `:memory:` for an in-memory database
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    ":memory:".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for weft.yml or weft.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("weft.yml");
        let yaml_path = dir.join("weft.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for schema in &self.schemas {
            if !seen.insert(schema.name.as_str()) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("Duplicate schema '{}'", schema.name),
                });
            }
        }

        Ok(())
    }

    /// Look up a schema's settings by name
    pub fn schema(&self, name: &str) -> Option<&SchemaConfig> {
        self.schemas.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
