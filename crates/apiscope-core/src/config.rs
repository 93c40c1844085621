//! Project configuration for API exploration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::panel::Language;

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend relay that executes requests and renders snippets
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    /// API schema file (JSON or YAML)
    #[serde(default = "default_schema")]
    pub schema: PathBuf,

    /// Overrides the schema's own base URL when set
    #[serde(default)]
    pub base_url: Option<String>,

    /// Default snippet language
    #[serde(default)]
    pub language: Language,

    /// Path parameter values pre-filled into every panel
    #[serde(default)]
    pub path_params: HashMap<String, String>,

    /// Query parameter values pre-filled into every panel
    #[serde(default)]
    pub query_params: HashMap<String, String>,
}

fn default_relay_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_schema() -> PathBuf {
    PathBuf::from("api-schema.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            schema: default_schema(),
            base_url: None,
            language: Language::default(),
            path_params: HashMap::new(),
            query_params: HashMap::new(),
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.apiscope.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load the first default-named config file found in `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = [".apiscope.toml", ".apiscope.json", "apiscope.toml"];

        for name in candidates {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        // No config file, return default
        Ok(Self::default())
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# apiscope configuration

# Backend relay (executes requests, renders snippets, parses docs)
relay_url = "http://localhost:8000"

# API schema file (JSON or YAML), e.g. written by `apiscope parse <url>`
schema = "api-schema.json"

# Override the schema's base URL (e.g. a staging server)
# base_url = "https://staging.example.com"

# Default snippet language: python, javascript, curl
language = "python"

# Path parameter values pre-filled for every endpoint
[path_params]
# id = "42"

# Query parameter values pre-filled for every endpoint
[query_params]
# limit = "10"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}
