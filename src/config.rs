// Engine configuration loaded from YAML

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CONFIG_DIR: &str = "taskview";
const CONFIG_FILE: &str = "config.yaml";

/// Tunables shared by every stage of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Status/label values that count as done (case-insensitive)
    pub completion_values: Vec<String>,
    /// Columns whose column filter is a comma-separated accepted-value list
    pub enum_columns: Vec<String>,
    /// Sort field used when the requested one is unknown
    pub default_sort_field: String,
    /// Replaces the per-kind search fields when set
    pub search_fields: Option<Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            completion_values: vec!["completed".to_string(), "done".to_string(), "closed".to_string()],
            enum_columns: vec!["status".to_string(), "priority".to_string()],
            default_sort_field: "createdAt".to_string(),
            search_fields: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config file {:?}", path))?;
        info!(path = ?path, "Loaded engine config");
        Ok(config)
    }

    /// Load `<config_dir>/taskview/config.yaml` if it exists, else defaults
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Whether a status or label value means "done"
    pub fn is_completion(&self, value: &str) -> bool {
        let value = value.trim();
        self.completion_values.iter().any(|c| c.trim().eq_ignore_ascii_case(value))
    }

    pub fn is_enum_column(&self, column: &str) -> bool {
        self.enum_columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    }
}
