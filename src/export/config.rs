use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/build";
pub const DEFAULT_ARTIFACT_NAME: &str = "generated-workflow.zip";

/// Export settings, read from an optional YAML file and overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
    pub artifact_name: String,
    pub app_name: String,
    pub app_description: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 60,
            user_agent: None,
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            app_name: String::new(),
            app_description: String::new(),
        }
    }
}

impl ExportConfig {
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file from {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("flowsmith/{}", env!("CARGO_PKG_VERSION")))
    }
}
