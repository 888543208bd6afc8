//! Configuration for the API client, the script runner and output files

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Model API settings
    pub api: ApiConfig,

    /// Generator script execution
    pub script: ScriptConfig,

    /// Where saved files go
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// API key from the configured environment variable, if set and non-empty
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.api.api_key_env).ok().filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    pub anthropic_version: String,

    /// No timeout unless set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            anthropic_version: "2023-06-01".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Interpreter the generated script is run with
    pub interpreter: String,

    /// Directory the script runs in and writes its CSV to
    pub working_dir: PathBuf,

    /// No timeout unless set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            interpreter: if cfg!(windows) { "python" } else { "python3" }.to_string(),
            working_dir: PathBuf::from("."),
            timeout_secs: None,
        }
    }
}

impl ScriptConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { directory: PathBuf::from(".") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "https://api.anthropic.com");
        assert_eq!(config.api.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.api.timeout_secs, None);
        assert_eq!(config.script.timeout(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sampledata.toml");

        let mut config = AppConfig::default();
        config.script.interpreter = "/usr/bin/python3.12".to_string();
        config.script.timeout_secs = Some(30);
        config.save(&path).unwrap();

        let loaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.script.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[api]\nbase_url = \"http://localhost:8080\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.anthropic_version, "2023-06-01");
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(AppConfig::from_file(Path::new("/nonexistent/sampledata.toml")).is_err());
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }
}
