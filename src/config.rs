use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow};
use crate::models::ModelId;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8111";
pub const DEFAULT_WORKFLOW_URL: &str = "http://127.0.0.1:8000/quantflow/";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub workflow_url: String,
    pub default_model: Option<String>,
    pub status_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub download_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            workflow_url: DEFAULT_WORKFLOW_URL.to_string(),
            default_model: None,
            status_interval_secs: 30,
            request_timeout_secs: 60,
            download_dir: None,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Persist only the model choice, leaving every other field in the file as it was.
    pub fn save_default_model(path: &Path, model: ModelId) -> Result<()> {
        let mut config = Self::load_from(path)?;
        config.default_model = Some(model.as_str().to_string());
        config.save_to(path)
    }

    /// Apply `QUANTDESK_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base) = lookup("QUANTDESK_API_BASE").filter(|v| !v.trim().is_empty()) {
            self.api_base = base;
        }
        if let Some(url) = lookup("QUANTDESK_WORKFLOW_URL").filter(|v| !v.trim().is_empty()) {
            self.workflow_url = url;
        }
    }

    /// The configured model, or the default when unset or unknown.
    pub fn model(&self) -> ModelId {
        self.default_model
            .as_deref()
            .and_then(ModelId::from_str)
            .unwrap_or_default()
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("quantdesk").join("config.json"))
    }
}
