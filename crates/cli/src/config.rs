use std::path::{Path, PathBuf};
use std::time::Duration;

use agents::{AgentConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use anyhow::{Context, Result};
use orchestrator::{DriverConfig, Pacing};
use serde::{Deserialize, Serialize};

pub const SIM_DIR: &str = ".ceda-sim";
pub const CONFIG_FILE: &str = "config.toml";
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub model: String,
    pub api_base_url: String,
    pub language: String,
    pub pacing: PacingConfig,
}

/// Pacing delays in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub typing_ms: u64,
    pub reading_ms: u64,
    pub analysis_lead_ms: u64,
    pub auto_advance_ms: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            language: "en".to_string(),
            pacing: PacingConfig::default(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        let pacing = Pacing::default();
        Self {
            typing_ms: pacing.typing.as_millis() as u64,
            reading_ms: pacing.reading.as_millis() as u64,
            analysis_lead_ms: pacing.analysis_lead.as_millis() as u64,
            auto_advance_ms: pacing.auto_advance.as_millis() as u64,
        }
    }
}

impl From<PacingConfig> for Pacing {
    fn from(config: PacingConfig) -> Self {
        Pacing::default()
            .with_typing(Duration::from_millis(config.typing_ms))
            .with_reading(Duration::from_millis(config.reading_ms))
            .with_analysis_lead(Duration::from_millis(config.analysis_lead_ms))
            .with_auto_advance(Duration::from_millis(config.auto_advance_ms))
    }
}

impl SimulatorConfig {
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(SIM_DIR).join(CONFIG_FILE)
    }

    /// Read the config under `dir`, falling back to defaults when absent.
    pub async fn load(dir: &Path) -> Result<Self> {
        let path = Self::path_in(dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config at {}", path.display()))
    }

    pub async fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = Self::path_in(dir);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, toml::to_string_pretty(self)?).await?;
        Ok(path)
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        if let Some(language) = language {
            self.language = language;
        }
        self
    }

    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig::default()
            .with_model(&self.model)
            .with_language(&self.language)
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig::default()
            .with_language(&self.language)
            .with_pacing(self.pacing.into())
    }
}
