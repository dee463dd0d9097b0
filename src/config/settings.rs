// Runtime settings for the research service
//
// Settings live in ~/.uxr-sim/config.toml. Every section and field is optional;
// missing values fall back to the defaults below. Command-line flags are
// layered on top through `SettingsOverrides`.

use super::providers::get_provider_preset;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Language model connection settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Provider preset ID (see `providers.rs`)
    pub provider: String,
    /// Model name; the preset's default when unset
    pub model: Option<String>,
    /// Overrides the preset base URL
    pub base_url: Option<String>,
    /// Fallback API key when a request carries no credentials
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: "cerebras".to_string(),
            model: None,
            base_url: None,
            api_key: None,
            temperature: 0.7,
            max_tokens: 800,
            timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSettings")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ModelSettings {
    /// Base URL from the explicit setting or the provider preset
    pub fn resolved_base_url(&self) -> Result<String, String> {
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.trim().to_string());
        }
        get_provider_preset(&self.provider)
            .map(|p| p.base_url.to_string())
            .ok_or_else(|| format!("Unknown provider '{}' and no base_url set", self.provider))
    }

    /// Model name from the explicit setting or the provider preset
    pub fn resolved_model(&self) -> Result<String, String> {
        if let Some(model) = self.model.as_deref().filter(|m| !m.trim().is_empty()) {
            return Ok(model.trim().to_string());
        }
        get_provider_preset(&self.provider)
            .and_then(|p| p.default_model())
            .map(str::to_string)
            .ok_or_else(|| format!("No model configured for provider '{}'", self.provider))
    }

    /// Configured API key, falling back to the provider's environment variable
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                get_provider_preset(&self.provider)
                    .and_then(|p| std::env::var(p.api_key_env).ok())
                    .filter(|k| !k.trim().is_empty())
            })
    }
}

/// Limits and defaults for research runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchSettings {
    pub default_interviews: u32,
    pub default_questions: u32,
    pub max_interviews: u32,
    pub max_questions: u32,
    /// Attempt budget for persona generation
    pub max_persona_attempts: u32,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            default_interviews: 5,
            default_questions: 3,
            max_interviews: 25,
            max_questions: 10,
            max_persona_attempts: 5,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub bind: String,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 5000,
            bind: "127.0.0.1".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

/// Complete settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: ModelSettings,
    pub research: ResearchSettings,
    pub server: ServerSettings,
}

impl Settings {
    /// Get the settings file path (~/.uxr-sim/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".uxr-sim").join("config.toml"))
    }

    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        let path =
            Self::default_path().ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Self::load_from(&path)
    }

    /// Load settings from a file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("[config] No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read settings file '{}': {}", path.display(), e))?;

        let settings: Settings = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse settings file '{}': {}", path.display(), e))?;

        log::info!("[config] Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Apply command-line overrides on top of file values
    pub fn merge(mut self, overrides: &SettingsOverrides) -> Self {
        if let Some(provider) = &overrides.provider {
            self.model.provider = provider.clone();
        }
        if overrides.model.is_some() {
            self.model.model = overrides.model.clone();
        }
        if overrides.api_key.is_some() {
            self.model.api_key = overrides.api_key.clone();
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(bind) = &overrides.bind {
            self.server.bind = bind.clone();
        }
        if !overrides.cors_origins.is_empty() {
            self.server.cors_origins = overrides.cors_origins.clone();
        }
        self
    }
}

/// Partial settings from the command line
/// Uses Option<T> for all fields so only given flags override the file
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub cors_origins: Vec<String>,
}
