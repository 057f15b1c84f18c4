//! Configuration management for resume studio

use crate::error::{Result, ResumeStudioError};
use crate::output::preview::TemplateKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_BACKEND_URL: &str = "RESUME_STUDIO_BACKEND_URL";
pub const ENV_ANON_KEY: &str = "RESUME_STUDIO_ANON_KEY";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub ai: AiConfig,
    pub preview: PreviewConfig,
    pub storage: StorageConfig,
}

/// Managed backend platform (auth, tables, object storage)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub bucket: String,
    pub oauth_provider: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub endpoint: String,
    pub model: String,
    /// Left empty in the file to read `GEMINI_API_KEY` instead.
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    pub default_template: TemplateKind,
    pub color_output: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-studio");

        Self {
            backend: BackendConfig {
                url: "http://localhost:54321".to_string(),
                anon_key: String::new(),
                bucket: "resumes".to_string(),
                oauth_provider: "google".to_string(),
                redirect_url: "http://localhost:3000/auth/callback".to_string(),
            },
            ai: AiConfig {
                endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-1.5-flash".to_string(),
                api_key: String::new(),
            },
            preview: PreviewConfig {
                default_template: TemplateKind::Classic,
                color_output: true,
            },
            storage: StorageConfig { data_dir },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            toml::from_str(&content).map_err(|e| {
                ResumeStudioError::Configuration(format!("Failed to parse config: {}", e))
            })?
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            config
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ResumeStudioError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-studio")
            .join("config.toml")
    }

    /// Environment values win over the file. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_BACKEND_URL) {
            self.backend.url = url;
        }
        if let Some(key) = non_empty(ENV_ANON_KEY) {
            self.backend.anon_key = key;
        }
        if let Some(key) = non_empty(ENV_GEMINI_API_KEY) {
            self.ai.api_key = key;
        }
    }

    /// The AI key, or a configuration error naming the variable to set.
    pub fn ai_api_key(&self) -> Result<&str> {
        if self.ai.api_key.trim().is_empty() {
            return Err(ResumeStudioError::Configuration(format!(
                "No AI API key configured; set {} or ai.api_key",
                ENV_GEMINI_API_KEY
            )));
        }
        Ok(&self.ai.api_key)
    }

    pub fn ensure_backend(&self) -> Result<()> {
        if self.backend.anon_key.trim().is_empty() {
            return Err(ResumeStudioError::Configuration(format!(
                "No backend anon key configured; set {} or backend.anon_key",
                ENV_ANON_KEY
            )));
        }
        url::Url::parse(&self.backend.url)?;
        Ok(())
    }

    pub fn local_store_path(&self) -> PathBuf {
        self.storage.data_dir.join("local-storage.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides_take_precedence() {
        let mut config = Config::default();
        let env: HashMap<&str, &str> = [
            (ENV_BACKEND_URL, "https://project.example.co"),
            (ENV_ANON_KEY, "anon-123"),
            (ENV_GEMINI_API_KEY, ""),
        ]
        .into_iter()
        .collect();

        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.url, "https://project.example.co");
        assert_eq!(config.backend.anon_key, "anon-123");
        assert!(config.ai_api_key().is_err());
    }

    #[test]
    fn test_load_writes_defaults_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let first = Config::load_from(&path).unwrap();
        assert!(path.exists());

        let second = Config::load_from(&path).unwrap();
        assert_eq!(first.backend.bucket, second.backend.bucket);
        assert_eq!(first.ai.model, second.ai.model);
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "backend = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ResumeStudioError::Configuration(_)));
    }

    #[test]
    fn test_ensure_backend_requires_anon_key() {
        let config = Config::default();
        assert!(config.ensure_backend().is_err());
    }
}
