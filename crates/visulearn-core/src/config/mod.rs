//! Configuration module for VisuLearn Core.
//!
//! Settings come from an optional TOML file (`visulearn.toml`); API keys come
//! from the environment through [`Credentials`].

pub mod credentials;

use crate::error::{Result, VisuLearnError};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use visulearn_abstraction::{
    DEFAULT_CONTENT_MODEL, DEFAULT_IMAGE_MODEL, DEFAULT_TTS_MODEL, DEFAULT_VOICE_ID,
};

pub use credentials::{Credentials, ELEVENLABS_API_KEY_VAR, GEMINI_API_KEY_VAR};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "visulearn.toml";

/// Retry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt of a rate limited call.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    crate::retry::DEFAULT_MAX_RETRIES
}

fn default_base_delay_ms() -> u64 {
    crate::retry::DEFAULT_BASE_DELAY.as_millis() as u64
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: default_max_retries(), base_delay_ms: default_base_delay_ms() }
    }
}

impl RetryConfig {
    /// The policy these settings describe.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.base_delay_ms))
    }
}

/// Model and voice selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Model for story, comic and analysis text.
    #[serde(default = "default_content_model")]
    pub content_model: String,
    /// Model for images.
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Narration voice.
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    /// Speech model.
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
}

fn default_content_model() -> String {
    DEFAULT_CONTENT_MODEL.to_string()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_voice_id() -> String {
    DEFAULT_VOICE_ID.to_string()
}

fn default_tts_model() -> String {
    DEFAULT_TTS_MODEL.to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            content_model: default_content_model(),
            image_model: default_image_model(),
            voice_id: default_voice_id(),
            tts_model: default_tts_model(),
        }
    }
}

/// Endpoint overrides, mostly for proxies and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Gemini REST base URL.
    #[serde(default)]
    pub gemini_base_url: Option<String>,
    /// ElevenLabs REST base URL.
    #[serde(default)]
    pub elevenlabs_base_url: Option<String>,
}

/// Root configuration for VisuLearn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisuLearnConfig {
    /// Retry settings.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Model selection.
    #[serde(default)]
    pub models: ModelsConfig,
    /// Endpoint overrides.
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl VisuLearnConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    /// Returns `VisuLearnError::Toml` on syntax errors and `Configuration` on invalid values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VisuLearnError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), "Loading configuration file");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when it
    /// exists, or fall back to defaults.
    ///
    /// # Errors
    /// Returns an error if an explicit path is missing or any file is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        let local = Self::default_local_path();
        if local.exists() {
            return Self::load_from_file(&local);
        }
        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Checks values serde cannot check.
    ///
    /// # Errors
    /// Returns `VisuLearnError::Configuration` for blank model names.
    pub fn validate(&self) -> Result<()> {
        let models = [
            ("content_model", &self.models.content_model),
            ("image_model", &self.models.image_model),
            ("voice_id", &self.models.voice_id),
            ("tts_model", &self.models.tts_model),
        ];
        for (key, value) in models {
            if value.trim().is_empty() {
                return Err(VisuLearnError::Configuration(format!("models.{} must not be empty", key)));
            }
        }
        Ok(())
    }

    /// The retry policy for provider calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.policy()
    }
}
