//! Provider API keys.

use crate::error::{Result, VisuLearnError};
use std::fmt;

/// Environment variable holding the Gemini key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Environment variable holding the ElevenLabs key.
pub const ELEVENLABS_API_KEY_VAR: &str = "ELEVENLABS_API_KEY";

/// API keys for both providers, validated when read.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    gemini_api_key: String,
    elevenlabs_api_key: String,
}

impl Credentials {
    /// Create credentials from explicit keys.
    ///
    /// # Errors
    /// Returns `VisuLearnError::Configuration` if either key is blank.
    pub fn new(gemini_api_key: impl Into<String>, elevenlabs_api_key: impl Into<String>) -> Result<Self> {
        let gemini = gemini_api_key.into();
        let elevenlabs = elevenlabs_api_key.into();
        Self::from_lookup(|name| match name {
            GEMINI_API_KEY_VAR => Some(gemini.clone()),
            ELEVENLABS_API_KEY_VAR => Some(elevenlabs.clone()),
            _ => None,
        })
    }

    /// Read both keys from the process environment.
    ///
    /// # Errors
    /// Returns `VisuLearnError::Configuration` naming every missing or blank variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both keys through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    /// Returns `VisuLearnError::Configuration` naming every missing or blank variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let gemini = read(GEMINI_API_KEY_VAR);
        let elevenlabs = read(ELEVENLABS_API_KEY_VAR);

        match (gemini, elevenlabs) {
            (Some(gemini_api_key), Some(elevenlabs_api_key)) => {
                Ok(Self { gemini_api_key, elevenlabs_api_key })
            }
            (gemini, elevenlabs) => {
                let missing: Vec<&str> = [
                    gemini.is_none().then_some(GEMINI_API_KEY_VAR),
                    elevenlabs.is_none().then_some(ELEVENLABS_API_KEY_VAR),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(VisuLearnError::Configuration(format!(
                    "missing API key environment variable(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }

    /// The Gemini key.
    pub fn gemini_api_key(&self) -> &str {
        &self.gemini_api_key
    }

    /// The ElevenLabs key.
    pub fn elevenlabs_api_key(&self) -> &str {
        &self.elevenlabs_api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("gemini_api_key", &"<redacted>")
            .field("elevenlabs_api_key", &"<redacted>")
            .finish()
    }
}
