//! Provider factory for creating provider instances from configuration.
//!
//! This module builds the content, image and speech providers a batch needs,
//! handling API key loading from environment variables when no explicit key
//! is given.

use crate::elevenlabs::{DEFAULT_TTS_MODEL, DEFAULT_VOICE_ID};
use crate::gemini::{DEFAULT_CONTENT_MODEL, DEFAULT_IMAGE_MODEL};
use crate::{ElevenLabsSpeech, GeminiModel, GenerationSettings, MockModel};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};
use visulearn_abstraction::{ContentModel, ImageModel, ProviderError, SpeechModel};

/// Which providers to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderMode {
    /// Scripted providers; no network access.
    Mock,
    /// Gemini and ElevenLabs over HTTP.
    #[default]
    Live,
}

impl FromStr for ProviderMode {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" | "offline" => Ok(Self::Mock),
            "live" | "gemini" => Ok(Self::Live),
            _ => {
                error!(mode = %s, "Unrecognized provider mode");
                Err(ProviderError::Configuration(format!("Unrecognized provider mode: {}", s)))
            }
        }
    }
}

/// Provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Which providers to build.
    pub mode: ProviderMode,
    /// Model used for story, comic and analysis text.
    pub content_model: String,
    /// Model used for image generation.
    pub image_model: String,
    /// Narration voice.
    pub voice_id: String,
    /// Speech model.
    pub tts_model: String,
    /// Optional Gemini key (if not provided, will be loaded from environment).
    pub gemini_api_key: Option<String>,
    /// Optional ElevenLabs key (if not provided, will be loaded from environment).
    pub elevenlabs_api_key: Option<String>,
    /// Optional Gemini base URL override.
    pub gemini_base_url: Option<String>,
    /// Optional ElevenLabs base URL override.
    pub elevenlabs_base_url: Option<String>,
    /// Content returned by the mock once its script is empty.
    pub mock_content: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            mode: ProviderMode::Live,
            content_model: DEFAULT_CONTENT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            gemini_api_key: None,
            elevenlabs_api_key: None,
            gemini_base_url: None,
            elevenlabs_base_url: None,
            mock_content: None,
        }
    }
}

impl ProviderConfig {
    /// Creates a configuration with default models for the given mode.
    #[must_use]
    pub fn new(mode: ProviderMode) -> Self {
        Self { mode, ..Self::default() }
    }

    /// Sets both API keys.
    #[must_use]
    pub fn with_api_keys(mut self, gemini: impl Into<String>, elevenlabs: impl Into<String>) -> Self {
        self.gemini_api_key = Some(gemini.into());
        self.elevenlabs_api_key = Some(elevenlabs.into());
        self
    }

    /// Sets the content returned by the mock providers.
    #[must_use]
    pub fn with_mock_content(mut self, content: impl Into<String>) -> Self {
        self.mock_content = Some(content.into());
        self
    }
}

/// The three providers a batch talks to.
#[derive(Clone)]
pub struct ProviderSet {
    /// Story, comic and analysis text.
    pub content: Arc<dyn ContentModel>,
    /// Image generation and enhancement.
    pub image: Arc<dyn ImageModel>,
    /// Narration.
    pub speech: Arc<dyn SpeechModel>,
}

impl ProviderSet {
    /// Uses one mock for every role.
    pub fn from_mock(mock: Arc<MockModel>) -> Self {
        Self { content: mock.clone(), image: mock.clone(), speech: mock }
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSet")
            .field("content", &self.content.model_id())
            .field("image", &self.image.model_id())
            .field("voice", &self.speech.voice_id())
            .finish()
    }
}

/// Factory for creating provider instances.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Creates the provider set described by the given configuration.
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` if a live provider has no API key.
    pub fn create(config: ProviderConfig) -> Result<ProviderSet, ProviderError> {
        debug!(
            mode = ?config.mode,
            content_model = %config.content_model,
            image_model = %config.image_model,
            voice_id = %config.voice_id,
            "Creating providers"
        );

        match config.mode {
            ProviderMode::Mock => {
                let mut mock = MockModel::new("mock");
                if let Some(content) = config.mock_content {
                    mock = mock.with_default_content(content);
                }
                Ok(ProviderSet::from_mock(Arc::new(mock)))
            }
            ProviderMode::Live => {
                let gemini = |model_id: &str| -> Result<GeminiModel, ProviderError> {
                    let model = match &config.gemini_api_key {
                        Some(key) => GeminiModel::with_api_key(model_id, key.clone()),
                        None => GeminiModel::new(model_id)?,
                    };
                    Ok(match &config.gemini_base_url {
                        Some(url) => model.with_base_url(url.clone()),
                        None => model,
                    })
                };

                let content =
                    gemini(&config.content_model)?.with_settings(GenerationSettings::for_content());
                let image =
                    gemini(&config.image_model)?.with_settings(GenerationSettings::for_images());

                let mut speech = match &config.elevenlabs_api_key {
                    Some(key) => ElevenLabsSpeech::with_api_key(key.clone()),
                    None => ElevenLabsSpeech::new()?,
                }
                .with_voice(config.voice_id.clone())
                .with_model(config.tts_model.clone());
                if let Some(url) = &config.elevenlabs_base_url {
                    speech = speech.with_base_url(url.clone());
                }

                Ok(ProviderSet {
                    content: Arc::new(content),
                    image: Arc::new(image),
                    speech: Arc::new(speech),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_mode_from_str() {
        assert_eq!(ProviderMode::from_str("mock"), Ok(ProviderMode::Mock));
        assert_eq!(ProviderMode::from_str("Offline"), Ok(ProviderMode::Mock));
        assert_eq!(ProviderMode::from_str("LIVE"), Ok(ProviderMode::Live));
        assert!(ProviderMode::from_str("claude").is_err());
    }

    #[test]
    fn test_default_config_uses_shared_model_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.content_model, visulearn_abstraction::DEFAULT_CONTENT_MODEL);
        assert_eq!(config.image_model, visulearn_abstraction::DEFAULT_IMAGE_MODEL);
        assert_eq!(config.voice_id, visulearn_abstraction::DEFAULT_VOICE_ID);
        assert_eq!(config.tts_model, visulearn_abstraction::DEFAULT_TTS_MODEL);
    }

    #[test]
    fn test_provider_config_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.mode, ProviderMode::Live);
        assert_eq!(config.content_model, "gemini-2.0-flash-exp");
        assert_eq!(config.image_model, "gemini-2.5-flash-image-preview");
        assert_eq!(config.voice_id, "JBFqnCBsd6RMkjVDRZzb");
        assert_eq!(config.tts_model, "eleven_multilingual_v2");
    }

    #[test]
    fn test_factory_create_mock() {
        let set = ProviderFactory::create(ProviderConfig::new(ProviderMode::Mock)).unwrap();
        assert_eq!(set.content.model_id(), "mock");
        assert_eq!(set.speech.voice_id(), "mock");
    }

    #[test]
    fn test_factory_create_live_with_api_keys() {
        let mut config = ProviderConfig::new(ProviderMode::Live).with_api_keys("g-key", "xi-key");
        config.voice_id = "voice-2".to_string();

        let set = ProviderFactory::create(config).unwrap();
        assert_eq!(set.content.model_id(), "gemini-2.0-flash-exp");
        assert_eq!(set.image.model_id(), "gemini-2.5-flash-image-preview");
        assert_eq!(set.speech.voice_id(), "voice-2");
    }

    #[tokio::test]
    async fn test_factory_mock_content() {
        let config = ProviderConfig::new(ProviderMode::Mock).with_mock_content("[]");
        let set = ProviderFactory::create(config).unwrap();
        assert_eq!(set.content.generate_content("plan", None).await.unwrap(), "[]");
    }
}
