//! ElevenLabs text-to-speech provider.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Serialize;
use std::env;
use tracing::{debug, error};
use visulearn_abstraction::{AudioPayload, ProviderError, SpeechModel};

pub use visulearn_abstraction::{DEFAULT_TTS_MODEL, DEFAULT_VOICE_ID};

const PROVIDER: &str = "elevenlabs";

/// Default ElevenLabs REST endpoint.
pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";

/// Default output encoding; always MP3.
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Narration backed by the ElevenLabs `text-to-speech` endpoint.
#[derive(Debug, Clone)]
pub struct ElevenLabsSpeech {
    voice_id: String,
    model_id: String,
    output_format: String,
    api_key: String,
    base_url: String,
    client: Client,
}

impl ElevenLabsSpeech {
    /// Creates a client with the key from `ELEVENLABS_API_KEY`.
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` if the variable is not set or blank.
    pub fn new() -> Result<Self, ProviderError> {
        let api_key = env::var("ELEVENLABS_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::Configuration(
                    "ELEVENLABS_API_KEY environment variable not set".to_string(),
                )
            })?;

        Ok(Self::with_api_key(api_key))
    }

    /// Creates a client with an explicit API key and the default voice.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_TTS_MODEL.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            api_key: api_key.into(),
            base_url: DEFAULT_ELEVENLABS_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Overrides the narration voice.
    #[must_use]
    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = voice_id.into();
        self
    }

    /// Overrides the speech model.
    #[must_use]
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    output_format: &'a str,
}

#[async_trait]
impl SpeechModel for ElevenLabsSpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload, ProviderError> {
        if text.trim().is_empty() {
            return Err(ProviderError::InvalidInput("Text is required".to_string()));
        }

        debug!(
            voice_id = %self.voice_id,
            model_id = %self.model_id,
            text_len = text.len(),
            "ElevenLabsSpeech synthesizing narration"
        );

        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);
        let body = SpeechRequest {
            text,
            model_id: &self.model_id,
            output_format: &self.output_format,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header(ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send request to ElevenLabs API");
                ProviderError::Request(format!("Network error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "ElevenLabs API returned error status");
            return Err(ProviderError::from_status(PROVIDER, status.as_u16(), error_text));
        }

        let bytes = response.bytes().await.map_err(|e| {
            error!(error = %e, "Failed to read ElevenLabs audio body");
            ProviderError::Request(format!("Failed to read audio: {}", e))
        })?;

        if bytes.is_empty() {
            return Err(ProviderError::MalformedResponse("ElevenLabs returned no audio".to_string()));
        }

        Ok(AudioPayload::new("audio/mpeg", bytes.to_vec()))
    }

    fn voice_id(&self) -> &str {
        &self.voice_id
    }
}
