//! Provider abstraction layer for VisuLearn.
//!
//! This module defines the traits the generation pipeline uses to talk to
//! content, image and speech providers, the payloads they exchange, and the
//! failure classification the retry layer relies on.

use std::fmt;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default model for story, comic and analysis text.
pub const DEFAULT_CONTENT_MODEL: &str = "gemini-2.0-flash-exp";

/// Default model for image generation and enhancement.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Default narration voice.
pub const DEFAULT_VOICE_ID: &str = "JBFqnCBsd6RMkjVDRZzb";

/// Default speech model.
pub const DEFAULT_TTS_MODEL: &str = "eleven_multilingual_v2";

/// Coarse classification of a failed provider call.
///
/// Only [`FailureKind::RateLimited`] is considered transient; every other kind
/// is terminal for the call that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The provider answered with HTTP 429.
    RateLimited,
    /// The provider rejected the credentials (401/403).
    Unauthorized,
    /// Any other non-success status or provider-side rejection.
    Provider,
    /// The request never produced a response (DNS, TLS, connection reset).
    Network,
    /// The response arrived but could not be decoded into the expected shape.
    MalformedResponse,
    /// Local configuration is missing or invalid.
    Configuration,
}

impl FailureKind {
    /// Returns true if a call failing with this kind may be attempted again.
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// Returns the stable string form used in logs and serialized reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::Unauthorized => "unauthorized",
            Self::Provider => "provider",
            Self::Network => "network",
            Self::MalformedResponse => "malformed_response",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that know which [`FailureKind`] they belong to.
pub trait Classify {
    /// Returns the failure kind of this error.
    fn failure_kind(&self) -> FailureKind;

    /// Returns true if the failed call may be attempted again.
    fn is_retryable(&self) -> bool {
        self.failure_kind().is_retryable()
    }
}

/// Represents an error that can occur when calling a generation provider.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderError {
    /// A required credential or setting is missing.
    #[error("Configuration Error: {0}")]
    Configuration(String),

    /// The provider rate limited the request (HTTP 429).
    #[error("Provider '{provider}' rate limit exceeded (429){}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
    RateLimited {
        /// The provider name (e.g., "gemini", "elevenlabs").
        provider: String,
        /// Optional error body returned by the provider.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// The provider rejected the credentials.
    #[error("Provider '{provider}' authentication failed ({status}). Please check your API key.")]
    Unauthorized {
        /// The provider name.
        provider: String,
        /// The HTTP status (401 or 403).
        status: u16,
    },

    /// The provider returned any other non-success status.
    #[error("Provider '{provider}' returned error status {status}: {message}")]
    Status {
        /// The provider name.
        provider: String,
        /// The HTTP status code.
        status: u16,
        /// Error body returned by the provider.
        message: String,
    },

    /// The request could not be sent or the response body could not be read.
    #[error("Request Error: {0}")]
    Request(String),

    /// The response did not contain what was asked for.
    #[error("Malformed Response: {0}")]
    MalformedResponse(String),

    /// The request was rejected locally before reaching the provider.
    #[error("Invalid Input: {0}")]
    InvalidInput(String),
}

impl ProviderError {
    /// Maps a non-success HTTP status to the matching error variant.
    pub fn from_status(provider: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let provider = provider.into();
        let body = body.into();
        match status {
            429 => Self::RateLimited {
                provider,
                message: if body.is_empty() { None } else { Some(body) },
            },
            401 | 403 => Self::Unauthorized { provider, status },
            _ => Self::Status { provider, status, message: body },
        }
    }

    /// Returns the HTTP status carried by this error, if any.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::Unauthorized { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl Classify for ProviderError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Configuration(_) => FailureKind::Configuration,
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::Unauthorized { .. } => FailureKind::Unauthorized,
            Self::Status { .. } | Self::InvalidInput(_) => FailureKind::Provider,
            Self::Request(_) => FailureKind::Network,
            Self::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }
}

/// An encoded image exchanged with image providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// MIME type of the image (e.g., "image/png").
    pub mime_type: String,
    /// Base64-encoded image bytes, without a data URL prefix.
    pub data: String,
}

impl ImagePayload {
    /// Creates a payload from a MIME type and base64 data.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self { mime_type: mime_type.into(), data: data.into() }
    }

    /// Parses a `data:image/...;base64,` URL or a bare base64 string.
    ///
    /// Bare base64 is assumed to be JPEG, which is what uploaded photos are.
    ///
    /// # Errors
    /// Returns `ProviderError::InvalidInput` if the input is empty or the data
    /// URL header is not a base64 image header.
    pub fn from_data_url(input: &str) -> Result<Self, ProviderError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ProviderError::InvalidInput("image data is empty".to_string()));
        }

        let Some(rest) = input.strip_prefix("data:") else {
            return Ok(Self::new("image/jpeg", input));
        };

        let (header, data) = rest.split_once(',').ok_or_else(|| {
            ProviderError::InvalidInput("data URL is missing the ',' separator".to_string())
        })?;
        let mime_type = header.strip_suffix(";base64").ok_or_else(|| {
            ProviderError::InvalidInput(format!("data URL is not base64 encoded: {}", header))
        })?;
        if !mime_type.starts_with("image/") {
            return Err(ProviderError::InvalidInput(format!(
                "data URL does not hold an image: {}",
                mime_type
            )));
        }
        if data.is_empty() {
            return Err(ProviderError::InvalidInput("image data is empty".to_string()));
        }

        Ok(Self::new(mime_type, data))
    }

    /// Renders the payload as a data URL suitable for an `<img>` source.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decodes the base64 data into raw bytes.
    ///
    /// # Errors
    /// Returns `ProviderError::MalformedResponse` if the data is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, ProviderError> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| ProviderError::MalformedResponse(format!("invalid base64 image: {}", e)))
    }
}

/// A binary audio clip returned by a speech provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioPayload {
    /// MIME type of the clip (e.g., "audio/mpeg").
    pub mime_type: String,
    /// Raw audio bytes, base64-encoded when serialized.
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl AudioPayload {
    /// Creates a payload from a MIME type and raw bytes.
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { mime_type: mime_type.into(), bytes }
    }

    /// Renders the clip as a data URL suitable for an `<audio>` source.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}

/// A generated asset attached to a generation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Asset {
    /// A generated or enhanced image.
    Image(ImagePayload),
    /// A narrated audio clip.
    Audio(AudioPayload),
}

impl Asset {
    /// Returns the MIME type of the asset.
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Image(image) => &image.mime_type,
            Self::Audio(audio) => &audio.mime_type,
        }
    }

    /// Returns a file extension matching the asset's MIME type.
    pub fn file_extension(&self) -> &'static str {
        match self.mime_type() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" => "wav",
            _ => "bin",
        }
    }

    /// Returns the raw bytes of the asset.
    ///
    /// # Errors
    /// Returns `ProviderError::MalformedResponse` if an image holds invalid base64.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProviderError> {
        match self {
            Self::Image(image) => image.decode(),
            Self::Audio(audio) => Ok(audio.bytes.clone()),
        }
    }
}

/// A request for a single generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// The final, fully rendered prompt.
    pub prompt: String,
    /// Optional reference image the provider should build on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ImagePayload>,
}

impl ImageRequest {
    /// Creates a prompt-only request.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), reference: None }
    }

    /// Attaches a reference image.
    #[must_use]
    pub fn with_reference(mut self, reference: Option<ImagePayload>) -> Self {
        self.reference = reference;
        self
    }
}

/// A provider that turns a prompt (and optionally an image) into text.
///
/// All providers must be `Send + Sync` so they can be shared behind `Arc`.
#[async_trait]
pub trait ContentModel: Send + Sync {
    /// Generates text for the given prompt.
    ///
    /// # Arguments
    /// * `prompt` - The full prompt text
    /// * `image` - Optional image the model should look at
    async fn generate_content(
        &self,
        prompt: &str,
        image: Option<&ImagePayload>,
    ) -> Result<String, ProviderError>;

    /// Returns the ID of the model.
    fn model_id(&self) -> &str;
}

/// A provider that produces a single image from a prompt.
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Generates (or enhances) one image.
    async fn generate_image(&self, request: &ImageRequest) -> Result<ImagePayload, ProviderError>;

    /// Returns the ID of the model.
    fn model_id(&self) -> &str;
}

/// A provider that narrates text.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Synthesizes speech for the given text.
    async fn synthesize(&self, text: &str) -> Result<AudioPayload, ProviderError>;

    /// Returns the voice used for narration.
    fn voice_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rate_limits_are_retryable() {
        let limited = ProviderError::from_status("elevenlabs", 429, "slow down");
        assert_eq!(limited.failure_kind(), FailureKind::RateLimited);
        assert!(limited.is_retryable());

        for status in [400, 401, 403, 404, 500, 503] {
            let err = ProviderError::from_status("gemini", status, "nope");
            assert!(!err.is_retryable(), "status {} must be terminal", status);
        }

        assert!(!ProviderError::Request("connection reset".to_string()).is_retryable());
        assert!(!ProviderError::MalformedResponse("no image".to_string()).is_retryable());
        assert!(!ProviderError::Configuration("missing key".to_string()).is_retryable());
    }

    #[test]
    fn test_from_status_maps_auth_failures() {
        let err = ProviderError::from_status("elevenlabs", 401, "bad key");
        assert_eq!(err, ProviderError::Unauthorized { provider: "elevenlabs".to_string(), status: 401 });
        assert_eq!(err.failure_kind(), FailureKind::Unauthorized);
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("authentication failed"));
    }

    #[test]
    fn test_rate_limited_display() {
        let err = ProviderError::from_status("gemini", 429, "");
        assert_eq!(err.to_string(), "Provider 'gemini' rate limit exceeded (429)");

        let err = ProviderError::from_status("gemini", 429, "RESOURCE_EXHAUSTED");
        assert_eq!(err.to_string(), "Provider 'gemini' rate limit exceeded (429): RESOURCE_EXHAUSTED");
    }

    #[test]
    fn test_image_payload_from_data_url() {
        let payload = ImagePayload::from_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.data, "aGVsbG8=");
        assert_eq!(payload.to_data_url(), "data:image/png;base64,aGVsbG8=");
        assert_eq!(payload.decode().unwrap(), b"hello");
    }

    #[test]
    fn test_image_payload_bare_base64_defaults_to_jpeg() {
        let payload = ImagePayload::from_data_url("aGVsbG8=").unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
    }

    #[test]
    fn test_image_payload_rejects_bad_input() {
        assert!(ImagePayload::from_data_url("   ").is_err());
        assert!(ImagePayload::from_data_url("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(ImagePayload::from_data_url("data:image/png,raw").is_err());
        assert!(ImagePayload::from_data_url("data:image/png;base64").is_err());
    }

    #[test]
    fn test_asset_serializes_audio_as_base64() {
        let asset = Asset::Audio(AudioPayload::new("audio/mpeg", b"ID3".to_vec()));
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["type"], "audio");
        assert_eq!(json["bytes"], "SUQz");
        assert_eq!(asset.file_extension(), "mp3");

        let back: Asset = serde_json::from_value(json).unwrap();
        assert_eq!(back, asset);
    }
}
